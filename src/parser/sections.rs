use std::sync::LazyLock;

use regex::Regex;

static UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_{3,}").unwrap());
static DOTS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{5,}").unwrap());
static DASHES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{5,}").unwrap());

/// Split a post body into segments: underscore rules first, then dot leaders,
/// then dash rules. The first separator that actually splits wins.
pub fn split_sections(text: &str) -> Vec<&str> {
    let separators: [&Regex; 3] = [&UNDERSCORE_RE, &DOTS_RE, &DASHES_RE];
    let raw: Vec<&str> = separators
        .iter()
        .map(|re| re.split(text).collect::<Vec<_>>())
        .find(|parts| parts.len() > 1)
        .unwrap_or_else(|| vec![text]);

    raw.into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscores_take_priority() {
        let text = "Intro.....still intro\n_____\nMain Event\n-----\nAfter\n___\n";
        assert_eq!(
            split_sections(text),
            vec!["Intro.....still intro", "Main Event\n-----\nAfter"]
        );
    }

    #[test]
    fn falls_back_through_the_chain() {
        assert_eq!(split_sections("a .......... b"), vec!["a", "b"]);
        assert_eq!(split_sections("a\n------\nb\n-----"), vec!["a", "b"]);
        assert_eq!(split_sections("  just one  "), vec!["just one"]);
        assert!(split_sections("   ").is_empty());
    }
}
