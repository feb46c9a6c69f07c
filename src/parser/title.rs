use std::sync::LazyLock;

use regex::Regex;

use crate::model::TitleParts;

static ARROW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^>>>\s*").unwrap());
static YA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)YA\b").unwrap());
static CAPS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([A-Z]{2,})\b").unwrap());

const KEYWORD_STOPS: &[&str] = &["THE", "AND", "FOR", "OR", "OF", "IN", "TO", "A", "IS", "IT"];

pub fn parse_title(title: &str) -> TitleParts {
    let clean = ARROW_RE.replace(title, "");
    let clean = clean.trim();

    let pipe_parts: Vec<String> = if clean.contains('|') {
        clean.split('|').map(|p| p.trim().to_string()).collect()
    } else {
        Vec::new()
    };
    let colon_parts: Vec<String> = if pipe_parts.is_empty() && clean.contains(':') {
        clean.splitn(2, ':').map(|p| p.trim().to_string()).collect()
    } else {
        Vec::new()
    };

    TitleParts {
        has_arrow_prefix: title.starts_with(">>>"),
        pipe_parts,
        colon_parts,
        ya_number: YA_RE
            .captures(clean)
            .and_then(|c| c[1].parse().ok()),
        keywords: CAPS_RE
            .captures_iter(clean)
            .map(|c| c[1].to_string())
            .filter(|w| !KEYWORD_STOPS.contains(&w.as_str()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipes_win_over_colons() {
        let t = parse_title(">>> Season 5 | DODGEBALL 50: THE Results");
        assert!(t.has_arrow_prefix);
        assert_eq!(t.pipe_parts, vec!["Season 5", "DODGEBALL 50: THE Results"]);
        assert!(t.colon_parts.is_empty());
        assert_eq!(t.keywords, vec!["DODGEBALL"]);
    }

    #[test]
    fn colon_split_once() {
        let t = parse_title("20YA: Dodgeball XX: a look back");
        assert!(!t.has_arrow_prefix);
        assert_eq!(t.colon_parts, vec!["20YA", "Dodgeball XX: a look back"]);
        assert_eq!(t.ya_number, Some(20));
        assert_eq!(t.keywords, vec!["XX"]);
    }
}
