use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::Rivalry;
use crate::names::NameTables;
use crate::parser::matches::validate_name;
use crate::parser::SHORT_NAME;
use crate::utils::window;

static PAIR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"({N})\s+(?:vs\.?|versus|v\.)\s+({N})",
        r"({N})\s*/\s*({N})\s+rivalry",
        r"(?:rivalry|feud)\s+(?:between|with)\s+({N})\s+(?:and|&)\s+({N})",
    ]
    .iter()
    .map(|p| Regex::new(&p.replace("{N}", SHORT_NAME)).unwrap())
    .collect()
});

static SOLO_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"({N})(?:'s|')?\s+(?:arch-?nemesis|nemesis|rival)\b",
        r"nemesis\s+of\s+({N})",
    ]
    .iter()
    .map(|p| Regex::new(&p.replace("{N}", SHORT_NAME)).unwrap())
    .collect()
});

pub fn extract(text: &str, post_id: i64, tables: &NameTables) -> Vec<Rivalry> {
    let resolver = tables.resolver();
    let mut out = Vec::new();

    for re in PAIR_PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            let context = window(text, m.start(), m.end(), 40, 40).trim();
            let Some(p1) = validate_name(&caps[1], tables) else {
                continue;
            };
            let p1 = resolver.canonical(&p1, context);
            // an unresolvable second party still leaves a one-sided rivalry
            let p2 = validate_name(&caps[2], tables).map(|p2| resolver.canonical(&p2, context));
            if p2.as_deref() == Some(p1.as_str()) {
                continue;
            }
            out.push(Rivalry {
                player1: p1,
                player2: p2,
                post_id,
                context: context.to_string(),
            });
        }
    }

    for re in SOLO_PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            let context = window(text, m.start(), m.end(), 40, 60).trim();
            // the name pattern allows apostrophes, so "Adams's" lands in the capture
            let raw = caps[1].trim_end_matches("'s").trim_end_matches('\'');
            let Some(name) = validate_name(raw, tables) else {
                continue;
            };
            out.push(Rivalry {
                player1: resolver.canonical(&name, context),
                player2: None,
                post_id,
                context: context.to_string(),
            });
        }
    }
    out
}

/// One record per unordered pair, first occurrence kept.
pub fn dedup(rivalries: Vec<Rivalry>) -> Vec<Rivalry> {
    let mut seen = HashSet::new();
    rivalries
        .into_iter()
        .filter(|r| {
            let a = r.player1.as_str();
            let b = r.player2.as_deref().unwrap_or("");
            let key = if a <= b { (a.to_string(), b.to_string()) } else { (b.to_string(), a.to_string()) };
            seen.insert(key)
        })
        .collect()
}
