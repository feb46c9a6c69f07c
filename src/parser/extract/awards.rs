use std::sync::LazyLock;

use regex::Regex;

use super::Origin;
use crate::model::{Award, MentionType};
use crate::names::NameTables;
use crate::parser::{CAPS_NAME, NAME};
use crate::utils::{first_token, is_all_caps, normalize_ws, title_case, truncate_chars, window};

const CONTEXT_MAX: usize = 200;

struct Direct {
    re: Regex,
    award_type: &'static str,
}

fn direct(pattern: &str, award_type: &'static str) -> Direct {
    let pattern = pattern.replace("{NAME}", NAME).replace("{CAPS}", CAPS_NAME);
    Direct {
        re: Regex::new(&pattern).unwrap(),
        award_type,
    }
}

/// Label followed by recipient, in priority order.
static DIRECT: LazyLock<Vec<Direct>> = LazyLock::new(|| {
    vec![
        direct(r"ECD\s*Elite\s+(?:Inductee|inductee)[:\s]*({NAME})", "ECD Elite"),
        direct(r"ECD\s*Elite\s+(?:Inductee|inductee)\s*\n\s*({CAPS})", "ECD Elite"),
        direct(r"Rimshot\s+(?:Contest\s+)?(?:Champion|winner)[:\s]*({NAME})", "Rimshot Champion"),
        direct(r"Rimshot\s+(?:Contest\s+)?(?:Champion|winner)\s*\n\s*({CAPS})", "Rimshot Champion"),
        direct(
            r#"(?i:rimshot\s+contest)\s+(?:#[0-9]+)?[:\s]*["“”]?.*?(?i:winner)\s*[★:]\s*({NAME})"#,
            "Rimshot Champion",
        ),
        direct(r"Hit\s+[Tt]he\s+Human\s+Champion[:\s]*({NAME})", "Hit The Human Champion"),
        direct(r"Hit\s+[Tt]he\s+Human\s+Champion\s*\n\s*({CAPS})", "Hit The Human Champion"),
        direct(r"200\s+Events?\s+Award[:\s]*({NAME})", "200 Events Award"),
        direct(r"200\s+Events?\s+Award\s*\n\s*({CAPS})", "200 Events Award"),
        direct(r"(?:MVP|Most\s+Valuable(?:\s+Player)?)[:\s]*({NAME})", "MVP"),
        direct(r"Excellence\s+Award[:\s]*({NAME})", "Excellence Award"),
        direct(r"In\s+Remembrance\s*\n\s*({CAPS})", "In Remembrance"),
        direct(r"In\s+Remembrance[:\s]*({NAME})", "In Remembrance"),
    ]
});

static HOF_REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"Hall\s+of\s+Famer[,:\s]+({NAME})")).unwrap()
});
static INDUCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:inaugural class|inducted).{0,30}(?:Hall of Fame|ECDElite)[:\s]*(.{20,200}?)(?:\.|$)")
        .unwrap()
});
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)Hall\s+of\s+Fame[:\s]*(?:INAUGURAL CLASS|New Class|Class of [0-9]+)[!\s]*\n((?s:.{20,500}?))(?:\n\n|\n___|\z)",
    )
    .unwrap()
});
static FLOWING_RIMSHOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i:rimshot\s+contest\s+winner)\s+({NAME})")).unwrap()
});
static TWO_WORD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][a-z]+[ \t]+[A-Z][a-z']+").unwrap());

/// Title-cases shouted names and drops fragments.
fn clean_recipient(raw: &str, tables: &NameTables) -> Option<String> {
    let mut name = normalize_ws(raw);
    if is_all_caps(&name) {
        name = title_case(&name);
    }
    if name.chars().count() <= 2 || tables.is_stopword(first_token(&name)) {
        return None;
    }
    Some(name)
}

pub fn extract(text: &str, origin: Origin<'_>, tables: &NameTables) -> Vec<Award> {
    let resolver = tables.resolver();
    let mut awards = Vec::new();

    let mut push = |award_type: &str, raw: &str, mention_type: MentionType, context: &str| {
        if let Some(name) = clean_recipient(raw, tables) {
            awards.push(Award {
                award_type: award_type.to_string(),
                recipient: resolver.canonical(&name, context),
                post_id: Some(origin.post_id),
                date: origin.date.map(str::to_string),
                mention_type,
                event_name: None,
                context: truncate_chars(context.trim(), CONTEXT_MAX),
            });
        }
    };

    for d in DIRECT.iter() {
        for caps in d.re.captures_iter(text) {
            let m = caps.get(0).map_or(0..0, |m| m.range());
            let context = window(text, m.start, m.end, 30, 50);
            push(d.award_type, &caps[1], MentionType::Direct, context);
        }
    }

    for caps in HOF_REFERENCE_RE.captures_iter(text) {
        let m = caps.get(0).map_or(0..0, |m| m.range());
        let context = window(text, m.start, m.end, 20, 30);
        push("Hall of Fame", &caps[1], MentionType::Reference, context);
    }

    for caps in INDUCTION_RE.captures_iter(text) {
        let context = &caps[0];
        for name in TWO_WORD_NAME_RE.find_iter(&caps[1]) {
            push("Hall of Fame", name.as_str(), MentionType::InductionList, context);
        }
    }

    for caps in CLASS_RE.captures_iter(text) {
        let names = &caps[1];
        for name in TWO_WORD_NAME_RE.find_iter(names) {
            push("Hall of Fame", name.as_str(), MentionType::ClassList, names);
        }
    }

    for caps in FLOWING_RIMSHOT_RE.captures_iter(text) {
        let m = caps.get(0).map_or(0..0, |m| m.range());
        let context = window(text, m.start, m.end, 20, 30);
        push("Rimshot Champion", &caps[1], MentionType::Direct, context);
    }

    awards
}
