//! Event numbering systems.
//!
//! The archive counts events five different ways: `DODGEBALL 50` (or
//! `DODGEBALL L`), `Season 5`, `20YA` anniversaries, bare `C30` markers and
//! the later `ECD 50` / `ECD L` branding. All of them normalize to a plain
//! integer; the keyword decides the family.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::Thresholds;
use crate::model::{EventReference, NumberingSystem};

static DODGEBALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:dodgeball)\s+([0-9]+)").unwrap());
static DODGEBALL_ROMAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:dodgeball)\s+([IVXLCDM]{1,10})\b").unwrap());
static SEASON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:season)\s+([0-9]+)").unwrap());
static YA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)YA\b").unwrap());
static C_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bC([0-9]+)\b").unwrap());
static ECD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?i:ecd)\s+([0-9]+)").unwrap());
static ECD_ROMAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?i:ecd)\s+([IVXLCDM]{1,10})\b").unwrap());

fn roman_value(c: char) -> Option<u32> {
    Some(match c {
        'I' => 1,
        'V' => 5,
        'X' => 10,
        'L' => 50,
        'C' => 100,
        'D' => 500,
        'M' => 1000,
        _ => return None,
    })
}

/// Subtractive scan. Returns `None` for empty input or any non-numeral character.
pub fn roman_to_int(s: &str) -> Option<u32> {
    let values: Vec<u32> = s
        .trim()
        .chars()
        .map(|c| roman_value(c.to_ascii_uppercase()))
        .collect::<Option<_>>()?;
    if values.is_empty() {
        return None;
    }
    let mut total: i64 = 0;
    for (i, v) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(next) if v < next => total -= i64::from(*v),
            _ => total += i64::from(*v),
        }
    }
    u32::try_from(total).ok()
}

const ROMAN_TABLE: &[(u32, &str)] = &[
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

pub fn int_to_roman(mut n: u32) -> Option<String> {
    if n == 0 || n > 3999 {
        return None;
    }
    let mut out = String::new();
    for &(value, numeral) in ROMAN_TABLE {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    Some(out)
}

/// All event references in `text`, deduplicated by (family, number).
///
/// Order follows the systems: decimal dodgeball, Roman dodgeball, season,
/// anniversary, C-style, then ECD.
pub fn extract_event_refs(text: &str, t: &Thresholds) -> Vec<EventReference> {
    let mut refs = Vec::new();

    let decimal = |re: &Regex, system: NumberingSystem, refs: &mut Vec<EventReference>| {
        for caps in re.captures_iter(text) {
            let raw = &caps[1];
            if let Ok(number) = raw.parse::<u32>() {
                refs.push(EventReference {
                    system,
                    raw: raw.to_string(),
                    number,
                });
            }
        }
    };
    let roman = |re: &Regex, system: NumberingSystem, refs: &mut Vec<EventReference>| {
        for caps in re.captures_iter(text) {
            let raw = &caps[1];
            if let Some(number) = roman_to_int(raw) {
                refs.push(EventReference {
                    system,
                    raw: raw.to_string(),
                    number,
                });
            }
        }
    };

    decimal(&DODGEBALL_RE, NumberingSystem::Dodgeball, &mut refs);
    roman(&DODGEBALL_ROMAN_RE, NumberingSystem::DodgeballRoman, &mut refs);
    decimal(&SEASON_RE, NumberingSystem::Season, &mut refs);
    decimal(&YA_RE, NumberingSystem::YearAnniversary, &mut refs);

    for caps in C_STYLE_RE.captures_iter(text) {
        if let Ok(number) = caps[1].parse::<u32>() {
            if t.c_style_in_range(number) {
                refs.push(EventReference {
                    system: NumberingSystem::CStyle,
                    raw: caps[0].to_string(),
                    number,
                });
            }
        }
    }

    decimal(&ECD_RE, NumberingSystem::Ecd, &mut refs);
    roman(&ECD_ROMAN_RE, NumberingSystem::EcdRoman, &mut refs);

    let mut seen = HashSet::new();
    refs.retain(|r| in_range(r, t) && seen.insert((r.system.family(), r.number)));
    refs
}

fn in_range(r: &EventReference, t: &Thresholds) -> bool {
    match r.system {
        NumberingSystem::Season => t.season_in_range(r.number),
        NumberingSystem::YearAnniversary => r.number > 0,
        NumberingSystem::CStyle => t.c_style_in_range(r.number),
        _ => t.event_in_range(r.number),
    }
}

/// The event a text is about: its first event-keyword reference.
pub fn primary_event(refs: &[EventReference]) -> Option<u32> {
    refs.iter()
        .find(|r| r.system.registers_event())
        .map(|r| r.number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(text: &str) -> Vec<(NumberingSystem, u32)> {
        extract_event_refs(text, &Thresholds::default())
            .into_iter()
            .map(|r| (r.system, r.number))
            .collect()
    }

    #[test]
    fn roman_roundtrip() {
        for n in 1..=300 {
            let r = int_to_roman(n).unwrap();
            assert_eq!(roman_to_int(&r), Some(n), "{r}");
        }
        assert_eq!(roman_to_int("MCMXCIV"), Some(1994));
        assert_eq!(roman_to_int("ABC"), None);
        assert_eq!(roman_to_int(""), None);
        assert_eq!(int_to_roman(0), None);
    }

    #[test]
    fn digit_roman_and_ecd_share_a_key() {
        let keys: Vec<Option<u32>> = ["DODGEBALL 50", "DODGEBALL L", "ECD 50", "ECD L"]
            .iter()
            .map(|t| primary_event(&extract_event_refs(t, &Thresholds::default())))
            .collect();
        assert!(keys.iter().all(|k| *k == Some(50)));
    }

    #[test]
    fn dedups_by_family() {
        let got = numbers("DODGEBALL 50 was DODGEBALL L, also dodgeball 50 again");
        assert_eq!(got, vec![(NumberingSystem::Dodgeball, 50)]);
    }

    #[test]
    fn lower_case_words_are_not_numerals() {
        // "mix" and "lid" are words, not Roman numerals
        assert!(numbers("a dodgeball mix and a dodgeball lid").is_empty());
        assert_eq!(numbers("Dodgeball XX"), vec![(NumberingSystem::DodgeballRoman, 20)]);
    }

    #[test]
    fn all_five_systems() {
        let got = numbers("Season 5 | Dodgeball 50 Results\n20YA of C30 and ECD IV");
        assert_eq!(
            got,
            vec![
                (NumberingSystem::Dodgeball, 50),
                (NumberingSystem::Season, 5),
                (NumberingSystem::YearAnniversary, 20),
                (NumberingSystem::CStyle, 30),
                (NumberingSystem::EcdRoman, 4),
            ]
        );
    }

    #[test]
    fn out_of_range_numbers_are_dropped() {
        assert!(numbers("DODGEBALL 2010 and C1 and C300 and season 45").is_empty());
        assert_eq!(numbers("C299"), vec![(NumberingSystem::CStyle, 299)]);
    }
}
