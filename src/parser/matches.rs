//! Match results from free text.
//!
//! Patterns run in tiers, most specific first. Every candidate name goes
//! through the same validation before the resolver sees it, and the output is
//! merged so that the most complete claim for a pair survives.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::scores::find_score;
use super::{CAPS_NAME, NAME};
use crate::config::Thresholds;
use crate::model::{FactSource, MatchResult, MatchType};
use crate::names::NameTables;
use crate::utils::{first_token, normalize_ws, tail, title_case, token_count, truncate_chars, window};

static MULTILINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"({NAME})[ \t]*\n\s*defeated[ \t]*\n\s*({NAME})")).unwrap()
});
static SAME_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"({NAME})[ \t]+defeated[ \t]+({NAME})")).unwrap());
static TEAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"({NAME})[ \t]+and[ \t]+company[ \t]+defeated[ \t]+({NAME})")).unwrap()
});
static ALL_CAPS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"({CAPS_NAME})\s+defeated\s+({CAPS_NAME})")).unwrap()
});
static ALT_VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"({NAME})[ \t]+(?:beat|outlasted|bested|conquered)[ \t]+({NAME})"
    ))
    .unwrap()
});

#[derive(Clone, Copy)]
enum ScoreWindow {
    Multiline,
    Standard,
    None,
}

struct Tier {
    re: &'static LazyLock<Regex>,
    match_type: MatchType,
    window: ScoreWindow,
    upper_case: bool,
}

static TIERS: [Tier; 5] = [
    Tier {
        re: &MULTILINE_RE,
        match_type: MatchType::Individual,
        window: ScoreWindow::Multiline,
        upper_case: false,
    },
    Tier {
        re: &SAME_LINE_RE,
        match_type: MatchType::Individual,
        window: ScoreWindow::Standard,
        upper_case: false,
    },
    Tier {
        re: &TEAM_RE,
        match_type: MatchType::Team,
        window: ScoreWindow::Standard,
        upper_case: false,
    },
    Tier {
        re: &ALL_CAPS_RE,
        match_type: MatchType::MainEvent,
        window: ScoreWindow::None,
        upper_case: true,
    },
    Tier {
        re: &ALT_VERB_RE,
        match_type: MatchType::Individual,
        window: ScoreWindow::Standard,
        upper_case: false,
    },
];

#[derive(Debug, Default)]
pub struct MatchExtraction {
    pub matches: Vec<MatchResult>,
    /// Candidates that failed name validation.
    pub rejected: usize,
}

/// Whitespace-normalized candidate name, or `None` when it cannot be a player.
pub fn validate_name(raw: &str, tables: &NameTables) -> Option<String> {
    let name = normalize_ws(raw);
    if name.chars().count() < 3 || tables.is_stopword(first_token(&name)) {
        return None;
    }
    if token_count(&name) == 1 && !tables.accepts_single_token(&name) {
        return None;
    }
    Some(name)
}

pub fn extract_matches(text: &str, tables: &NameTables, t: &Thresholds) -> MatchExtraction {
    let resolver = tables.resolver();
    let mut out = MatchExtraction::default();

    for tier in &TIERS {
        for caps in tier.re.captures_iter(text) {
            let Some(candidate) = candidate(&caps, tier, text, tables, t) else {
                out.rejected += 1;
                continue;
            };
            let (winner, loser, score, snippet) = candidate;
            let winner = resolver.canonical(&winner, &snippet);
            let loser = resolver.canonical(&loser, &snippet);
            if winner == loser {
                out.rejected += 1;
                continue;
            }
            merge_match(
                &mut out.matches,
                MatchResult {
                    winner,
                    loser,
                    score,
                    match_type: tier.match_type,
                    post_id: None,
                    post_date: None,
                    event_number: None,
                    source: FactSource::Post,
                    raw_text: snippet,
                },
                |m| (m.winner.clone(), m.loser.clone()),
            );
        }
    }
    out
}

type Candidate = (String, String, Option<crate::model::Score>, String);

fn candidate(
    caps: &Captures<'_>,
    tier: &Tier,
    text: &str,
    tables: &NameTables,
    t: &Thresholds,
) -> Option<Candidate> {
    let m = caps.get(0)?;
    let fix = |s: &str| if tier.upper_case { title_case(s.trim()) } else { s.to_string() };
    let winner = validate_name(&fix(&caps[1]), tables)?;
    let loser = validate_name(&fix(&caps[2]), tables)?;

    let score = match tier.window {
        ScoreWindow::Multiline => find_score(tail(text, m.end(), t.multiline_score_window), t),
        ScoreWindow::Standard => find_score(tail(text, m.end(), t.score_window), t),
        ScoreWindow::None => None,
    };
    let snippet = truncate_chars(window(text, m.start(), m.end(), 20, 40), t.snippet_max_chars);
    Some((winner, loser, score, snippet))
}

/// Insert `m` unless an equal or more complete claim already exists.
///
/// Records are grouped by `group`. Within a group an exact repeat (same
/// score, or both unscored) is dropped, a scored record takes the place of
/// an unscored one, and an unscored record is dropped when the group already
/// has anything. Returns whether the set changed.
pub fn merge_match<K, F>(set: &mut Vec<MatchResult>, m: MatchResult, group: F) -> bool
where
    K: PartialEq,
    F: Fn(&MatchResult) -> K,
{
    let key = group(&m);
    let mut members = set.iter().enumerate().filter(|(_, x)| group(*x) == key);

    match m.score {
        None => {
            if members.next().is_some() {
                return false;
            }
            set.push(m);
            true
        }
        Some(score) => {
            let mut unscored = None;
            for (i, x) in members {
                match x.score {
                    Some(s) if s == score => return false,
                    None if unscored.is_none() => unscored = Some(i),
                    _ => {}
                }
            }
            match unscored {
                Some(i) => set[i] = m,
                None => set.push(m),
            }
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Score;

    fn run(text: &str) -> MatchExtraction {
        extract_matches(text, &NameTables::builtin(), &Thresholds::default())
    }

    fn pair(m: &MatchResult) -> (String, String) {
        (m.winner.clone(), m.loser.clone())
    }

    fn dedup_matches(items: impl IntoIterator<Item = MatchResult>) -> Vec<MatchResult> {
        let mut set = Vec::new();
        for m in items {
            merge_match(&mut set, m, pair);
        }
        set
    }

    #[test]
    fn multiline_result_with_score() {
        let out = run("Season 5 | Dodgeball 50 Results\nJohn Tronolone\ndefeated\nChris Adams\n6-3");
        assert_eq!(out.matches.len(), 1);
        let m = &out.matches[0];
        assert_eq!(m.winner, "John Tronolone");
        assert_eq!(m.loser, "Chris Adams");
        assert_eq!(m.score.map(|s| s.to_string()).as_deref(), Some("6-3"));
        assert_eq!(m.match_type, MatchType::Individual);
    }

    #[test]
    fn same_line_team_and_alt_verbs() {
        let out = run(
            "Kevin Megill and company defeated Justin Pierce 5-2.\n\
             Tom Adams outlasted Steve Adams in overtime.",
        );
        let team = out
            .matches
            .iter()
            .find(|m| m.match_type == MatchType::Team)
            .unwrap();
        assert_eq!(pair(team), ("Kevin Megill".into(), "Justin Pierce".into()));
        assert_eq!(team.score, Some(Score { winner: 5, loser: 2 }));
        assert!(out
            .matches
            .iter()
            .any(|m| pair(m) == ("Tom Adams".into(), "Steve Adams".into()) && m.score.is_none()));
    }

    #[test]
    fn all_caps_sidebar_style() {
        let out = run("Main Event Match\nJOHN TRONOLONE\ndefeated\nCHRIS ADAMS");
        assert_eq!(out.matches.len(), 1);
        assert_eq!(out.matches[0].match_type, MatchType::MainEvent);
        assert_eq!(out.matches[0].winner, "John Tronolone");
        assert_eq!(out.matches[0].score, None);
    }

    #[test]
    fn unknown_single_tokens_are_rejected() {
        let out = run("Bob defeated Chris Adams 3-1. Fitz defeated Megill 4-0.");
        assert!(out.matches.iter().all(|m| m.winner != "Bob"));
        assert!(out
            .matches
            .iter()
            .any(|m| pair(m) == ("Kevin Fitzpatrick".into(), "Kevin Megill".into())));
        assert!(out.rejected >= 1);
    }

    #[test]
    fn stopword_and_self_pairs_rejected() {
        let out = run("The Team defeated Chris Adams. Krott defeated Michael Krott 2-1.");
        assert!(out.matches.is_empty());
        assert_eq!(out.rejected, 2);
    }

    #[test]
    fn short_names_are_rejected() {
        let out = run("Al defeated Chris Adams 3-1.");
        assert!(out.matches.is_empty());
        assert_eq!(out.rejected, 1);
        assert!(validate_name("Al", &NameTables::builtin()).is_none());
    }

    #[test]
    fn worded_score_after_result() {
        let out = run("John Tronolone defeated Chris Adams 4 to 2 in the final.");
        assert_eq!(out.matches.len(), 1);
        assert_eq!(out.matches[0].score, Some(Score { winner: 4, loser: 2 }));
    }

    #[test]
    fn names_do_not_cross_lines() {
        let out = run("Recap\nJohn Tronolone defeated Chris Adams 6-3");
        assert_eq!(out.matches.len(), 1);
        assert_eq!(out.matches[0].winner, "John Tronolone");
    }

    #[test]
    fn scored_wins_either_order() {
        let base = MatchResult {
            winner: "A Person".into(),
            loser: "B Person".into(),
            score: None,
            match_type: MatchType::Individual,
            post_id: Some(1),
            post_date: None,
            event_number: None,
            source: FactSource::Post,
            raw_text: String::new(),
        };
        let scored = MatchResult {
            score: Some(Score { winner: 7, loser: 5 }),
            post_id: Some(2),
            ..base.clone()
        };

        let a = dedup_matches(vec![base.clone(), scored.clone()]);
        let b = dedup_matches(vec![scored.clone(), base.clone()]);
        assert_eq!(a, vec![scored.clone()]);
        assert_eq!(b, vec![scored.clone()]);

        // idempotent
        let twice = dedup_matches(a.iter().cloned().chain(a.iter().cloned()));
        assert_eq!(twice, a);
        assert_eq!(dedup_matches(a.clone()), a);
    }

    #[test]
    fn distinct_scores_in_one_post_are_kept() {
        let m = |w, l| MatchResult {
            winner: "A Person".into(),
            loser: "B Person".into(),
            score: Some(Score { winner: w, loser: l }),
            match_type: MatchType::Individual,
            post_id: None,
            post_date: None,
            event_number: None,
            source: FactSource::Post,
            raw_text: String::new(),
        };
        let set = dedup_matches(vec![m(6, 3), m(7, 5), m(6, 3)]);
        assert_eq!(set.len(), 2);
    }
}
