use std::sync::LazyLock;

use regex::Regex;

use crate::config::Thresholds;
use crate::model::{Score, ScoreMention};
use crate::utils::window;

static DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2})\s*[-–]\s*([0-9]{1,2})").unwrap());
static TO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2})\s+to\s+([0-9]{1,2})").unwrap());
static YEAR_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]{4}$").unwrap());

fn digit_before(text: &str, start: usize) -> bool {
    text[..start].chars().next_back().is_some_and(|c| c.is_ascii_digit())
}

fn digit_after(text: &str, end: usize) -> bool {
    text[end..].chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Free-standing score pairs: not glued to other digits, inside the score range.
fn pairs<'t>(
    re: &'t Regex,
    text: &'t str,
    t: &'t Thresholds,
) -> impl Iterator<Item = (Score, usize, usize)> + 't {
    re.captures_iter(text).filter_map(move |caps| {
        let m = caps.get(0)?;
        if digit_before(text, m.start()) || digit_after(text, m.end()) {
            return None;
        }
        let a: u32 = caps[1].parse().ok()?;
        let b: u32 = caps[2].parse().ok()?;
        t.score_in_range(a, b)
            .then_some((Score { winner: a, loser: b }, m.start(), m.end()))
    })
}

/// First score in a trailing window: dash form first, then `N to M`.
pub fn find_score(after: &str, t: &Thresholds) -> Option<Score> {
    pairs(&DASH_RE, after, t)
        .next()
        .or_else(|| pairs(&TO_RE, after, t).next())
        .map(|(s, _, _)| s)
}

/// Every score mention in a post body.
pub fn extract_scores(text: &str, post_id: i64, t: &Thresholds) -> Vec<ScoreMention> {
    let mut out = Vec::new();
    for (re, check_year) in [(&*DASH_RE, true), (&*TO_RE, false)] {
        for (score, start, end) in pairs(re, text, t) {
            if check_year {
                let before = window(text, start, start, 10, 0).trim_end();
                if YEAR_TAIL_RE.is_match(before) {
                    continue;
                }
            }
            out.push(ScoreMention {
                score1: score.winner,
                score2: score.loser,
                display: score.to_string(),
                context: window(text, start, end, 40, 40).trim().to_string(),
                post_id,
            });
        }
    }
    out
}
