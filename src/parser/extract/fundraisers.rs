use std::sync::LazyLock;

use regex::Regex;

use super::Origin;
use crate::config::Thresholds;
use crate::model::{FactSource, Fundraiser};
use crate::utils::{tail, window};

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\s*([0-9,]+(?:\.[0-9]{2})?)\s+(for|For|FOR|raised|donated)\b").unwrap()
});
/// Clause right after "for", up to the end of the sentence or line.
static CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^.!\n]+)").unwrap());
/// "raised for X" / "donated to X".
static TARGET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?i:for|to)\s+([^.!\n]+)").unwrap());

const LOOKAHEAD: usize = 100;

pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}

fn beneficiary(verb: &str, after: &str) -> Option<String> {
    let re: &Regex = if verb.eq_ignore_ascii_case("for") {
        &*CLAUSE_RE
    } else {
        &*TARGET_RE
    };
    re.captures(after)
        .map(|c| c[1].trim().to_string())
        .filter(|b| !b.is_empty())
}

pub fn extract(text: &str, origin: Origin<'_>, t: &Thresholds) -> Vec<Fundraiser> {
    let mut out = Vec::new();
    for caps in AMOUNT_RE.captures_iter(text) {
        let Some(amount) = parse_amount(&caps[1]) else {
            continue;
        };
        if amount <= t.fundraiser_noise {
            continue;
        }
        let Some(m) = caps.get(0) else {
            continue;
        };
        out.push(Fundraiser {
            amount,
            beneficiary: beneficiary(&caps[2], tail(text, m.end(), LOOKAHEAD)),
            post_id: Some(origin.post_id),
            date: origin.date.map(str::to_string),
            event_name: None,
            source: FactSource::Post,
            context: window(text, m.start(), m.end(), 30, 60).trim().to_string(),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<Fundraiser> {
        extract(
            text,
            Origin {
                post_id: 3,
                date: None,
            },
            &Thresholds::default(),
        )
    }

    #[test]
    fn beneficiary_after_for() {
        let got = run("We collected $1,250 for the Food Bank! Thanks all.");
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].amount, 1250.0);
        assert_eq!(got[0].beneficiary.as_deref(), Some("the Food Bank"));
        assert_eq!(got[0].source, FactSource::Post);
    }

    #[test]
    fn raised_and_donated() {
        let got = run("$500.50 raised for Autism Speaks.\n$300 donated to the shelter\n$200 raised overall");
        let b: Vec<_> = got.iter().map(|f| (f.amount, f.beneficiary.clone())).collect();
        assert_eq!(
            b,
            vec![
                (500.5, Some("Autism Speaks".to_string())),
                (300.0, Some("the shelter".to_string())),
                (200.0, None),
            ]
        );
    }

    #[test]
    fn small_amounts_are_noise() {
        assert!(run("It cost $5 for a ticket and $10 for two").is_empty());
    }
}
