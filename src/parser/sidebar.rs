//! Homepage sidebar dumps.
//!
//! The sidebar lists one block per event, separated by underscore rules:
//!
//! ```text
//! DODGEBALL L
//! June 14, 2009
//! Main Event Match
//! JOHN TRONOLONE
//! defeated
//! CHRIS ADAMS
//! ECD Elite Inductee
//! KEVIN MEGILL
//! $1,250 For The Food Bank
//! ______
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::extract::fundraisers::parse_amount;

static BLOCK_SEP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_{5,}").unwrap());
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^((?:January|February|March|April|May|June|July|August|September|October|November|December)\s+[0-9]+,?\s+[0-9]{4})",
    )
    .unwrap()
});
static FUNDRAISER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([0-9,]+)\s+(?:For|for)\s+(.+)").unwrap());
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$([0-9,]+)").unwrap());

const MAIN_EVENT_LABEL: &str = "Main Event Match";

/// (label as printed, award type)
const AWARD_LABELS: &[(&str, &str)] = &[
    ("ECD Elite Inductee", "ECD Elite"),
    ("Rimshot Contest Champion", "Rimshot Champion"),
    ("Hit The Human Champion", "Hit The Human Champion"),
    ("200 Events Award", "200 Events Award"),
    ("In Remembrance", "In Remembrance"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainEvent {
    pub winner: String,
    pub loser: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidebarAward {
    pub award_type: String,
    pub recipient: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidebarFundraiser {
    pub amount: f64,
    pub beneficiary: Option<String>,
    pub line: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SidebarEvent {
    pub name: String,
    pub date: Option<String>,
    pub main_event: Option<MainEvent>,
    pub awards: Vec<SidebarAward>,
    pub fundraisers: Vec<SidebarFundraiser>,
}

impl SidebarEvent {
    fn has_facts(&self) -> bool {
        self.date.is_some()
            || self.main_event.is_some()
            || !self.awards.is_empty()
            || !self.fundraisers.is_empty()
    }
}

/// Main event collection: label, winner, optional "defeated", loser.
#[derive(Debug, Clone, PartialEq)]
enum MainEventState {
    Idle,
    AwaitingWinner,
    AwaitingLoser { winner: String },
    Complete { winner: String, loser: String },
}

impl MainEventState {
    fn feed(self, line: &str) -> Self {
        match self {
            MainEventState::AwaitingWinner => MainEventState::AwaitingLoser {
                winner: line.to_string(),
            },
            MainEventState::AwaitingLoser { winner } if line.eq_ignore_ascii_case("defeated") => {
                MainEventState::AwaitingLoser { winner }
            }
            MainEventState::AwaitingLoser { winner } => MainEventState::Complete {
                winner,
                loser: line.to_string(),
            },
            other => other,
        }
    }
}

fn parse_block(block: &str) -> Option<SidebarEvent> {
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let (first, rest) = lines.split_first()?;

    let mut event = SidebarEvent {
        name: first.to_string(),
        ..Default::default()
    };
    let mut state = MainEventState::Idle;
    let mut pending_award: Option<&str> = None;

    for line in &lines {
        if let Some(caps) = DATE_RE.captures(line) {
            event.date = Some(caps[1].to_string());
        }
    }

    for line in rest {
        if line.contains(MAIN_EVENT_LABEL) {
            state = MainEventState::AwaitingWinner;
            continue;
        }
        if matches!(
            state,
            MainEventState::AwaitingWinner | MainEventState::AwaitingLoser { .. }
        ) {
            state = state.feed(line);
            if let MainEventState::Complete { winner, loser } = &state {
                event.main_event = Some(MainEvent {
                    winner: winner.clone(),
                    loser: loser.clone(),
                });
            }
            continue;
        }

        if let Some(award_type) = pending_award.take() {
            if line.starts_with('$') {
                if !FUNDRAISER_RE.is_match(line) {
                    if let Some(amount) = AMOUNT_RE.captures(line).and_then(|c| parse_amount(&c[1])) {
                        event.fundraisers.push(SidebarFundraiser {
                            amount,
                            beneficiary: None,
                            line: line.to_string(),
                        });
                    }
                }
            } else {
                event.awards.push(SidebarAward {
                    award_type: award_type.to_string(),
                    recipient: line.to_string(),
                });
            }
        }

        if let Some((_, award_type)) = AWARD_LABELS.iter().find(|(label, _)| line.contains(label)) {
            pending_award = Some(*award_type);
        }

        if let Some(caps) = FUNDRAISER_RE.captures(line) {
            if let Some(amount) = parse_amount(&caps[1]) {
                event.fundraisers.push(SidebarFundraiser {
                    amount,
                    beneficiary: Some(caps[2].trim().to_string()),
                    line: line.to_string(),
                });
            }
        }
    }

    event.has_facts().then_some(event)
}

pub fn parse_sidebar(text: &str) -> Vec<SidebarEvent> {
    BLOCK_SEP_RE
        .split(text)
        .filter_map(parse_block)
        .collect()
}
