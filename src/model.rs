use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ── Input ──

/// A post as handed over by the content fetcher. `error` marks a failed fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPost {
    pub id: i64,
    pub title: Option<String>,
    pub body_text: Option<String>,
    pub date: Option<String>,
    pub images: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub date: Option<String>,
    pub images: Vec<String>,
}

impl Post {
    pub fn from_raw(raw: RawPost) -> Option<Post> {
        if raw.error.is_some() {
            return None;
        }
        Some(Post {
            id: raw.id,
            title: raw.title.unwrap_or_default(),
            body: raw.body_text.unwrap_or_default(),
            date: raw.date.filter(|d| !d.trim().is_empty()),
            images: raw.images,
        })
    }

    /// Title and body joined the way every extractor reads them.
    pub fn full_text(&self) -> String {
        format!("{}\n{}", self.title, self.body)
    }

    pub fn day(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_day)
    }
}

/// Archive dates come as RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` or `Month D, YYYY`.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    ["%Y-%m-%d", "%B %d, %Y", "%B %d %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

// ── Classification ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostCategory {
    EventResults,
    EventPreview,
    Poster,
    Statistics,
    AnniversaryRetrospective,
    Anniversary,
    Probowl,
    IndoorEvent,
    Farewell,
    Contest,
    SeasonRecap,
    Announcement,
    Infographic,
    ImagePost,
    EventNarrative,
    Other,
}

impl PostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostCategory::EventResults => "event_results",
            PostCategory::EventPreview => "event_preview",
            PostCategory::Poster => "poster",
            PostCategory::Statistics => "statistics",
            PostCategory::AnniversaryRetrospective => "anniversary_retrospective",
            PostCategory::Anniversary => "anniversary",
            PostCategory::Probowl => "probowl",
            PostCategory::IndoorEvent => "indoor_event",
            PostCategory::Farewell => "farewell",
            PostCategory::Contest => "contest",
            PostCategory::SeasonRecap => "season_recap",
            PostCategory::Announcement => "announcement",
            PostCategory::Infographic => "infographic",
            PostCategory::ImagePost => "image_post",
            PostCategory::EventNarrative => "event_narrative",
            PostCategory::Other => "other",
        }
    }

    pub fn event_type(&self) -> Option<EventType> {
        match self {
            PostCategory::Anniversary | PostCategory::AnniversaryRetrospective => {
                Some(EventType::Anniversary)
            }
            PostCategory::Probowl => Some(EventType::Probowl),
            PostCategory::IndoorEvent => Some(EventType::Indoor),
            PostCategory::EventResults | PostCategory::EventNarrative => Some(EventType::Regular),
            _ => None,
        }
    }
}

impl fmt::Display for PostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleParts {
    pub has_arrow_prefix: bool,
    pub pipe_parts: Vec<String>,
    pub colon_parts: Vec<String>,
    pub ya_number: Option<u32>,
    pub keywords: Vec<String>,
}

// ── Event numbering ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingSystem {
    Dodgeball,
    DodgeballRoman,
    Season,
    YearAnniversary,
    CStyle,
    Ecd,
    EcdRoman,
}

/// Digit and Roman spellings under one keyword are the same claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemFamily {
    Dodgeball,
    Season,
    Year,
    C,
    Ecd,
}

impl NumberingSystem {
    pub fn family(&self) -> SystemFamily {
        match self {
            NumberingSystem::Dodgeball | NumberingSystem::DodgeballRoman => SystemFamily::Dodgeball,
            NumberingSystem::Season => SystemFamily::Season,
            NumberingSystem::YearAnniversary => SystemFamily::Year,
            NumberingSystem::CStyle => SystemFamily::C,
            NumberingSystem::Ecd | NumberingSystem::EcdRoman => SystemFamily::Ecd,
        }
    }

    /// Only the event-keyword families name an event directly.
    pub fn registers_event(&self) -> bool {
        matches!(self.family(), SystemFamily::Dodgeball | SystemFamily::Ecd)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventReference {
    pub system: NumberingSystem,
    pub raw: String,
    pub number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMeta {
    pub post_id: i64,
    pub title: String,
    pub date: Option<String>,
    pub category: PostCategory,
    pub title_parts: TitleParts,
    pub event_refs: Vec<EventReference>,
    pub primary_event: Option<u32>,
    pub section_count: usize,
    pub body_length: usize,
    pub image_count: usize,
}

// ── Matches ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Individual,
    Team,
    MainEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactSource {
    Post,
    Sidebar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Score {
    pub winner: u32,
    pub loser: u32,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.winner, self.loser)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: String,
    pub loser: String,
    pub score: Option<Score>,
    pub match_type: MatchType,
    pub post_id: Option<i64>,
    pub post_date: Option<String>,
    pub event_number: Option<u32>,
    pub source: FactSource,
    pub raw_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMention {
    pub score1: u32,
    pub score2: u32,
    pub display: String,
    pub context: String,
    pub post_id: i64,
}

// ── Players ──

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub aliases: Vec<String>,
    pub total_mentions: usize,
    pub post_count: usize,
    pub post_ids: Vec<i64>,
    pub first_mention_date: Option<String>,
    pub last_mention_date: Option<String>,
    pub wins: usize,
    pub losses: usize,
}

// ── Facts ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionType {
    Direct,
    Reference,
    InductionList,
    ClassList,
    Sidebar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub award_type: String,
    pub recipient: String,
    pub post_id: Option<i64>,
    pub date: Option<String>,
    pub mention_type: MentionType,
    pub event_name: Option<String>,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fundraiser {
    pub amount: f64,
    pub beneficiary: Option<String>,
    pub post_id: Option<i64>,
    pub date: Option<String>,
    pub event_name: Option<String>,
    pub source: FactSource,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub count: u32,
    pub context: String,
    pub post_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReference {
    pub season_number: u32,
    pub post_id: i64,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rivalry {
    pub player1: String,
    pub player2: Option<String>,
    pub post_id: i64,
    pub context: String,
}

// ── Events ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Anniversary,
    Probowl,
    Indoor,
    Regular,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_number: u32,
    pub name: String,
    pub post_ids: Vec<i64>,
    pub dates: Vec<String>,
    pub date: Option<String>,
    pub all_titles: Vec<String>,
    pub all_dates: Vec<String>,
    pub types: BTreeSet<EventType>,
    pub matches: Vec<MatchResult>,
    pub attendance: Vec<u32>,
    pub best_attendance: Option<u32>,
    pub awards: Vec<Award>,
}

impl Event {
    pub fn new(event_number: u32) -> Self {
        Event {
            event_number,
            ..Default::default()
        }
    }

    pub fn add_post(&mut self, post_id: i64, date: Option<&str>) {
        if self.post_ids.contains(&post_id) {
            return;
        }
        self.post_ids.push(post_id);
        if let Some(d) = date {
            self.dates.push(d.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errored_records_are_dropped() {
        let raw = RawPost {
            id: 7,
            error: Some("timeout".into()),
            ..Default::default()
        };
        assert!(Post::from_raw(raw).is_none());

        let raw = RawPost {
            id: 8,
            title: Some("Dodgeball 8".into()),
            date: Some("   ".into()),
            ..Default::default()
        };
        let post = Post::from_raw(raw).unwrap();
        assert_eq!(post.body, "");
        assert_eq!(post.date, None);
    }

    #[test]
    fn parses_archive_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2009, 6, 14);
        assert_eq!(parse_day("2009-06-14"), expected);
        assert_eq!(parse_day("2009-06-14 18:30:00"), expected);
        assert_eq!(parse_day("2009-06-14T18:30:00-04:00"), expected);
        assert_eq!(parse_day("June 14, 2009"), expected);
        assert_eq!(parse_day("sometime in june"), None);
    }

    #[test]
    fn roman_and_digit_share_family() {
        assert_eq!(
            NumberingSystem::Dodgeball.family(),
            NumberingSystem::DodgeballRoman.family()
        );
        assert_ne!(NumberingSystem::Dodgeball.family(), NumberingSystem::Ecd.family());
        assert!(NumberingSystem::EcdRoman.registers_event());
        assert!(!NumberingSystem::Season.registers_event());
    }

    #[test]
    fn event_membership_is_unique() {
        let mut e = Event::new(50);
        e.add_post(1, Some("2010-05-01"));
        e.add_post(1, Some("2010-05-01"));
        e.add_post(2, None);
        assert_eq!(e.post_ids, vec![1, 2]);
        assert_eq!(e.dates, vec!["2010-05-01".to_string()]);
    }
}
