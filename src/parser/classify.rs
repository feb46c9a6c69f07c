use std::sync::LazyLock;

use regex::Regex;

use super::rules::{first_match, Rule};
use crate::model::{Post, PostCategory};

static YA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+ya\b").unwrap());
static DASH_SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+\s*[-–]\s*[0-9]+").unwrap());
static NUMBERED_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:dodgeball|episode)\s+\w+").unwrap());

/// Lower-cased views of a post that every rule reads.
pub struct Signals {
    pub title: String,
    /// Title plus body prefix.
    pub combined: String,
    pub body_len: usize,
    pub has_images: bool,
}

impl Signals {
    pub fn new(post: &Post, prefix_chars: usize) -> Self {
        let title = post.title.to_lowercase();
        let prefix: String = post.body.chars().take(prefix_chars).collect();
        let combined = format!("{} {}", title, prefix.to_lowercase());
        Signals {
            title,
            combined,
            body_len: post.body.chars().count(),
            has_images: !post.images.is_empty(),
        }
    }

    fn title_has(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.title.contains(w))
    }

    fn text_has(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.combined.contains(w))
    }
}

const GAME_WORDS: &[&str] = &["dodgeball", "eliminated", "thrown", "defeated", "captain"];
const PLAY_WORDS: &[&str] = &["game", "elimination", "throw", "ball", "round"];

type CategoryRule = Rule<Signals, PostCategory>;

static RULES: &[CategoryRule] = &[
    // title rules
    Rule {
        name: "title_results",
        test: |s| s.title_has(&["results", "scores", "final score", "recap"]),
        result: PostCategory::EventResults,
    },
    Rule {
        name: "title_preview",
        test: |s| s.title_has(&["preview", "upcoming", "confirmed", "prediction"]),
        result: PostCategory::EventPreview,
    },
    Rule {
        name: "title_poster",
        test: |s| s.title_has(&["poster", "official poster", "promotional"]),
        result: PostCategory::Poster,
    },
    Rule {
        name: "title_statistics",
        test: |s| s.title_has(&["statistics", "stats", "record"]),
        result: PostCategory::Statistics,
    },
    Rule {
        name: "title_years_ago",
        test: |s| YA_RE.is_match(&s.title),
        result: PostCategory::AnniversaryRetrospective,
    },
    Rule {
        name: "title_anniversary",
        test: |s| s.title_has(&["anniversary", "birthday"]),
        result: PostCategory::Anniversary,
    },
    Rule {
        name: "title_probowl",
        test: |s| s.title_has(&["probowl", "pro bowl", "fundrais"]),
        result: PostCategory::Probowl,
    },
    Rule {
        name: "title_indoor",
        test: |s| s.title.contains("indoor"),
        result: PostCategory::IndoorEvent,
    },
    Rule {
        name: "title_farewell",
        test: |s| s.title_has(&["goodbye", "farewell", "see you later", "retirement"]),
        result: PostCategory::Farewell,
    },
    Rule {
        name: "title_contest",
        test: |s| s.title_has(&["rimshot", "hit the human", "htth"]),
        result: PostCategory::Contest,
    },
    Rule {
        name: "title_season",
        test: |s| s.title_has(&["season", "finale"]),
        result: PostCategory::SeasonRecap,
    },
    // content rules
    Rule {
        name: "defeated_with_score",
        test: |s| s.combined.contains("defeated") && DASH_SCORE_RE.is_match(&s.combined),
        result: PostCategory::EventResults,
    },
    Rule {
        name: "captains_picking",
        test: |s| {
            s.combined.contains("captain")
                && (s.combined.contains("team") || s.combined.contains("picked"))
        },
        result: PostCategory::EventResults,
    },
    Rule {
        name: "save_the_date",
        test: |s| s.text_has(&["save the date", "mark your calendar"]),
        result: PostCategory::Announcement,
    },
    Rule {
        name: "infographic",
        test: |s| s.text_has(&["infographic", "flickr"]),
        result: PostCategory::Infographic,
    },
    Rule {
        name: "short_with_images",
        test: |s| s.body_len < 100 && s.has_images,
        result: PostCategory::ImagePost,
    },
    Rule {
        name: "long_game_text",
        test: |s| s.body_len > 500 && s.text_has(GAME_WORDS),
        result: PostCategory::EventResults,
    },
    Rule {
        name: "arrow_title",
        test: |s| s.title.starts_with(">>>") || s.title.starts_with("> > >"),
        result: PostCategory::EventNarrative,
    },
    Rule {
        name: "numbered_title",
        test: |s| NUMBERED_TITLE_RE.is_match(&s.title),
        result: PostCategory::EventNarrative,
    },
    Rule {
        name: "wall_vs_all",
        test: |s| s.text_has(&["wall v", "wall vs", "wall-all", "team wall", "team all"]),
        result: PostCategory::EventResults,
    },
    Rule {
        name: "medium_with_images",
        test: |s| s.body_len < 200 && s.has_images,
        result: PostCategory::ImagePost,
    },
    Rule {
        name: "game_narrative",
        test: |s| s.body_len > 300 && s.text_has(PLAY_WORDS),
        result: PostCategory::EventNarrative,
    },
];

pub fn classify(post: &Post, prefix_chars: usize) -> PostCategory {
    let signals = Signals::new(post, prefix_chars);
    first_match(RULES, &signals)
        .map(|r| r.result)
        .unwrap_or(PostCategory::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, body: &str, images: usize) -> Post {
        Post {
            id: 1,
            title: title.to_string(),
            body: body.to_string(),
            date: None,
            images: (0..images).map(|i| format!("img{i}.jpg")).collect(),
        }
    }

    #[test]
    fn title_rules_fire_in_order() {
        // "results" beats "season"
        assert_eq!(
            classify(&post("Season 5 | Dodgeball 50 Results", "", 0), 500),
            PostCategory::EventResults
        );
        assert_eq!(classify(&post("Season 5 Finale", "", 0), 500), PostCategory::SeasonRecap);
        assert_eq!(
            classify(&post("10YA: Dodgeball X", "", 0), 500),
            PostCategory::AnniversaryRetrospective
        );
        assert_eq!(classify(&post("ProBowl IV", "", 0), 500), PostCategory::Probowl);
        assert_eq!(
            classify(&post("Stats and anniversary", "", 0), 500),
            PostCategory::Statistics
        );
    }

    #[test]
    fn content_rules() {
        assert_eq!(
            classify(&post("Sunday", "Chris defeated Tom 6-3 in the final", 0), 500),
            PostCategory::EventResults
        );
        assert_eq!(
            classify(&post("Mark it down", "Save the date for June", 0), 500),
            PostCategory::Announcement
        );
        assert_eq!(classify(&post("Pics", "look", 3), 500), PostCategory::ImagePost);
        assert_eq!(
            classify(&post(">>> The Return", "it happened", 0), 500),
            PostCategory::EventNarrative
        );
        assert_eq!(
            classify(&post("Dodgeball Forty", "words", 0), 500),
            PostCategory::EventNarrative
        );
        assert_eq!(classify(&post("Hello", "nothing here", 0), 500), PostCategory::Other);
    }

    #[test]
    fn long_body_uses_full_length() {
        let body = format!("{} dodgeball", "x".repeat(600));
        // keyword sits past the prefix, so the long-text rule cannot see it
        assert_eq!(classify(&post("Untitled", &body, 0), 500), PostCategory::Other);

        let body = format!("dodgeball {}", "x".repeat(600));
        assert_eq!(classify(&post("Untitled", &body, 0), 500), PostCategory::EventResults);
    }
}
