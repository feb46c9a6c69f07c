use std::collections::BTreeSet;

use chrono::Utc;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::metrics::PassMetric;
use crate::model::{Award, Event, Fundraiser, PlayerRecord, Post, PostMeta, SeasonReference};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPlayer {
    pub name: String,
    pub mentions: usize,
    pub wins: usize,
    pub losses: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_posts: usize,
    pub posts_with_text: usize,
    pub posts_image_only: usize,
    pub unique_events: usize,
    pub event_number_range: Option<(u32, u32)>,
    pub total_players: usize,
    pub match_results: usize,
    pub scores_found: usize,
    pub awards: usize,
    pub fundraisers: usize,
    pub total_fundraiser_amount: f64,
    pub attendance_records: usize,
    pub seasons_found: Vec<u32>,
    pub rivalries: usize,
    pub post_type_distribution: Vec<(String, usize)>,
    pub award_type_distribution: Vec<(String, usize)>,
    pub top_players: Vec<TopPlayer>,
    pub rejected_candidates: usize,
    pub skipped_records: usize,
    pub passes: Vec<PassMetric>,
    pub parsed_at: String,
}

/// Everything the summary is computed from.
pub struct SummaryInput<'a> {
    pub posts: &'a [Post],
    pub metas: &'a [PostMeta],
    pub events: &'a [Event],
    pub players: &'a [PlayerRecord],
    pub match_results: usize,
    pub scores_found: usize,
    pub awards: &'a [Award],
    pub fundraisers: &'a [Fundraiser],
    pub attendance_records: usize,
    pub seasons: &'a [SeasonReference],
    pub rivalries: usize,
    pub skipped_records: usize,
    pub top_players: usize,
}

/// Label counts, most common first, ties alphabetical.
fn distribution<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    labels
        .counts()
        .into_iter()
        .map(|(label, n)| (label.to_string(), n))
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

impl Summary {
    pub fn build(input: SummaryInput<'_>, passes: Vec<PassMetric>) -> Self {
        let rejected_candidates = passes.iter().map(|p| p.rejected).sum();
        let numbers = input.events.iter().map(|e| e.event_number);
        let event_number_range = numbers.clone().min().zip(numbers.max());
        let seasons_found: BTreeSet<u32> = input.seasons.iter().map(|s| s.season_number).collect();

        Summary {
            total_posts: input.posts.len(),
            posts_with_text: input
                .posts
                .iter()
                .filter(|p| p.body.chars().count() > 50)
                .count(),
            posts_image_only: input
                .posts
                .iter()
                .filter(|p| p.body.chars().count() < 10 && !p.images.is_empty())
                .count(),
            unique_events: input.events.len(),
            event_number_range,
            total_players: input.players.len(),
            match_results: input.match_results,
            scores_found: input.scores_found,
            awards: input.awards.len(),
            fundraisers: input.fundraisers.len(),
            total_fundraiser_amount: input.fundraisers.iter().map(|f| f.amount).sum(),
            attendance_records: input.attendance_records,
            seasons_found: seasons_found.into_iter().collect(),
            rivalries: input.rivalries,
            post_type_distribution: distribution(input.metas.iter().map(|m| m.category.as_str())),
            award_type_distribution: distribution(input.awards.iter().map(|a| a.award_type.as_str())),
            top_players: input
                .players
                .iter()
                .take(input.top_players)
                .map(|p| TopPlayer {
                    name: p.name.clone(),
                    mentions: p.total_mentions,
                    wins: p.wins,
                    losses: p.losses,
                })
                .collect(),
            rejected_candidates,
            skipped_records: input.skipped_records,
            passes,
            parsed_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("## ECD Archive Summary\n");
        out.push_str(&format!(
            "- Posts processed: {}\n- Posts with text: {}\n- Image-only posts: {}\n- Skipped records: {}\n",
            self.total_posts, self.posts_with_text, self.posts_image_only, self.skipped_records
        ));
        let range = match self.event_number_range {
            Some((lo, hi)) => format!("{lo}-{hi}"),
            None => "none".to_string(),
        };
        out.push_str(&format!("- Unique events: {} (range: {})\n", self.unique_events, range));
        out.push_str(&format!(
            "- Players: {}\n- Match results: {}\n- Score mentions: {}\n",
            self.total_players, self.match_results, self.scores_found
        ));
        out.push_str(&format!(
            "- Awards: {}\n- Fundraisers: {} (${:.2} total)\n- Attendance records: {}\n- Rivalries: {}\n",
            self.awards, self.fundraisers, self.total_fundraiser_amount, self.attendance_records, self.rivalries
        ));
        let seasons = self.seasons_found.iter().map(u32::to_string).join(", ");
        out.push_str(&format!("- Seasons found: [{}]\n", seasons));
        out.push_str(&format!("- Rejected candidates: {}\n", self.rejected_candidates));

        out.push_str("\n### Post types\n");
        for (label, count) in &self.post_type_distribution {
            out.push_str(&format!("- {}: {}\n", label, count));
        }

        out.push_str("\n### Award types\n");
        for (label, count) in &self.award_type_distribution {
            out.push_str(&format!("- {}: {}\n", label, count));
        }

        out.push_str("\n### Top players\n");
        for p in &self.top_players {
            out.push_str(&format!("- {}: {} mentions, {}W-{}L\n", p.name, p.mentions, p.wins, p.losses));
        }

        out.push_str("\n### Passes\n");
        for p in &self.passes {
            out.push_str(&format!(
                "- {}: {} posts, {} produced, {} rejected, {}ms\n",
                p.pass_name, p.posts, p.produced, p.rejected, p.elapsed_ms
            ));
        }

        out.push_str(&format!("\nGenerated at {}\n", self.parsed_at));
        out
    }
}
