//! The five passes over the in-memory corpus, and the collections they produce.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use crate::config::Thresholds;
use crate::corpus::Corpus;
use crate::enrich::{self, Enricher};
use crate::error::{EcdError, Result};
use crate::metrics::PassTracker;
use crate::model::{
    AttendanceRecord, Award, Event, FactSource, Fundraiser, MatchResult, MatchType, MentionType,
    PlayerRecord, PostMeta, Rivalry, ScoreMention, SeasonReference,
};
use crate::names::NameTables;
use crate::parser::analyze_post;
use crate::parser::extract::rivalries::dedup as dedup_rivalries;
use crate::parser::extract::{extract_all, Facts};
use crate::parser::matches::{extract_matches, validate_name};
use crate::parser::scores::extract_scores;
use crate::parser::sidebar::{parse_sidebar, SidebarEvent};
use crate::roster::{build_roster, tally_results, MentionScanner};
use crate::store::{Document, Store};
use crate::summary::{Summary, SummaryInput};
use crate::utils::{is_all_caps, normalize_ws, title_case};

pub const SUMMARY_KEY: &str = "summary";

#[derive(Debug)]
pub struct Collections {
    pub posts: Vec<PostMeta>,
    pub events: Vec<Event>,
    pub players: Vec<PlayerRecord>,
    pub match_results: Vec<MatchResult>,
    pub scores: Vec<ScoreMention>,
    pub awards: Vec<Award>,
    pub fundraisers: Vec<Fundraiser>,
    pub attendance: Vec<AttendanceRecord>,
    pub seasons: Vec<SeasonReference>,
    pub rivalries: Vec<Rivalry>,
    pub summary: Summary,
}

fn progress(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

pub fn run(corpus: &Corpus, tables: &NameTables, t: &Thresholds) -> Result<Collections> {
    let posts = &corpus.posts;
    let mut tracker = PassTracker::new();

    // ── Pass 1: classification + numbering ──
    let started = Instant::now();
    let pb = progress(posts.len());
    pb.set_message("classify");
    let metas: Vec<PostMeta> = posts
        .iter()
        .map(|post| {
            pb.inc(1);
            analyze_post(post, t)
        })
        .collect();
    pb.finish_and_clear();
    let mut events = enrich::register_events(&metas);
    info!(events = events.len(), "Discovered events");
    tracker.record("pass1_classify", posts.len(), metas.len(), 0, started);

    // ── Pass 2: matches + score mentions ──
    let started = Instant::now();
    let pb = progress(posts.len());
    pb.set_message("matches");
    let mut matches = Vec::new();
    let mut scores = Vec::new();
    let mut rejected = 0;
    for (post, meta) in posts.iter().zip(&metas) {
        let extraction = extract_matches(&post.full_text(), tables, t);
        rejected += extraction.rejected;
        matches.extend(extraction.matches.into_iter().map(|mut m| {
            m.post_id = Some(post.id);
            m.post_date = post.date.clone();
            m.event_number = meta.primary_event;
            m
        }));
        scores.extend(extract_scores(&post.body, post.id, t));
        pb.inc(1);
    }
    pb.finish_and_clear();
    tracker.record("pass2_matches", posts.len(), matches.len() + scores.len(), rejected, started);

    // ── Pass 3: roster ──
    let started = Instant::now();
    let scanner = MentionScanner::new(tables)?;
    let mut players = build_roster(posts, &scanner, tables);
    tracker.record("pass3_roster", posts.len(), players.len(), 0, started);

    // ── Pass 4: facts, posts then sidebar ──
    let started = Instant::now();
    let pb = progress(posts.len());
    pb.set_message("facts");
    let mut facts = Facts::default();
    for post in posts {
        facts.extend(extract_all(post, tables, t));
        pb.inc(1);
    }
    pb.finish_and_clear();
    let sidebar: Vec<SidebarEvent> = corpus.sidebar.iter().flat_map(|s| parse_sidebar(s)).collect();
    let sidebar_rejected = fold_sidebar(&sidebar, tables, t, &mut matches, &mut facts);
    let Facts {
        awards,
        fundraisers,
        attendance,
        seasons,
        rivalries,
    } = facts;
    let raw_awards = awards.len();
    let awards = enrich::dedup_awards(awards);
    let rivalries = dedup_rivalries(rivalries);
    info!(
        sidebar_blocks = sidebar.len(),
        awards = awards.len(),
        duplicate_awards = raw_awards - awards.len(),
        fundraisers = fundraisers.len(),
        rivalries = rivalries.len(),
        "Collected facts"
    );
    tracker.record(
        "pass4_facts",
        posts.len(),
        awards.len() + fundraisers.len() + attendance.len() + seasons.len() + rivalries.len(),
        sidebar_rejected,
        started,
    );

    // ── Pass 5: enrichment ──
    let started = Instant::now();
    let match_results = enrich::dedup_by_scope(matches);
    tally_results(&mut players, &match_results);
    Enricher::new(&metas, t).enrich(&mut events, &match_results, &attendance, &awards, &sidebar);
    let events: Vec<Event> = events.into_values().collect();
    tracker.record("pass5_enrich", posts.len(), events.len(), 0, started);
    info!(rejected = tracker.total_rejected(), "All passes complete");

    let summary = Summary::build(
        SummaryInput {
            posts,
            metas: &metas,
            events: &events,
            players: &players,
            match_results: match_results.len(),
            scores_found: scores.len(),
            awards: &awards,
            fundraisers: &fundraisers,
            attendance_records: attendance.len(),
            seasons: &seasons,
            rivalries: rivalries.len(),
            skipped_records: corpus.skipped(),
            top_players: t.top_players,
        },
        tracker.into_metrics(),
    );

    Ok(Collections {
        posts: metas,
        events,
        players,
        match_results,
        scores,
        awards,
        fundraisers,
        attendance,
        seasons,
        rivalries,
        summary,
    })
}

fn display_name(raw: &str) -> String {
    let name = normalize_ws(raw);
    if is_all_caps(&name) {
        title_case(&name)
    } else {
        name
    }
}

/// Sidebar main events, awards and fundraisers, tagged with their block.
/// Returns the number of main events rejected by name validation.
fn fold_sidebar(
    blocks: &[SidebarEvent],
    tables: &NameTables,
    t: &Thresholds,
    matches: &mut Vec<MatchResult>,
    facts: &mut Facts,
) -> usize {
    let resolver = tables.resolver();
    let mut rejected = 0;

    for block in blocks {
        let event_number = enrich::sidebar_event_number(&block.name, t);

        if let Some(me) = &block.main_event {
            let raw_text = format!("{} defeated {}", me.winner, me.loser);
            let winner = validate_name(&display_name(&me.winner), tables);
            let loser = validate_name(&display_name(&me.loser), tables);
            match (winner, loser) {
                (Some(w), Some(l)) => {
                    let winner = resolver.canonical(&w, &raw_text);
                    let loser = resolver.canonical(&l, &raw_text);
                    if winner == loser {
                        rejected += 1;
                    } else {
                        matches.push(MatchResult {
                            winner,
                            loser,
                            score: None,
                            match_type: MatchType::MainEvent,
                            post_id: None,
                            post_date: block.date.clone(),
                            event_number,
                            source: FactSource::Sidebar,
                            raw_text,
                        });
                    }
                }
                _ => rejected += 1,
            }
        }

        for award in &block.awards {
            let name = display_name(&award.recipient);
            if name.is_empty() {
                continue;
            }
            let context = format!("{}: {}", award.award_type, award.recipient);
            facts.awards.push(Award {
                award_type: award.award_type.clone(),
                recipient: resolver.canonical(&name, &context),
                post_id: None,
                date: block.date.clone(),
                mention_type: MentionType::Sidebar,
                event_name: Some(block.name.clone()),
                context,
            });
        }

        for f in &block.fundraisers {
            facts.fundraisers.push(Fundraiser {
                amount: f.amount,
                beneficiary: f.beneficiary.clone(),
                post_id: None,
                date: block.date.clone(),
                event_name: Some(block.name.clone()),
                source: FactSource::Sidebar,
                context: f.line.clone(),
            });
        }
    }
    rejected
}

// ── Persistence ──

fn documents<T: Serialize>(items: &[T], key: impl Fn(usize, &T) -> String) -> Result<Vec<Document>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| -> Result<Document> { Ok((key(i, item), serde_json::to_value(item)?)) })
        .collect()
}

fn by_position<T>(i: usize, _: &T) -> String {
    i.to_string()
}

impl Collections {
    /// Replace every output collection in `store`. Returns (collection, count).
    pub fn persist(&self, store: &mut dyn Store) -> Result<Vec<(&'static str, usize)>> {
        let batches: Vec<(&'static str, Vec<Document>)> = vec![
            ("posts", documents(&self.posts, |_, m| m.post_id.to_string())?),
            ("events", documents(&self.events, |_, e| e.event_number.to_string())?),
            ("players", documents(&self.players, |_, p| p.name.clone())?),
            ("match_results", documents(&self.match_results, by_position)?),
            ("scores", documents(&self.scores, by_position)?),
            ("awards", documents(&self.awards, by_position)?),
            ("fundraisers", documents(&self.fundraisers, by_position)?),
            ("attendance", documents(&self.attendance, by_position)?),
            ("seasons", documents(&self.seasons, by_position)?),
            ("rivalries", documents(&self.rivalries, by_position)?),
            (
                "summary",
                vec![(SUMMARY_KEY.to_string(), serde_json::to_value(&self.summary)?)],
            ),
        ];

        let mut written = Vec::with_capacity(batches.len());
        for (name, docs) in batches {
            let n = store.write_collection(name, docs)?;
            info!(collection = name, documents = n, "Wrote collection");
            written.push((name, n));
        }
        Ok(written)
    }
}

pub fn load_summary(store: &dyn Store) -> Result<Summary> {
    let value = store
        .read_document("summary", SUMMARY_KEY)?
        .ok_or_else(|| EcdError::MissingCollection("summary".to_string()))?;
    Ok(serde_json::from_value(value)?)
}

pub fn load_events(store: &dyn Store) -> Result<Vec<Event>> {
    store
        .read_collection("events")?
        .into_iter()
        .map(|(_, v)| -> Result<Event> { Ok(serde_json::from_value(v)?) })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::corpus::{import_dir, import_sidebar, load};
    use crate::model::Score;
    use crate::store::MemoryStore;

    fn fixture_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        import_dir(&mut store, Path::new("tests/fixtures/posts")).unwrap();
        import_sidebar(&mut store, Path::new("tests/fixtures/sidebar.txt")).unwrap();
        store
    }

    fn run_fixtures() -> Collections {
        let corpus = load(&fixture_store()).unwrap();
        run(&corpus, &NameTables::builtin(), &Thresholds::default()).unwrap()
    }

    fn event(c: &Collections, n: u32) -> &Event {
        c.events.iter().find(|e| e.event_number == n).unwrap()
    }

    #[test]
    fn results_post_yields_one_scored_match() {
        let c = run_fixtures();
        let from_101: Vec<_> = c
            .match_results
            .iter()
            .filter(|m| m.post_id == Some(101))
            .collect();
        assert_eq!(from_101.len(), 1);
        assert_eq!(from_101[0].winner, "John Tronolone");
        assert_eq!(from_101[0].loser, "Chris Adams");
        assert_eq!(from_101[0].score.map(|s| s.to_string()).as_deref(), Some("6-3"));
        assert_eq!(from_101[0].match_type, MatchType::Individual);
        assert_eq!(from_101[0].event_number, Some(50));
    }

    #[test]
    fn event_fifty_merges_posts_and_sidebar() {
        let c = run_fixtures();
        let fifty = event(&c, 50);
        assert_eq!(fifty.post_ids, vec![101, 102, 103]);
        assert_eq!(fifty.name, "Season 5 | Dodgeball 50 Results");
        assert_eq!(fifty.best_attendance, Some(44));

        // unscored recap claim replaced by the 7-5 rematch; sidebar main event
        // for the same pair dropped in favour of the scored 6-3
        let mut pairs: Vec<_> = fifty
            .matches
            .iter()
            .map(|m| (m.winner.as_str(), m.score))
            .collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("John Tronolone", Some(Score { winner: 6, loser: 3 })),
                ("Kevin Megill", Some(Score { winner: 7, loser: 5 })),
            ]
        );
        assert_eq!(fifty.awards.len(), 1);
    }

    #[test]
    fn sidebar_only_event_is_created() {
        let c = run_fixtures();
        let ecd51 = event(&c, 51);
        assert!(ecd51.post_ids.is_empty());
        assert_eq!(ecd51.name, "ECD 51");
        assert_eq!(ecd51.date.as_deref(), Some("July 4, 2010"));
        assert_eq!(ecd51.matches.len(), 1);
        assert_eq!(ecd51.matches[0].winner, "Justin Pierce");
        assert_eq!(ecd51.matches[0].match_type, MatchType::MainEvent);
        assert_eq!(ecd51.matches[0].source, FactSource::Sidebar);
        assert_eq!(ecd51.awards[0].award_type, "Rimshot Champion");
        assert_eq!(ecd51.awards[0].recipient, "Lauren Stopa");
    }

    #[test]
    fn facts_and_summary() {
        let c = run_fixtures();
        assert_eq!(c.awards.len(), 2);
        assert_eq!(c.fundraisers.len(), 3);
        assert_eq!(c.rivalries.len(), 2);
        assert_eq!(c.scores.len(), 2);

        let megill = c.players.iter().find(|p| p.name == "Kevin Megill").unwrap();
        assert_eq!((megill.wins, megill.losses), (1, 1));

        let s = &c.summary;
        assert_eq!(s.total_posts, 5);
        assert_eq!(s.skipped_records, 1);
        assert_eq!(s.posts_image_only, 1);
        assert_eq!(s.event_number_range, Some((50, 51)));
        assert_eq!(s.total_fundraiser_amount, 3300.0);
        assert_eq!(s.seasons_found, vec![5, 6]);
        assert_eq!(s.passes.len(), 5);
    }

    #[test]
    fn persisted_collections_read_back() {
        let c = run_fixtures();
        let mut store = fixture_store();
        let written = c.persist(&mut store).unwrap();
        assert_eq!(written.len(), 11);
        assert!(written.contains(&("events", 2)));

        let events = load_events(&store).unwrap();
        assert_eq!(events.iter().map(|e| e.event_number).collect::<Vec<_>>(), vec![50, 51]);
        assert_eq!(load_summary(&store).unwrap(), c.summary);
    }
}
