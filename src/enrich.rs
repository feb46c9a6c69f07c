//! Cross-referencing: events are registered from post numbering, then facts
//! are joined onto them through each post's primary event.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::config::Thresholds;
use crate::model::{AttendanceRecord, Award, Event, MatchResult, MentionType, PostMeta};
use crate::parser::numbering::{extract_event_refs, primary_event};
use crate::parser::sidebar::SidebarEvent;

pub type EventMap = BTreeMap<u32, Event>;

/// Where a match is deduplicated: its event, or its post when no event is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Scope {
    Event(u32),
    Post(Option<i64>),
}

fn scope(m: &MatchResult) -> Scope {
    match m.event_number {
        Some(n) => Scope::Event(n),
        None => Scope::Post(m.post_id),
    }
}

/// One event per number named by a `dodgeball` or `ecd` reference.
pub fn register_events(metas: &[PostMeta]) -> EventMap {
    let mut events = EventMap::new();
    for meta in metas {
        for r in meta.event_refs.iter().filter(|r| r.system.registers_event()) {
            events
                .entry(r.number)
                .or_insert_with(|| Event::new(r.number))
                .add_post(meta.post_id, meta.date.as_deref());
        }
    }
    events
}

/// Event number a sidebar block name refers to.
pub fn sidebar_event_number(name: &str, t: &Thresholds) -> Option<u32> {
    primary_event(&extract_event_refs(name, t))
}

/// One result per (winner, loser, event), or (winner, loser, post) when
/// unattributed. The first scored claim wins; an unscored claim only stands
/// when nothing in its scope carries a score.
pub fn dedup_by_scope(matches: Vec<MatchResult>) -> Vec<MatchResult> {
    let mut out: Vec<MatchResult> = Vec::new();
    let mut index: HashMap<(String, String, Scope), usize> = HashMap::new();
    for m in matches {
        let key = (m.winner.clone(), m.loser.clone(), scope(&m));
        match index.get(&key) {
            Some(&i) => {
                if out[i].score.is_none() && m.score.is_some() {
                    out[i] = m;
                }
            }
            None => {
                index.insert(key, out.len());
                out.push(m);
            }
        }
    }
    out
}

/// First claim per (award type, recipient).
pub fn dedup_awards(awards: Vec<Award>) -> Vec<Award> {
    let mut seen = HashSet::new();
    awards
        .into_iter()
        .filter(|a| seen.insert((a.award_type.clone(), a.recipient.clone())))
        .collect()
}

pub struct Enricher<'a> {
    metas: &'a [PostMeta],
    primary: HashMap<i64, u32>,
    t: &'a Thresholds,
}

impl<'a> Enricher<'a> {
    pub fn new(metas: &'a [PostMeta], t: &'a Thresholds) -> Self {
        let primary = metas
            .iter()
            .filter_map(|m| m.primary_event.map(|n| (m.post_id, n)))
            .collect();
        Enricher { metas, primary, t }
    }

    pub fn event_of_post(&self, post_id: i64) -> Option<u32> {
        self.primary.get(&post_id).copied()
    }

    fn event_of_award(&self, award: &Award) -> Option<u32> {
        match (award.mention_type, award.event_name.as_deref(), award.post_id) {
            (MentionType::Sidebar, Some(name), _) => sidebar_event_number(name, self.t),
            (_, _, Some(id)) => self.event_of_post(id),
            _ => None,
        }
    }

    /// Attach facts, then fill in names, samples, types and best attendance.
    /// `matches` must already be deduplicated by scope.
    pub fn enrich(
        &self,
        events: &mut EventMap,
        matches: &[MatchResult],
        attendance: &[AttendanceRecord],
        awards: &[Award],
        sidebar: &[SidebarEvent],
    ) {
        for m in matches {
            if let Some(n) = m.event_number {
                events
                    .entry(n)
                    .or_insert_with(|| Event::new(n))
                    .matches
                    .push(m.clone());
            }
        }

        for a in attendance {
            if let Some(event) = self.event_of_post(a.post_id).and_then(|n| events.get_mut(&n)) {
                event.attendance.push(a.count);
            }
        }

        for award in awards {
            if let Some(n) = self.event_of_award(award) {
                events
                    .entry(n)
                    .or_insert_with(|| Event::new(n))
                    .awards
                    .push(award.clone());
            }
        }

        let mut sidebar_names: HashMap<u32, &SidebarEvent> = HashMap::new();
        for block in sidebar {
            if let Some(n) = sidebar_event_number(&block.name, self.t) {
                sidebar_names.entry(n).or_insert(block);
            }
        }

        let metas: HashMap<i64, &PostMeta> = self.metas.iter().map(|m| (m.post_id, m)).collect();
        for (n, event) in events.iter_mut() {
            let mut titles = Vec::new();
            for meta in event.post_ids.iter().filter_map(|id| metas.get(id)) {
                if !meta.title.trim().is_empty() {
                    titles.push(meta.title.clone());
                }
                if let Some(ty) = meta.category.event_type() {
                    event.types.insert(ty);
                }
            }
            let block = sidebar_names.get(n);

            event.name = titles
                .first()
                .cloned()
                .or_else(|| block.map(|b| b.name.clone()))
                .unwrap_or_else(|| format!("Dodgeball {n}"));
            titles.truncate(self.t.event_sample_size);
            event.all_titles = titles;

            if event.dates.is_empty() {
                if let Some(date) = block.and_then(|b| b.date.clone()) {
                    event.dates.push(date);
                }
            }
            event.date = event.dates.first().cloned();
            event.all_dates = event.dates.iter().take(self.t.event_sample_size).cloned().collect();
            event.best_attendance = event.attendance.iter().copied().max();
        }
        debug!(events = events.len(), "Enriched events");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventType, FactSource, MatchType, Post, Score};
    use crate::parser::analyze_post;

    fn post(id: i64, title: &str, body: &str, date: &str) -> Post {
        Post {
            id,
            title: title.into(),
            body: body.into(),
            date: Some(date.into()),
            images: vec![],
        }
    }

    fn result(post_id: i64, event: Option<u32>, score: Option<Score>) -> MatchResult {
        MatchResult {
            winner: "John Tronolone".into(),
            loser: "Chris Adams".into(),
            score,
            match_type: MatchType::Individual,
            post_id: Some(post_id),
            post_date: None,
            event_number: event,
            source: FactSource::Post,
            raw_text: String::new(),
        }
    }

    fn metas(posts: &[Post], t: &Thresholds) -> Vec<PostMeta> {
        posts.iter().map(|p| analyze_post(p, t)).collect()
    }

    #[test]
    fn registers_only_event_keyword_families() {
        let t = Thresholds::default();
        let posts = vec![
            post(1, "Dodgeball 50 Results", "", "2009-06-14"),
            post(2, "DODGEBALL L recap", "see also ECD 51", "2009-06-15"),
            post(3, "Season 5 preview", "", "2009-05-01"),
        ];
        let events = register_events(&metas(&posts, &t));
        assert_eq!(events.keys().copied().collect::<Vec<_>>(), vec![50, 51]);
        assert_eq!(events[&50].post_ids, vec![1, 2]);
        assert_eq!(events[&51].post_ids, vec![2]);
    }

    #[test]
    fn scored_claim_survives_across_posts() {
        let t = Thresholds::default();
        let posts = vec![
            post(1, "Dodgeball 50 Results", "", "2009-06-14"),
            post(2, "Dodgeball 50 recap", "", "2009-06-16"),
        ];
        let metas = metas(&posts, &t);
        let mut events = register_events(&metas);

        let matches = dedup_by_scope(vec![
            result(1, Some(50), None),
            result(2, Some(50), Some(Score { winner: 7, loser: 5 })),
        ]);
        let enricher = Enricher::new(&metas, &t);
        enricher.enrich(&mut events, &matches, &[], &[], &[]);

        let fifty = &events[&50];
        assert_eq!(fifty.matches.len(), 1);
        assert_eq!(fifty.matches[0].score, Some(Score { winner: 7, loser: 5 }));
        assert_eq!(fifty.name, "Dodgeball 50 Results");
        assert_eq!(fifty.date.as_deref(), Some("2009-06-14"));
        assert!(fifty.types.contains(&EventType::Regular));
    }

    #[test]
    fn one_result_per_pair_and_event() {
        let six_three = Some(Score { winner: 6, loser: 3 });
        let matches = dedup_by_scope(vec![
            result(1, Some(50), None),
            result(1, Some(50), six_three),
            result(2, Some(50), Some(Score { winner: 7, loser: 5 })),
            result(3, Some(51), Some(Score { winner: 4, loser: 0 })),
        ]);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].event_number, Some(50));
        assert_eq!(matches[0].score, six_three);
        assert_eq!(matches[0].post_id, Some(1));
        assert_eq!(matches[1].event_number, Some(51));
    }

    #[test]
    fn unattributed_matches_dedup_per_post() {
        let matches = dedup_by_scope(vec![
            result(1, None, None),
            result(1, None, None),
            result(2, None, None),
        ]);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn attendance_and_awards_follow_primary_event() {
        let t = Thresholds::default();
        let posts = vec![
            post(1, "Dodgeball 50 Results", "", "2009-06-14"),
            post(2, "Dodgeball 50 recap", "", "2009-06-16"),
            post(3, "Random musings", "", "2009-07-01"),
        ];
        let metas = metas(&posts, &t);
        let mut events = register_events(&metas);
        let attendance = vec![
            AttendanceRecord { count: 40, context: String::new(), post_id: 1 },
            AttendanceRecord { count: 44, context: String::new(), post_id: 2 },
            AttendanceRecord { count: 90, context: String::new(), post_id: 3 },
        ];
        let award = |post_id: Option<i64>, mention_type, event_name: Option<&str>| Award {
            award_type: "ECD Elite".into(),
            recipient: "Kevin Megill".into(),
            post_id,
            date: None,
            mention_type,
            event_name: event_name.map(str::to_string),
            context: String::new(),
        };
        let awards = vec![
            award(Some(1), MentionType::Direct, None),
            award(None, MentionType::Sidebar, Some("ECD 51")),
        ];
        let sidebar = vec![SidebarEvent {
            name: "ECD 51".into(),
            date: Some("July 4, 2010".into()),
            ..Default::default()
        }];

        Enricher::new(&metas, &t).enrich(&mut events, &[], &attendance, &awards, &sidebar);

        let fifty = &events[&50];
        assert_eq!(fifty.attendance, vec![40, 44]);
        assert_eq!(fifty.best_attendance, Some(44));
        assert_eq!(fifty.awards.len(), 1);

        let fifty_one = &events[&51];
        assert_eq!(fifty_one.name, "ECD 51");
        assert_eq!(fifty_one.date.as_deref(), Some("July 4, 2010"));
        assert_eq!(fifty_one.awards[0].mention_type, MentionType::Sidebar);
    }

    #[test]
    fn award_dedup_keeps_first() {
        let a = Award {
            award_type: "MVP".into(),
            recipient: "Tom Adams".into(),
            post_id: Some(1),
            date: None,
            mention_type: MentionType::Direct,
            event_name: None,
            context: "first".into(),
        };
        let mut b = a.clone();
        b.context = "second".into();
        let kept = dedup_awards(vec![a, b]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].context, "first");
    }
}
