//! Player roster: per-post name mentions folded into lifetime records.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::Result;
use crate::model::{MatchResult, PlayerRecord, Post};
use crate::names::{NameResolver, NameTables};
use crate::utils::{first_token, normalize_ws};

const CONTEXT_NAME: &str = r"[A-Z][a-z]+(?: [A-Z][a-z']+){1,2}";

/// Names next to words that only ever sit beside a player.
static CONTEXT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:captain|Captain) ({N})",
        r"({N}) (?:defeated|beat|eliminated)",
        r"(?:defeated|beat|eliminated) ({N})",
        r"({N}) and company",
        r"(?:vs\.?|versus) ({N})",
        r"({N}) (?:scored|threw|caught)",
    ]
    .iter()
    .map(|p| Regex::new(&p.replace("{N}", CONTEXT_NAME)).unwrap())
    .collect()
});

/// Word-bounded, case-insensitive patterns for every roster name and nickname,
/// longest first. Built from the name tables at run time, so compile errors
/// are surfaced.
pub struct MentionScanner {
    patterns: Vec<(Regex, String)>,
}

impl MentionScanner {
    pub fn new(tables: &NameTables) -> Result<Self> {
        let resolver = tables.resolver();
        let mut patterns = Vec::new();
        for name in tables.known_players() {
            patterns.push((name.to_string(), resolver.canonical(name, "")));
        }
        for (nick, canonical) in tables.nicknames() {
            patterns.push((nick.to_string(), canonical.to_string()));
        }
        // stable, so a roster name wins over an equally long nickname
        patterns.sort_by_key(|(name, _)| std::cmp::Reverse(name.chars().count()));
        let patterns = patterns
            .into_iter()
            .map(|(name, canonical)| -> Result<(Regex, String)> { Ok((word_pattern(&name)?, canonical)) })
            .collect::<Result<Vec<_>>>()?;
        Ok(MentionScanner { patterns })
    }

    /// Mention counts per canonical name for one post. A hit inside text
    /// already claimed by a longer name is not counted again.
    pub fn scan(&self, post: &Post, tables: &NameTables) -> BTreeMap<String, usize> {
        let text = normalize_ws(&format!("{} {}", post.title, post.body));
        let mut found: BTreeMap<String, usize> = BTreeMap::new();
        let mut claimed: Vec<(usize, usize)> = Vec::new();

        for (re, canonical) in &self.patterns {
            for m in re.find_iter(&text) {
                if claimed.iter().any(|&(s, e)| m.start() < e && s < m.end()) {
                    continue;
                }
                claimed.push((m.start(), m.end()));
                *found.entry(canonical.clone()).or_default() += 1;
            }
        }

        let resolver = tables.resolver();
        for re in CONTEXT_PATTERNS.iter() {
            for caps in re.captures_iter(&text) {
                if let Some(name) = context_name(&caps[1], tables, &resolver, &caps[0]) {
                    *found.entry(name).or_default() += 1;
                }
            }
        }
        found
    }
}

fn word_pattern(name: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(r"(?i)\b{}\b", regex::escape(name)))?)
}

fn context_name(raw: &str, tables: &NameTables, resolver: &NameResolver<'_>, context: &str) -> Option<String> {
    let last = raw.split_whitespace().last()?;
    if tables.is_stopword(first_token(raw)) || tables.is_stopword(last) {
        return None;
    }
    Some(resolver.canonical(raw, context))
}

#[derive(Default)]
struct Span {
    first: Option<(NaiveDate, String)>,
    last: Option<(NaiveDate, String)>,
}

impl Span {
    fn observe(&mut self, post: &Post) {
        let (Some(day), Some(raw)) = (post.day(), post.date.as_ref()) else {
            return;
        };
        if self.first.as_ref().map_or(true, |(d, _)| day < *d) {
            self.first = Some((day, raw.clone()));
        }
        if self.last.as_ref().map_or(true, |(d, _)| day > *d) {
            self.last = Some((day, raw.clone()));
        }
    }
}

/// Aggregate mentions over the corpus. Records come back ordered by mention
/// count, highest first, ties by name.
pub fn build_roster(posts: &[Post], scanner: &MentionScanner, tables: &NameTables) -> Vec<PlayerRecord> {
    let mut roster: BTreeMap<String, (PlayerRecord, Span)> = BTreeMap::new();

    for post in posts {
        for (name, count) in scanner.scan(post, tables) {
            let (record, span) = roster.entry(name.clone()).or_insert_with(|| {
                (
                    PlayerRecord {
                        aliases: tables.aliases_of(&name),
                        name,
                        ..Default::default()
                    },
                    Span::default(),
                )
            });
            record.total_mentions += count;
            record.post_count += 1;
            record.post_ids.push(post.id);
            span.observe(post);
        }
    }

    let mut players: Vec<PlayerRecord> = roster
        .into_values()
        .map(|(mut record, span)| {
            record.first_mention_date = span.first.map(|(_, raw)| raw);
            record.last_mention_date = span.last.map(|(_, raw)| raw);
            record
        })
        .collect();
    players.sort_by(|a, b| b.total_mentions.cmp(&a.total_mentions).then_with(|| a.name.cmp(&b.name)));
    players
}

/// Win and loss counts from the final match set.
pub fn tally_results(players: &mut [PlayerRecord], matches: &[MatchResult]) {
    let mut wins: BTreeMap<&str, usize> = BTreeMap::new();
    let mut losses: BTreeMap<&str, usize> = BTreeMap::new();
    for m in matches {
        *wins.entry(m.winner.as_str()).or_default() += 1;
        *losses.entry(m.loser.as_str()).or_default() += 1;
    }
    for p in players.iter_mut() {
        p.wins = wins.get(p.name.as_str()).copied().unwrap_or(0);
        p.losses = losses.get(p.name.as_str()).copied().unwrap_or(0);
    }
}
