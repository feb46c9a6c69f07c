//! Name tables and the name resolver.
//!
//! Everything here is immutable once built. Extractors receive `&NameTables`
//! and never consult global state, so tests can swap in their own tables.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EcdError, Result};
use crate::utils::{normalize_ws, token_count};

const KNOWN_PLAYERS: &[&str] = &[
    "John Tronolone", "Chris Adams", "Kevin Adams", "Tom Adams", "Steve Adams",
    "Kevin Fitzpatrick", "Kevin Megill", "Justin Pierce", "Ryan Letsche",
    "Dan Spengeman", "Diana DiBuccio", "Juan Londono",
    "Lauren Freda", "Lauren Stopa", "Lauren Winston",
    "Justin Wolf", "Sara DeCuir", "Sascha Basista",
    "Bobby Brown", "Matt Brown", "Michelle Mullins",
    "Brody Letsche", "Valerie Winston",
    "Zach Katz", "Mike Edwards",
    "Michael Rosinski", "Michael Krott", "Jon Yochum",
    "Kathryn Nogueira", "Elizabeth Nogueira",
    "Alison Bertsch", "Aimee Savoth", "Christina Guarino",
    "Melissa Kerr", "Pam D'Luhy", "Bethany Schonberg",
    "Eamon Fitzpatrick", "Joanice",
    "Rob Pellecchia", "Derek Carty", "Dan Karen", "Robert Brown",
    "Bobby Vetrano", "Ryan McCrorey", "Lenny Herrera",
    "Julia Dennebaum", "Travis", "Ryan Rafferty", "Ashley",
    "Jonathan Ranchin", "Mari Travassos", "Zack Berghoff",
    "Katie", "Lima", "Godynick",
    "Lauren", "Mike Rosinski",
];

const STOPWORDS: &[&str] = &[
    "The", "This", "That", "But", "And", "For", "Not", "With", "From",
    "What", "When", "Where", "Who", "How", "Why", "All", "One", "Two",
    "Team", "Game", "Wall", "Season", "Event", "Results", "Match",
    "Main", "Hall", "Fame", "Elite", "Award", "Contest", "Champion",
    "Dodgeball", "Indoor", "Anniversary", "ProBowl", "Rimshot",
    "Saturday", "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday",
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
    "Adams", "Attendance", "East", "Coast", "High", "School", "Episode",
    "Pro", "Bowl", "Star", "Mega", "Special", "Night", "First", "Last",
    "New", "Next", "More", "Some", "Like", "Just", "Here", "There",
    "Will", "Can", "Has", "Had", "Was", "Were", "Are", "Been",
    "Would", "Could", "Should", "Might", "Must",
    "Still", "Very", "Much", "Most", "Over", "Under", "Before", "After",
    "Also", "Even", "Ever", "Never", "Always", "Often", "Well",
    "Lets", "Let", "Get", "Got", "Take", "Make", "Come",
    "See", "Look", "Find", "Give", "Tell", "Say", "Think",
    "ECD", "HTH", "HOF", "MVP", "Sputz", "Fun", "Pre",
    "WALL", "ALL", "TEAM", "DODGEBALL",
    "Welcome", "Right", "Left", "Back", "Top", "Bottom",
    "Great", "Good", "Best", "Better", "Record", "Records",
    "Year", "Years", "Week", "Weeks", "Day", "Days", "Month",
    "Score", "Scores", "Point", "Points", "Win", "Wins", "Loss",
    "Total", "Final", "Half", "Round", "Rounds",
    "Prior", "Affair",
];

const NICKNAMES: &[(&str, &str)] = &[
    ("the Creation", "John Tronolone"),
    ("the King", "John Tronolone"),
    ("KJohn", "John Tronolone"),
    ("KJohn Tronolone", "John Tronolone"),
    ("The Writer", "John Tronolone"),
    ("Sputz", "Michael Krott"),
    ("Michael Sputz Krott", "Michael Krott"),
    ("Fitz", "Kevin Fitzpatrick"),
    ("Megill", "Kevin Megill"),
    ("Spengeman", "Dan Spengeman"),
    ("DiBuccio", "Diana DiBuccio"),
    ("Diana", "Diana DiBuccio"),
    ("Pierce", "Justin Pierce"),
    ("Edwards", "Mike Edwards"),
    ("Basista", "Sascha Basista"),
    ("Londono", "Juan Londono"),
    ("Valerie", "Valerie Winston"),
    ("Lauren", "Lauren Freda"),
    ("Mike Rosinski", "Michael Rosinski"),
    ("Rosinski", "Michael Rosinski"),
    ("Krott", "Michael Krott"),
    ("Letsche", "Ryan Letsche"),
    ("Diana Di", "Diana DiBuccio"),
    ("Di Buccio", "Diana DiBuccio"),
    ("Dibuccio", "Diana DiBuccio"),
    ("Tronolone", "John Tronolone"),
    ("The Piercer", "Justin Pierce"),
    ("the Piercer", "Justin Pierce"),
    ("The Annihilator", "Kevin Adams"),
    ("the Annihilator", "Kevin Adams"),
    ("The Punter", "Tom Adams"),
    ("the Punter", "Tom Adams"),
];

/// (first name, [(candidate, clues)]). The first candidate is the default.
const FIRST_NAME_CLUES: &[(&str, &[(&str, &[&str])])] = &[
    ("Kevin", &[
        ("Kevin Adams", &["annihilator", "steve adams", "tom adams", "brothers", "adams family"]),
        ("Kevin Fitzpatrick", &["fitz", "fitzpatrick", "eamon", "youngest"]),
        ("Kevin Megill", &["megill", "sputz", "rimshot", "pie"]),
    ]),
    ("Lauren", &[
        ("Lauren Freda", &["freda", "chris adams", "girlfriend", "chris", "first lady"]),
        ("Lauren Stopa", &["stopa", "be my lover", "fame", "accuracy"]),
        ("Lauren Winston", &["winston", "valerie", "sister"]),
    ]),
    ("Ryan", &[
        ("Ryan Letsche", &["letsche", "brody", "targets", "rim"]),
        ("Ryan McCrorey", &["mccrorey", "crorey"]),
        ("Ryan Rafferty", &["rafferty"]),
    ]),
    ("Michael", &[
        ("Michael Krott", &["krott", "sputz"]),
        ("Michael Rosinski", &["rosinski", "remembrance"]),
    ]),
    ("Justin", &[
        ("Justin Pierce", &["pierce", "piercer", "diana", "rivalry", "nemesis"]),
        ("Justin Wolf", &["wolf"]),
    ]),
];

// ── Disambiguation dataset ──

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisambiguationData {
    pub canonical_people: Vec<CanonicalPerson>,
    pub alias_lookup: BTreeMap<String, String>,
    pub issues: IssueCatalog,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalPerson {
    pub canonical_name: String,
    pub aliases: Vec<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueCatalog {
    pub self_references: Vec<SelfReference>,
    pub duplicate_pairs: Vec<DuplicatePair>,
    pub alias_separations: Vec<AliasSeparation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfReference {
    pub person_name: String,
    pub note: Option<String>,
}

/// Two spellings of one person; the first entry is canonical.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicatePair {
    pub pair: Vec<String>,
    pub note: Option<String>,
}

/// Two distinct people that must never be merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasSeparation {
    pub person_a: String,
    pub person_b: String,
    pub shared_alias: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    SelfReference,
    DuplicateOf(String),
    SeparatedFrom(String),
}

impl DisambiguationData {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| EcdError::io(path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

// ── Tables ──

#[derive(Debug, Clone)]
pub struct FirstNameRule {
    pub candidates: Vec<(String, Vec<String>)>,
    pub default: String,
}

#[derive(Debug, Clone, Default)]
pub struct NameTables {
    known: HashSet<String>,
    stopwords: HashSet<String>,
    nicknames: BTreeMap<String, String>,
    nicknames_lower: HashMap<String, String>,
    first_names: HashMap<String, FirstNameRule>,
    issues: HashMap<String, Vec<Issue>>,
}

impl NameTables {
    pub fn new(
        known: impl IntoIterator<Item = String>,
        stopwords: impl IntoIterator<Item = String>,
        nicknames: impl IntoIterator<Item = (String, String)>,
        first_names: impl IntoIterator<Item = (String, FirstNameRule)>,
    ) -> Self {
        let mut tables = NameTables {
            known: known.into_iter().collect(),
            stopwords: stopwords.into_iter().collect(),
            nicknames: nicknames.into_iter().collect(),
            first_names: first_names.into_iter().collect(),
            ..Default::default()
        };
        tables.reindex();
        tables
    }

    pub fn builtin() -> Self {
        let first_names = FIRST_NAME_CLUES.iter().map(|(first, cands)| {
            let candidates: Vec<(String, Vec<String>)> = cands
                .iter()
                .map(|(full, clues)| {
                    (full.to_string(), clues.iter().map(|c| c.to_string()).collect())
                })
                .collect();
            let default = candidates[0].0.clone();
            (first.to_string(), FirstNameRule { candidates, default })
        });
        NameTables::new(
            KNOWN_PLAYERS.iter().map(|s| s.to_string()),
            STOPWORDS.iter().map(|s| s.to_string()),
            NICKNAMES.iter().map(|(n, c)| (n.to_string(), c.to_string())),
            first_names,
        )
    }

    /// Built-in tables, merged with the dataset at `path` when one is configured.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut tables = NameTables::builtin();
        if let Some(p) = path {
            let data = DisambiguationData::load(p)?;
            tables.merge(&data);
            info!(
                path = ?p,
                people = data.canonical_people.len(),
                aliases = tables.nicknames.len(),
                "Loaded name disambiguation data"
            );
        }
        Ok(tables)
    }

    pub fn merge(&mut self, data: &DisambiguationData) {
        for person in &data.canonical_people {
            let canonical = person.canonical_name.trim();
            if canonical.is_empty() {
                continue;
            }
            if person.category.as_deref().map_or(true, |c| c == "player") {
                self.known.insert(canonical.to_string());
            }
            for alias in &person.aliases {
                if alias != canonical {
                    self.nicknames.insert(alias.clone(), canonical.to_string());
                }
            }
        }
        for (alias, canonical) in &data.alias_lookup {
            if alias != canonical {
                self.nicknames.insert(alias.clone(), canonical.clone());
            }
        }

        for dup in &data.issues.duplicate_pairs {
            if let [canonical, other, ..] = dup.pair.as_slice() {
                self.nicknames
                    .entry(other.clone())
                    .or_insert_with(|| canonical.clone());
                self.add_issue(other, Issue::DuplicateOf(canonical.clone()));
            }
        }
        for sep in &data.issues.alias_separations {
            let (a, b) = (&sep.person_a, &sep.person_b);
            self.nicknames
                .retain(|alias, target| !((alias == a && target == b) || (alias == b && target == a)));
            if let Some(shared) = &sep.shared_alias {
                debug!(alias = %shared, "Dropping shared alias");
                self.nicknames.remove(shared);
            }
            self.add_issue(a, Issue::SeparatedFrom(b.clone()));
            self.add_issue(b, Issue::SeparatedFrom(a.clone()));
        }
        for self_ref in &data.issues.self_references {
            self.add_issue(&self_ref.person_name, Issue::SelfReference);
        }
        self.reindex();
    }

    fn add_issue(&mut self, name: &str, issue: Issue) {
        self.issues.entry(name.to_string()).or_default().push(issue);
    }

    fn reindex(&mut self) {
        self.nicknames_lower.clear();
        // BTreeMap order makes the winner of case-insensitive collisions stable.
        for (nick, canonical) in &self.nicknames {
            self.nicknames_lower
                .entry(nick.to_lowercase())
                .or_insert_with(|| canonical.clone());
        }
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    pub fn is_nickname(&self, name: &str) -> bool {
        self.nicknames.contains_key(name)
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn known_players(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }

    pub fn nicknames(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nicknames.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn aliases_of(&self, canonical: &str) -> Vec<String> {
        self.nicknames
            .iter()
            .filter(|(_, c)| c.as_str() == canonical)
            .map(|(n, _)| n.clone())
            .collect()
    }

    pub fn issues_for(&self, name: &str) -> &[Issue] {
        self.issues.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Single-token names are only trusted when the tables know them.
    pub fn accepts_single_token(&self, name: &str) -> bool {
        self.is_known(name) || self.is_nickname(name)
    }

    pub fn resolver(&self) -> NameResolver<'_> {
        NameResolver { tables: self }
    }
}

// ── Resolver ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionBasis {
    Nickname,
    NicknameCaseInsensitive,
    Contextual,
    Default,
    Unresolved,
}

impl ResolutionBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionBasis::Nickname => "nickname",
            ResolutionBasis::NicknameCaseInsensitive => "nickname_case_insensitive",
            ResolutionBasis::Contextual => "contextual",
            ResolutionBasis::Default => "default",
            ResolutionBasis::Unresolved => "unresolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub canonical: String,
    pub basis: ResolutionBasis,
}

#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    tables: &'a NameTables,
}

impl<'a> NameResolver<'a> {
    pub fn resolve(&self, name: &str, context: &str) -> Resolution {
        let name = normalize_ws(name);
        if let Some(c) = self.tables.nicknames.get(&name) {
            return Resolution {
                canonical: c.clone(),
                basis: ResolutionBasis::Nickname,
            };
        }
        if let Some(c) = self.tables.nicknames_lower.get(&name.to_lowercase()) {
            return Resolution {
                canonical: c.clone(),
                basis: ResolutionBasis::NicknameCaseInsensitive,
            };
        }
        if token_count(&name) == 1 {
            if let Some(rule) = self.tables.first_names.get(&name) {
                let ctx = context.to_lowercase();
                let hit = rule
                    .candidates
                    .iter()
                    .find(|(_, clues)| clues.iter().any(|clue| ctx.contains(clue.as_str())));
                return match hit {
                    Some((full, _)) => Resolution {
                        canonical: full.clone(),
                        basis: ResolutionBasis::Contextual,
                    },
                    None => Resolution {
                        canonical: rule.default.clone(),
                        basis: ResolutionBasis::Default,
                    },
                };
            }
        }
        Resolution {
            canonical: name,
            basis: ResolutionBasis::Unresolved,
        }
    }

    pub fn canonical(&self, name: &str, context: &str) -> String {
        self.resolve(name, context).canonical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_data() -> DisambiguationData {
        DisambiguationData::load(Path::new("tests/fixtures/names.json")).unwrap()
    }

    #[test]
    fn nickname_lookup_exact_then_case_insensitive() {
        let tables = NameTables::builtin();
        let r = tables.resolver();
        let exact = r.resolve("Sputz", "");
        assert_eq!(exact.canonical, "Michael Krott");
        assert_eq!(exact.basis, ResolutionBasis::Nickname);

        let folded = r.resolve("THE PUNTER", "");
        assert_eq!(folded.canonical, "Tom Adams");
        assert_eq!(folded.basis, ResolutionBasis::NicknameCaseInsensitive);
    }

    #[test]
    fn kevin_routes_by_context() {
        let tables = NameTables::builtin();
        let r = tables.resolver();
        let near_fitz = r.resolve("Kevin", "and then Kevin, Eamon's brother Fitzpatrick, threw");
        assert_eq!(near_fitz.canonical, "Kevin Fitzpatrick");
        assert_eq!(near_fitz.basis, ResolutionBasis::Contextual);

        let bare = r.resolve("Kevin", "Kevin threw the ball");
        assert_eq!(bare.canonical, "Kevin Adams");
        assert_eq!(bare.basis, ResolutionBasis::Default);
    }

    #[test]
    fn resolution_is_repeatable() {
        let tables = NameTables::builtin();
        let r = tables.resolver();
        let ctx = "the megill pie incident";
        let first = r.resolve("Kevin", ctx);
        for _ in 0..3 {
            assert_eq!(r.resolve("Kevin", ctx), first);
        }
        assert_eq!(first.canonical, "Kevin Megill");
    }

    #[test]
    fn unknown_names_pass_through_normalized() {
        let tables = NameTables::builtin();
        let r = tables.resolver();
        let res = r.resolve("  Frank\n Castle ", "Kevin Fitzpatrick");
        assert_eq!(res.canonical, "Frank Castle");
        assert_eq!(res.basis, ResolutionBasis::Unresolved);
        // multi-token names never hit the first-name table
        assert_eq!(r.canonical("Kevin Smith", "fitzpatrick"), "Kevin Smith");
    }

    #[test]
    fn substitute_tables_are_honoured() {
        let tables = NameTables::new(
            vec!["Ada Lovelace".to_string()],
            vec!["The".to_string()],
            vec![("Countess".to_string(), "Ada Lovelace".to_string())],
            Vec::new(),
        );
        assert_eq!(tables.resolver().canonical("countess", ""), "Ada Lovelace");
        assert!(tables.accepts_single_token("Countess"));
        assert!(!tables.accepts_single_token("Kevin"));
    }

    #[test]
    fn dataset_adds_aliases_and_roster() {
        let mut tables = NameTables::builtin();
        tables.merge(&fixture_data());
        let r = tables.resolver();
        assert_eq!(r.canonical("Danny Sponge", ""), "Dan Spengeman");
        assert_eq!(r.canonical("RyGuy", ""), "Ryan Letsche");
        assert!(tables.is_known("Grant Cornero"));
        assert!(!tables.is_known("Bruce Springsteen"));
        assert_eq!(r.canonical("Grantman", ""), "Grant Cornero");
    }

    #[test]
    fn dataset_issues_are_applied() {
        let mut tables = NameTables::builtin();
        tables.merge(&fixture_data());
        let r = tables.resolver();

        // duplicate pair: second spelling folds into the first
        assert_eq!(r.canonical("Mike Krott", ""), "Michael Krott");
        assert_eq!(
            tables.issues_for("Mike Krott"),
            &[Issue::DuplicateOf("Michael Krott".to_string())]
        );

        // separation: the shared alias no longer resolves to either person
        assert_eq!(r.canonical("Rob", ""), "Rob");
        assert!(tables
            .issues_for("Rob Pellecchia")
            .contains(&Issue::SeparatedFrom("Rob Knott".to_string())));

        assert_eq!(tables.issues_for("The Writer"), &[Issue::SelfReference]);
        assert!(tables.aliases_of("Dan Spengeman").contains(&"Danny Sponge".to_string()));
    }
}
