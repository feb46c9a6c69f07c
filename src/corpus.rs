//! Corpus loading and dump import.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{EcdError, Result};
use crate::model::{Post, RawPost};
use crate::store::Store;

#[derive(Debug, Default)]
pub struct Corpus {
    pub posts: Vec<Post>,
    pub sidebar: Vec<String>,
    /// Records flagged with a fetch error.
    pub fetch_errors: usize,
    /// Records that could not be decoded.
    pub undecodable: usize,
}

impl Corpus {
    pub fn skipped(&self) -> usize {
        self.fetch_errors + self.undecodable
    }
}

/// Read every post record once. Bad records are counted and skipped.
pub fn load(store: &dyn Store) -> Result<Corpus> {
    let mut corpus = Corpus {
        sidebar: store.load_sidebar()?,
        ..Default::default()
    };
    for (key, payload) in store.load_post_records()? {
        let mut raw: RawPost = match serde_json::from_str(&payload) {
            Ok(r) => r,
            Err(e) => {
                debug!(key = %key, error = %e, "Skipping undecodable post");
                corpus.undecodable += 1;
                continue;
            }
        };
        if raw.id == 0 {
            match key.parse() {
                Ok(id) => raw.id = id,
                Err(_) => {
                    corpus.undecodable += 1;
                    continue;
                }
            }
        }
        match Post::from_raw(raw) {
            Some(post) => corpus.posts.push(post),
            None => corpus.fetch_errors += 1,
        }
    }
    info!(
        posts = corpus.posts.len(),
        fetch_errors = corpus.fetch_errors,
        undecodable = corpus.undecodable,
        sidebar_dumps = corpus.sidebar.len(),
        "Loaded corpus"
    );
    Ok(corpus)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub imported: usize,
    pub skipped: usize,
}

/// Copy `<id>.json` post dumps from `dir` into the store. Non-numeric stems are ignored.
pub fn import_dir(store: &mut dyn Store, dir: &Path) -> Result<ImportStats> {
    let entries = std::fs::read_dir(dir).map_err(|e| EcdError::io(dir, e))?;
    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|x| x == "json"))
        .filter(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        })
        .collect();
    paths.sort();

    let mut stats = ImportStats::default();
    for path in paths {
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match std::fs::read_to_string(&path) {
            Ok(payload) => {
                store.put_post_record(id, &payload)?;
                stats.imported += 1;
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to read post dump");
                stats.skipped += 1;
            }
        }
    }
    info!(imported = stats.imported, skipped = stats.skipped, dir = ?dir, "Imported posts");
    Ok(stats)
}

pub fn import_sidebar(store: &mut dyn Store, path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path).map_err(|e| EcdError::io(path, e))?;
    store.put_sidebar(&text)
}
