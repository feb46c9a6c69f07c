use std::sync::LazyLock;

use regex::Regex;

use crate::config::Thresholds;
use crate::model::SeasonReference;
use crate::utils::window;

static SEASON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:season)\s+([0-9]+)").unwrap());

pub fn extract(text: &str, post_id: i64, t: &Thresholds) -> Vec<SeasonReference> {
    SEASON_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            let season_number: u32 = caps[1].parse().ok()?;
            t.season_in_range(season_number).then(|| SeasonReference {
                season_number,
                post_id,
                context: window(text, m.start(), m.end(), 30, 50).trim().to_string(),
            })
        })
        .collect()
}
