use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::Thresholds;
use crate::model::AttendanceRecord;
use crate::utils::window;

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)([0-9]+)\s+(?:confirmed|players|participants|competitors|combatants|people)\b",
        r"(?i)attendance[:\s]+([0-9]+)",
        r"(?i)official attendance\s*(?:figure)?[:\s]+([0-9]+)",
        r"(?i)([0-9]+)\s+veterans?\b",
        r"(?i)([0-9]+)\s+(?:men|women|guys|girls|players)\s+(?:and|&)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Headcounts. A number claimed by several patterns is reported once.
pub fn extract(text: &str, post_id: i64, t: &Thresholds) -> Vec<AttendanceRecord> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for re in PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            let Some(num) = caps.get(1) else { continue };
            let Ok(count) = num.as_str().parse::<u32>() else {
                continue;
            };
            if !t.attendance_in_range(count) || !seen.insert(num.start()) {
                continue;
            }
            let m = caps.get(0).map_or(num.range(), |m| m.range());
            out.push(AttendanceRecord {
                count,
                context: window(text, m.start, m.end, 20, 20).trim().to_string(),
                post_id,
            });
        }
    }
    out
}
