use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_DB_PATH: &str = "data/ecd.sqlite";
const DEFAULT_CONFIG_FILE: &str = "ecd";

/// Paths and external inputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db_path: PathBuf,
    pub names_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            names_path: None,
        }
    }
}

/// Corpus-specific cutoffs. Every range is inclusive unless noted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub event_min: u32,
    pub event_max: u32,
    /// Exclusive bounds for bare `C<n>` markers.
    pub c_style_min: u32,
    pub c_style_max: u32,
    pub season_min: u32,
    pub season_max: u32,
    pub score_min: u32,
    pub score_max: u32,
    pub attendance_min: u32,
    pub attendance_max: u32,
    pub fundraiser_noise: f64,
    pub body_prefix_chars: usize,
    pub multiline_score_window: usize,
    pub score_window: usize,
    pub snippet_max_chars: usize,
    pub event_sample_size: usize,
    pub top_players: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            event_min: 1,
            event_max: 300,
            c_style_min: 1,
            c_style_max: 300,
            season_min: 1,
            season_max: 30,
            score_min: 0,
            score_max: 15,
            attendance_min: 2,
            attendance_max: 200,
            fundraiser_noise: 10.0,
            body_prefix_chars: 500,
            multiline_score_window: 60,
            score_window: 40,
            snippet_max_chars: 150,
            event_sample_size: 5,
            top_players: 10,
        }
    }
}

impl Thresholds {
    pub fn event_in_range(&self, n: u32) -> bool {
        (self.event_min..=self.event_max).contains(&n)
    }

    pub fn c_style_in_range(&self, n: u32) -> bool {
        n > self.c_style_min && n < self.c_style_max
    }

    pub fn season_in_range(&self, n: u32) -> bool {
        (self.season_min..=self.season_max).contains(&n)
    }

    pub fn score_in_range(&self, a: u32, b: u32) -> bool {
        let range = self.score_min..=self.score_max;
        range.contains(&a) && range.contains(&b) && a + b > 0
    }

    pub fn attendance_in_range(&self, n: u32) -> bool {
        (self.attendance_min..=self.attendance_max).contains(&n)
    }
}

/// Layered load: defaults, then `ecd.toml` (or an explicit file), then `ECD_*` env vars.
pub fn load(explicit: Option<&Path>) -> Result<(Settings, Thresholds)> {
    let file = match explicit {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };
    let cfg = Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix("ECD").try_parsing(true))
        .build()?;

    let settings: Settings = cfg.clone().try_deserialize()?;
    let thresholds: Thresholds = cfg.try_deserialize()?;
    Ok((settings, thresholds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ranges() {
        let t = Thresholds::default();
        assert!(t.event_in_range(1));
        assert!(t.event_in_range(300));
        assert!(!t.event_in_range(301));
        assert!(!t.c_style_in_range(1));
        assert!(t.c_style_in_range(2));
        assert!(!t.c_style_in_range(300));
        assert!(t.score_in_range(6, 3));
        assert!(!t.score_in_range(0, 0));
        assert!(!t.score_in_range(16, 3));
        assert!(!t.attendance_in_range(1));
        assert!(t.attendance_in_range(200));
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("ecd_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("override.toml");
        std::fs::write(&path, "attendance_max = 150\ndb_path = \"custom.sqlite\"\n").unwrap();

        let (settings, thresholds) = load(Some(&path)).unwrap();
        assert_eq!(settings.db_path, PathBuf::from("custom.sqlite"));
        assert_eq!(thresholds.attendance_max, 150);
        assert_eq!(thresholds.season_max, 30);

        std::fs::remove_dir_all(&dir).ok();
    }
}
