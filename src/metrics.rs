use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassMetric {
    pub pass_name: String,
    pub posts: usize,
    pub produced: usize,
    pub rejected: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Default)]
pub struct PassTracker {
    metrics: Vec<PassMetric>,
}

impl PassTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pass_name: &str, posts: usize, produced: usize, rejected: usize, started: Instant) {
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            pass = pass_name,
            posts,
            produced,
            rejected,
            elapsed_ms,
            "Pass complete"
        );
        self.metrics.push(PassMetric {
            pass_name: pass_name.to_string(),
            posts,
            produced,
            rejected,
            elapsed_ms,
        });
    }

    pub fn total_rejected(&self) -> usize {
        self.metrics.iter().map(|m| m.rejected).sum()
    }

    pub fn into_metrics(self) -> Vec<PassMetric> {
        self.metrics
    }
}
