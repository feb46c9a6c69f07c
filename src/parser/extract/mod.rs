pub mod attendance;
pub mod awards;
pub mod fundraisers;
pub mod rivalries;
pub mod seasons;

use crate::config::Thresholds;
use crate::model::{AttendanceRecord, Award, Fundraiser, Post, Rivalry, SeasonReference};
use crate::names::NameTables;

/// Where a fact came from.
#[derive(Debug, Clone, Copy)]
pub struct Origin<'a> {
    pub post_id: i64,
    pub date: Option<&'a str>,
}

impl<'a> Origin<'a> {
    pub fn of(post: &'a Post) -> Self {
        Origin {
            post_id: post.id,
            date: post.date.as_deref(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Facts {
    pub awards: Vec<Award>,
    pub fundraisers: Vec<Fundraiser>,
    pub attendance: Vec<AttendanceRecord>,
    pub seasons: Vec<SeasonReference>,
    pub rivalries: Vec<Rivalry>,
}

impl Facts {
    pub fn len(&self) -> usize {
        self.awards.len()
            + self.fundraisers.len()
            + self.attendance.len()
            + self.seasons.len()
            + self.rivalries.len()
    }

    pub fn extend(&mut self, other: Facts) {
        self.awards.extend(other.awards);
        self.fundraisers.extend(other.fundraisers);
        self.attendance.extend(other.attendance);
        self.seasons.extend(other.seasons);
        self.rivalries.extend(other.rivalries);
    }
}

/// Every fact extractor over one post.
pub fn extract_all(post: &Post, tables: &NameTables, t: &Thresholds) -> Facts {
    let text = post.full_text();
    let origin = Origin::of(post);
    Facts {
        awards: awards::extract(&text, origin, tables),
        fundraisers: fundraisers::extract(&text, origin, t),
        attendance: attendance::extract(&text, origin.post_id, t),
        seasons: seasons::extract(&text, origin.post_id, t),
        rivalries: rivalries::extract(&text, origin.post_id, tables),
    }
}
