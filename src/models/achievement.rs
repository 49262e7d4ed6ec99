//! Badges and challenges

use serde::{Deserialize, Serialize};

/// A badge, either achieved or in progress
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BadgeRecord {
    pub name: String,
    #[serde(default)]
    pub achieved: bool,
    /// Nominally 0-100; clamped before use
    #[serde(default)]
    pub progress_percent: f64,
}

/// Which grid a badge is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStanding {
    Achieved,
    InProgress,
    /// Not achieved and no progress: never rendered
    Hidden,
}

impl BadgeRecord {
    pub fn new(name: impl Into<String>, achieved: bool, progress_percent: f64) -> Self {
        Self {
            name: name.into(),
            achieved,
            progress_percent,
        }
    }

    /// Progress clamped to `[0, 100]`; NaN counts as no progress
    pub fn clamped_progress(&self) -> f64 {
        if self.progress_percent.is_nan() {
            0.0
        } else {
            self.progress_percent.clamp(0.0, 100.0)
        }
    }

    pub fn standing(&self) -> BadgeStanding {
        if self.achieved {
            BadgeStanding::Achieved
        } else if self.clamped_progress() > 0.0 {
            BadgeStanding::InProgress
        } else {
            BadgeStanding::Hidden
        }
    }
}

/// A challenge with counted progress towards a target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRecord {
    pub title: String,
    #[serde(default)]
    pub status_label: String,
    #[serde(default)]
    pub progress_count: u32,
    #[serde(default)]
    pub target_count: u32,
    #[serde(default)]
    pub category_label: String,
}

impl ChallengeRecord {
    pub fn new(title: impl Into<String>, progress_count: u32, target_count: u32) -> Self {
        Self {
            title: title.into(),
            status_label: String::new(),
            progress_count,
            target_count,
            category_label: String::new(),
        }
    }

    /// `progress / target` clamped to `[0, 1]`; a zero target yields 0
    pub fn fill_fraction(&self) -> f64 {
        if self.target_count == 0 {
            return 0.0;
        }
        (self.progress_count as f64 / self.target_count as f64).clamp(0.0, 1.0)
    }
}
