//! Passport data model
//!
//! Read-only snapshots handed to the composer by the surrounding application.
//! The composer never mutates them.

pub mod achievement;
pub mod imprint;
pub mod legacy;
pub mod profile;
pub mod testimonial;

pub use achievement::{BadgeRecord, BadgeStanding, ChallengeRecord};
pub use imprint::ImprintRecord;
pub use legacy::LegacyNote;
pub use profile::{PassportProfile, PrivacyLevel};
pub use testimonial::{TestimonialDirection, TestimonialRecord};

use serde::{Deserialize, Serialize};

/// Error while reading a serialized passport input
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Invalid JSON input: {0}")]
    Json(String),
    #[error("Invalid YAML input: {0}")]
    Yaml(String),
}

/// Everything a single composition run consumes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PassportInput {
    pub profile: PassportProfile,
    #[serde(default)]
    pub imprints: Vec<ImprintRecord>,
    #[serde(default)]
    pub badges: Vec<BadgeRecord>,
    #[serde(default)]
    pub challenges: Vec<ChallengeRecord>,
    #[serde(default)]
    pub testimonials: Vec<TestimonialRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy: Option<LegacyNote>,
}

impl PassportInput {
    /// Input with a profile and no activity
    pub fn new(profile: PassportProfile) -> Self {
        Self {
            profile,
            imprints: Vec::new(),
            badges: Vec::new(),
            challenges: Vec::new(),
            testimonials: Vec::new(),
            legacy: None,
        }
    }

    /// Parse the camelCase JSON form
    pub fn from_json(content: &str) -> Result<Self, InputError> {
        serde_json::from_str(content).map_err(|e| InputError::Json(e.to_string()))
    }

    /// Parse the camelCase YAML form
    pub fn from_yaml(content: &str) -> Result<Self, InputError> {
        serde_yaml::from_str(content).map_err(|e| InputError::Yaml(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, InputError> {
        serde_json::to_string_pretty(self).map_err(|e| InputError::Json(e.to_string()))
    }

    pub fn achieved_badge_count(&self) -> usize {
        self.badges
            .iter()
            .filter(|b| b.standing() == BadgeStanding::Achieved)
            .count()
    }
}
