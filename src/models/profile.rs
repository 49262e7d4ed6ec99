//! Passport holder identity
//!
//! The profile is rendered on the first page of every passport. It is a
//! read-only snapshot supplied by the surrounding application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who may see a profile or an individual imprint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    /// Visible to everyone
    #[default]
    Public,
    /// Visible only to the owner
    Private,
    /// Visible to the owner's family circle
    Family,
}

impl std::fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrivacyLevel::Public => write!(f, "Public"),
            PrivacyLevel::Private => write!(f, "Private"),
            PrivacyLevel::Family => write!(f, "Family"),
        }
    }
}

impl std::str::FromStr for PrivacyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(PrivacyLevel::Public),
            "private" => Ok(PrivacyLevel::Private),
            "family" => Ok(PrivacyLevel::Family),
            other => Err(format!(
                "Unknown privacy level: {}. Use 'public', 'private' or 'family'.",
                other
            )),
        }
    }
}

/// Identity summary of the passport holder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PassportProfile {
    /// Display name, also used to derive the artifact filename
    pub name: String,
    /// Free-form biography
    #[serde(default)]
    pub bio_text: String,
    /// Avatar reference: `data:` URI, http(s) URL or local path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
    /// Human readable location, e.g. "Lisbon, Portugal"
    #[serde(default)]
    pub location_label: String,
    /// When the holder joined
    pub joined_at: DateTime<Utc>,
    /// Profile visibility
    #[serde(default)]
    pub profile_visibility: PrivacyLevel,
}

impl PassportProfile {
    /// Create a profile with only a name and join date
    pub fn new(name: impl Into<String>, joined_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            bio_text: String::new(),
            avatar_ref: None,
            location_label: String::new(),
            joined_at,
            profile_visibility: PrivacyLevel::default(),
        }
    }

    /// Name to print, falling back to a neutral label for blank names
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            "Unnamed Traveller"
        } else {
            trimmed
        }
    }

    /// Avatar reference, ignoring blank strings
    pub fn avatar(&self) -> Option<&str> {
        self.avatar_ref
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
