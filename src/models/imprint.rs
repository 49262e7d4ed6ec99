//! Imprint timeline entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PrivacyLevel;

/// One entry of the passport holder's timeline
///
/// Callers supply imprints already ordered newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImprintRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_label: Option<String>,
    /// Ordered set of tags; duplicates are ignored when rendering
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub privacy_level: PrivacyLevel,
}

impl ImprintRecord {
    pub fn new(title: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            occurred_at,
            location_label: None,
            tags: Vec::new(),
            privacy_level: PrivacyLevel::default(),
        }
    }

    /// Tags in first-seen order without duplicates or blanks
    pub fn unique_tags(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !seen.contains(&tag) {
                seen.push(tag);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_tags_keeps_first_occurrence_order() {
        let mut imprint = ImprintRecord::new("First hike", Utc::now());
        imprint.tags = vec![
            "outdoors".to_string(),
            "family".to_string(),
            "outdoors".to_string(),
            " ".to_string(),
            "summer".to_string(),
        ];
        assert_eq!(imprint.unique_tags(), vec!["outdoors", "family", "summer"]);
    }
}
