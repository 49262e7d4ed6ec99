//! Testimonials exchanged between passport holders

use serde::{Deserialize, Serialize};

/// Whether the holder received or wrote the testimonial
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestimonialDirection {
    #[default]
    Received,
    Given,
}

/// A testimonial; rendered height depends on the wrapped body text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialRecord {
    /// The other party: the author for received testimonials, the subject for given ones
    pub author_name: String,
    /// e.g. "Sister", "Former colleague"
    #[serde(default)]
    pub relationship_label: String,
    pub body_text: String,
    #[serde(default)]
    pub direction: TestimonialDirection,
}

impl TestimonialRecord {
    pub fn new(
        author_name: impl Into<String>,
        relationship_label: impl Into<String>,
        body_text: impl Into<String>,
    ) -> Self {
        Self {
            author_name: author_name.into(),
            relationship_label: relationship_label.into(),
            body_text: body_text.into(),
            direction: TestimonialDirection::Received,
        }
    }

    /// Line introducing the other party, e.g. "From Maria (Sister)"
    pub fn attribution(&self) -> String {
        let prefix = match self.direction {
            TestimonialDirection::Received => "From",
            TestimonialDirection::Given => "To",
        };
        let relationship = self.relationship_label.trim();
        if relationship.is_empty() {
            format!("{} {}", prefix, self.author_name.trim())
        } else {
            format!("{} {} ({})", prefix, self.author_name.trim(), relationship)
        }
    }
}
