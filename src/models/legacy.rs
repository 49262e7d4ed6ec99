//! Legacy note left for future readers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyNote {
    pub body_text: String,
}

impl LegacyNote {
    pub fn new(body_text: impl Into<String>) -> Self {
        Self {
            body_text: body_text.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.body_text.trim().is_empty()
    }
}
