//! Passport composer configuration
//!
//! Handles parsing of `.passport.toml` configuration files and
//! environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".passport.toml";

/// Environment variable for the footer branding string
pub const ENV_BRAND_TEXT: &str = "PASSPORT_BRAND_TEXT";

/// Environment variable for the primary brand color
pub const ENV_BRAND_COLOR: &str = "PASSPORT_BRAND_COLOR";

/// Environment variable for the avatar fetch timeout
pub const ENV_AVATAR_TIMEOUT_SECS: &str = "PASSPORT_AVATAR_TIMEOUT_SECS";

/// Environment variable for the imprint preview cap
pub const ENV_IMPRINT_PREVIEW_LIMIT: &str = "PASSPORT_IMPRINT_PREVIEW_LIMIT";

/// Fixed page width (A4 portrait), millimeters
pub const PAGE_WIDTH_MM: f64 = 210.0;

/// Fixed page height (A4 portrait), millimeters
pub const PAGE_HEIGHT_MM: f64 = 297.0;

/// Smallest top margin that still holds the running "(continued)" header
pub const MIN_TOP_MARGIN_MM: f64 = 12.0;

/// Smallest bottom margin that still holds the footer rule and page stamp
pub const MIN_BOTTOM_MARGIN_MM: f64 = 12.0;

/// Error while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Failed to parse config: {0}")]
    ParseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Branding printed on every page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrandingSection {
    /// Fixed branding string in the footer
    #[serde(default = "default_brand_text")]
    pub brand_text: String,

    /// Primary color in hex format (e.g., "#5B3FD9")
    #[serde(default = "default_brand_color")]
    pub brand_color: String,

    /// Secondary color used for progress fills and highlights
    #[serde(default = "default_accent_color")]
    pub accent_color: String,

    /// Include generation timestamp in the document info
    #[serde(default = "default_true")]
    pub show_timestamp: bool,

    /// Author recorded in the document info
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

fn default_brand_text() -> String {
    "Memory Passport".to_string()
}

fn default_brand_color() -> String {
    "#5B3FD9".to_string()
}

fn default_accent_color() -> String {
    "#F2A93B".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for BrandingSection {
    fn default() -> Self {
        Self {
            brand_text: default_brand_text(),
            brand_color: default_brand_color(),
            accent_color: default_accent_color(),
            show_timestamp: default_true(),
            author: None,
        }
    }
}

/// Page margins in millimeters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MarginsSection {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for MarginsSection {
    fn default() -> Self {
        Self {
            top: 22.0,
            right: 18.0,
            bottom: 24.0,
            left: 18.0,
        }
    }
}

/// Layout tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutSection {
    #[serde(default)]
    pub margins: MarginsSection,

    /// Maximum imprints shown on the timeline
    #[serde(default = "default_imprint_preview_limit")]
    pub imprint_preview_limit: usize,

    /// Hard character cap for badge captions
    #[serde(default = "default_badge_caption_chars")]
    pub badge_caption_chars: usize,

    /// Width of one badge grid cell; the column count follows from the content width
    #[serde(default = "default_badge_cell_width")]
    pub badge_cell_width_mm: f64,

    /// Body text size in points
    #[serde(default = "default_body_font_size")]
    pub body_font_size: f64,

    /// Draw a thin border around every page
    #[serde(default = "default_true")]
    pub page_border: bool,
}

fn default_imprint_preview_limit() -> usize {
    6
}

fn default_badge_caption_chars() -> usize {
    12
}

fn default_badge_cell_width() -> f64 {
    42.0
}

fn default_body_font_size() -> f64 {
    10.0
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            margins: MarginsSection::default(),
            imprint_preview_limit: default_imprint_preview_limit(),
            badge_caption_chars: default_badge_caption_chars(),
            badge_cell_width_mm: default_badge_cell_width(),
            body_font_size: default_body_font_size(),
            page_border: default_true(),
        }
    }
}

/// Avatar fetching
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvatarSection {
    /// Skip the avatar entirely when false
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Upper bound on the remote fetch
    #[serde(default = "default_avatar_timeout")]
    pub timeout_secs: u64,

    /// Embedded avatars are downscaled to at most this many pixels per side
    #[serde(default = "default_avatar_max_pixels")]
    pub max_pixels: u32,
}

fn default_avatar_timeout() -> u64 {
    10
}

fn default_avatar_max_pixels() -> u32 {
    256
}

impl Default for AvatarSection {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            timeout_secs: default_avatar_timeout(),
            max_pixels: default_avatar_max_pixels(),
        }
    }
}

/// Main configuration structure
///
/// Represents the `.passport.toml` configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PassportConfig {
    #[serde(default)]
    pub branding: BrandingSection,

    #[serde(default)]
    pub layout: LayoutSection,

    #[serde(default)]
    pub avatar: AvatarSection,
}

impl PassportConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a directory
    ///
    /// Looks for `.passport.toml` in the directory.
    /// Falls back to defaults if not found.
    pub fn load(dir: &Path) -> ConfigResult<Self> {
        let config_path = dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(format!("Failed to read config: {}", e)))?;

            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> ConfigResult<()> {
        let content = self.to_toml()?;
        std::fs::write(dir.join(CONFIG_FILENAME), content)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config: {}", e)))
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(text) = std::env::var(ENV_BRAND_TEXT) {
            self.branding.brand_text = text;
        }

        if let Ok(color) = std::env::var(ENV_BRAND_COLOR) {
            self.branding.brand_color = color;
        }

        if let Ok(secs) = std::env::var(ENV_AVATAR_TIMEOUT_SECS)
            && let Ok(secs) = secs.parse()
        {
            self.avatar.timeout_secs = secs;
        }

        if let Ok(limit) = std::env::var(ENV_IMPRINT_PREVIEW_LIMIT)
            && let Ok(limit) = limit.parse()
        {
            self.layout.imprint_preview_limit = limit;
        }
    }

    /// Width available to content between the side margins
    pub fn content_width(&self) -> f64 {
        PAGE_WIDTH_MM - self.layout.margins.left - self.layout.margins.right
    }

    /// Height available to content between the top and bottom margins
    pub fn content_height(&self) -> f64 {
        PAGE_HEIGHT_MM - self.layout.margins.top - self.layout.margins.bottom
    }

    /// Reject configurations the layout engine cannot honour
    pub fn validate(&self) -> ConfigResult<()> {
        let m = &self.layout.margins;
        for (name, value) in [
            ("top", m.top),
            ("right", m.right),
            ("bottom", m.bottom),
            ("left", m.left),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "margin '{}' must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        for (name, value, min) in [
            ("top", m.top, MIN_TOP_MARGIN_MM),
            ("bottom", m.bottom, MIN_BOTTOM_MARGIN_MM),
        ] {
            if value < min {
                return Err(ConfigError::Invalid(format!(
                    "margin '{}' must be at least {} mm to fit page decorations, got {}",
                    name, min, value
                )));
            }
        }

        // Smallest page must still hold the tallest fixed block (identity card)
        if self.content_width() < 120.0 || self.content_height() < 120.0 {
            return Err(ConfigError::Invalid(format!(
                "margins leave a {:.1}x{:.1} mm content area; at least 120x120 mm is required",
                self.content_width(),
                self.content_height()
            )));
        }

        if !(6.0..=24.0).contains(&self.layout.body_font_size) {
            return Err(ConfigError::Invalid(format!(
                "body_font_size must be between 6 and 24 pt, got {}",
                self.layout.body_font_size
            )));
        }

        if !self.layout.badge_cell_width_mm.is_finite()
            || self.layout.badge_cell_width_mm < 30.0
            || self.layout.badge_cell_width_mm > self.content_width()
        {
            return Err(ConfigError::Invalid(format!(
                "badge_cell_width_mm must be between 30 and {:.1}, got {}",
                self.content_width(),
                self.layout.badge_cell_width_mm
            )));
        }

        for (name, value) in [
            ("brand_color", &self.branding.brand_color),
            ("accent_color", &self.branding.accent_color),
        ] {
            if crate::passport::surface::Color::from_hex(value).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a #RRGGBB hex color, got '{}'",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r##"# Memory Passport Configuration

[branding]
# Fixed string printed in every page footer
brand_text = "Memory Passport"

# Primary and accent colors (#RRGGBB)
brand_color = "#5B3FD9"
accent_color = "#F2A93B"

# Record the generation time in the PDF document info
show_timestamp = true

# author = "Memory Passport"

[layout]
# Maximum imprints shown on the timeline
imprint_preview_limit = 6

# Hard character cap for badge captions
badge_caption_chars = 12

# Badge grid cell width in millimeters (4 columns on A4 with default margins)
badge_cell_width_mm = 42.0

# Body text size in points
body_font_size = 10.0

page_border = true

[layout.margins]
top = 22.0
right = 18.0
bottom = 24.0
left = 18.0

[avatar]
enabled = true
timeout_secs = 10
max_pixels = 256
"##
}
