//! Section renderers
//!
//! One renderer per passport section. Each takes its slice of the input, the
//! surface and the page manager, and reports how many records it drew and how
//! many it had to skip. Per-record failures are logged and never abort the
//! section.

pub mod achievements;
pub mod identity;
pub mod imprints;
pub mod legacy;
pub mod testimonials;

use tracing::warn;

use super::LayoutError;
use super::primitives::Palette;
use crate::config::PassportConfig;

pub const IDENTITY_TITLE: &str = "Identity";
pub const IMPRINTS_TITLE: &str = "Life in Imprints";
pub const TESTIMONIALS_TITLE: &str = "Testimonials";
pub const ACHIEVEMENTS_TITLE: &str = "Achievements & Challenges";
pub const LEGACY_TITLE: &str = "Legacy";

/// Layout settings shared by the renderers
#[derive(Debug, Clone, PartialEq)]
pub struct SectionStyle {
    pub palette: Palette,
    pub body_font_pt: f64,
    pub imprint_preview_limit: usize,
    pub badge_caption_chars: usize,
    pub badge_cell_width_mm: f64,
}

impl Default for SectionStyle {
    fn default() -> Self {
        Self::from_config(&PassportConfig::default())
    }
}

impl SectionStyle {
    pub fn from_config(config: &PassportConfig) -> Self {
        Self {
            palette: Palette::from_config(config),
            body_font_pt: config.layout.body_font_size,
            imprint_preview_limit: config.layout.imprint_preview_limit,
            badge_caption_chars: config.layout.badge_caption_chars,
            badge_cell_width_mm: config.layout.badge_cell_width_mm,
        }
    }
}

/// Outcome of rendering one section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionReport {
    pub drawn: usize,
    pub skipped: usize,
}

impl SectionReport {
    /// Count a record's outcome, logging failures
    pub fn record(&mut self, section: &str, what: &str, result: Result<(), LayoutError>) {
        match result {
            Ok(()) => self.drawn += 1,
            Err(e) => {
                warn!("{}: skipping {}: {}", section, what, e);
                self.skipped += 1;
            }
        }
    }

    pub fn merge(&mut self, other: SectionReport) {
        self.drawn += other.drawn;
        self.skipped += other.skipped;
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = SectionReport::default();
        report.record("Test", "first", Ok(()));
        report.record(
            "Test",
            "second",
            Err(LayoutError::Unmeasurable("bad".to_string())),
        );
        assert_eq!(report, SectionReport { drawn: 1, skipped: 1 });

        report.merge(SectionReport { drawn: 2, skipped: 0 });
        assert_eq!(report.drawn, 3);
    }
}
