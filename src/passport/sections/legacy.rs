//! Legacy: the holder's closing note, always present

use super::{LEGACY_TITLE, SectionReport, SectionStyle};
use crate::models::LegacyNote;
use crate::passport::LayoutError;
use crate::passport::metrics::fit_line;
use crate::passport::page::PageManager;
use crate::passport::primitives::{self, Paragraph};
use crate::passport::surface::{DrawingSurface, TextStyle};

pub const LEGACY_PLACEHOLDER: &str = "This passport holder has not written a legacy note yet.";

const CARD_PADDING: f64 = 8.0;
const SIGNATURE_HEIGHT: f64 = 10.0;

/// Text to print for an optional note
pub fn legacy_text(note: Option<&LegacyNote>) -> Option<&str> {
    note.filter(|n| !n.is_blank()).map(|n| n.body_text.trim())
}

pub fn render(
    note: Option<&LegacyNote>,
    holder_name: &str,
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    style: &SectionStyle,
) -> SectionReport {
    let mut report = SectionReport::default();

    report.record(
        LEGACY_TITLE,
        "header",
        primitives::draw_section_header(surface, pages, LEGACY_TITLE, None, &style.palette)
            .map(|_| ()),
    );
    report.record(
        LEGACY_TITLE,
        "note",
        draw_note(legacy_text(note), holder_name, surface, pages, style),
    );

    report
}

fn draw_note(
    text: Option<&str>,
    holder_name: &str,
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    style: &SectionStyle,
) -> Result<(), LayoutError> {
    let palette = &style.palette;
    let (body_text, color) = match text {
        Some(text) => (text, palette.ink),
        None => (LEGACY_PLACEHOLDER, palette.muted),
    };
    let inner_width = pages.content_width() - 2.0 * CARD_PADDING;
    let body = Paragraph::measure(surface, body_text, inner_width, style.body_font_pt)?;
    let signature = format!("\u{2014} {}", holder_name);
    let height = 2.0 * CARD_PADDING + body.height() + SIGNATURE_HEIGHT;

    if height <= pages.usable_height() {
        let placement = pages.reserve(surface, height)?;
        let (left, y) = (pages.content_left(), placement.y);
        primitives::draw_card(surface, left, y, pages.content_width(), height - 1.0, palette);
        body.draw(surface, left + CARD_PADDING, y + CARD_PADDING, color);
        if text.is_some() {
            surface.draw_text(
                &fit_line(&signature, inner_width, 10.0, true),
                left + CARD_PADDING,
                y + CARD_PADDING + body.height() + 3.0,
                &TextStyle::bold(10.0).with_color(palette.brand),
            );
        }
        return Ok(());
    }

    let left = pages.content_left();
    primitives::flow_paragraph(surface, pages, &body, left, color)?;
    let placement = pages.reserve(surface, SIGNATURE_HEIGHT)?;
    surface.draw_text(
        &fit_line(&signature, pages.content_width(), 10.0, true),
        left,
        placement.y + 3.0,
        &TextStyle::bold(10.0).with_color(palette.brand),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passport::sections::test_support::{assert_no_overflow, setup};

    #[test]
    fn test_placeholder_when_missing_or_blank() {
        assert_eq!(legacy_text(None), None);
        let blank = LegacyNote::new("   \n ");
        assert_eq!(legacy_text(Some(&blank)), None);

        let (mut surface, mut pages) = setup();
        let report = render(None, "Ada", &mut surface, &mut pages, &SectionStyle::default());
        assert_eq!(report, SectionReport { drawn: 2, skipped: 0 });
        let page = &surface.pages()[0];
        assert!(page.contains_text("Legacy"));
        assert!(page.contains_text(LEGACY_PLACEHOLDER));
        assert!(!page.contains_text("\u{2014} Ada"));
    }

    #[test]
    fn test_note_is_signed() {
        let (mut surface, mut pages) = setup();
        let note = LegacyNote::new("Keep the garden going.");
        render(Some(&note), "Ada", &mut surface, &mut pages, &SectionStyle::default());
        let page = &surface.pages()[0];
        assert!(page.contains_text("Keep the garden going."));
        assert!(page.texts().any(|t| t == "\u{2014} Ada"));
    }

    #[test]
    fn test_long_note_flows() {
        let (mut surface, mut pages) = setup();
        let note = LegacyNote::new("Remember to laugh often and forgive quickly. ".repeat(250));
        let report = render(Some(&note), "Ada", &mut surface, &mut pages, &SectionStyle::default());
        assert_eq!(report.skipped, 0);
        assert!(surface.page_count() >= 2);
        assert_no_overflow(&surface);
        let last = surface.pages().last().unwrap();
        assert!(last.contains_text("\u{2014} Ada"));
    }
}
