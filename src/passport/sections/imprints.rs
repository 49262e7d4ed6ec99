//! Life in Imprints: a capped, reverse-chronological timeline of cards

use super::{IMPRINTS_TITLE, SectionReport, SectionStyle};
use crate::models::{ImprintRecord, PrivacyLevel};
use crate::passport::LayoutError;
use crate::passport::metrics::fit_line;
use crate::passport::page::PageManager;
use crate::passport::primitives::{self, Palette};
use crate::passport::surface::{Color, DrawingSurface, ShapeStyle, TextAlign, TextStyle};

pub const IMPRINT_CARD_HEIGHT: f64 = 24.0;
pub const IMPRINT_CARD_GAP: f64 = 4.0;

const STAMP_RADIUS: f64 = 5.0;

/// Privacy marker drawn on each card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrivacyGlyph {
    pub symbol: &'static str,
    pub label: &'static str,
    pub color: Color,
}

pub fn privacy_glyph(level: PrivacyLevel, palette: &Palette) -> PrivacyGlyph {
    match level {
        PrivacyLevel::Public => PrivacyGlyph {
            symbol: "*",
            label: "Public",
            color: palette.success,
        },
        PrivacyLevel::Private => PrivacyGlyph {
            symbol: "#",
            label: "Private",
            color: palette.danger,
        },
        PrivacyLevel::Family => PrivacyGlyph {
            symbol: "&",
            label: "Family",
            color: palette.warning,
        },
    }
}

/// Caption shown when the timeline is cut short
pub fn preview_caption(shown: usize, total: usize) -> Option<String> {
    (shown < total).then(|| format!("Showing {} of {} imprints", shown, total))
}

pub fn render(
    imprints: &[ImprintRecord],
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    style: &SectionStyle,
) -> SectionReport {
    let mut report = SectionReport::default();
    let shown = imprints.len().min(style.imprint_preview_limit);
    let caption = preview_caption(shown, imprints.len());

    report.record(
        IMPRINTS_TITLE,
        "header",
        primitives::draw_section_header(
            surface,
            pages,
            IMPRINTS_TITLE,
            caption.as_deref(),
            &style.palette,
        )
        .map(|_| ()),
    );

    if imprints.is_empty() {
        report.record(
            IMPRINTS_TITLE,
            "placeholder",
            primitives::draw_placeholder(
                surface,
                pages,
                "No imprints recorded yet.",
                &style.palette,
            )
            .map(|_| ()),
        );
        return report;
    }

    for imprint in &imprints[..shown] {
        let result = draw_imprint_card(imprint, surface, pages, &style.palette);
        report.record(
            IMPRINTS_TITLE,
            &format!("imprint '{}'", imprint.title),
            result,
        );
    }

    report
}

fn draw_imprint_card(
    imprint: &ImprintRecord,
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    palette: &Palette,
) -> Result<(), LayoutError> {
    let placement = pages.reserve(surface, IMPRINT_CARD_HEIGHT)?;
    pages.skip(IMPRINT_CARD_GAP);
    let (left, right, y) = (pages.content_left(), pages.content_right(), placement.y);

    primitives::draw_card(surface, left, y, right - left, IMPRINT_CARD_HEIGHT - 1.0, palette);
    surface.draw_circle(left + 5.0, y + 12.0, 1.8, &ShapeStyle::filled(palette.brand));

    let text_x = left + 10.0;
    let text_width = right - 22.0 - text_x;

    let title = if imprint.title.trim().is_empty() {
        "Untitled imprint"
    } else {
        imprint.title.trim()
    };
    surface.draw_text(
        &fit_line(title, text_width, 11.0, true),
        text_x,
        y + 3.0,
        &TextStyle::bold(11.0).with_color(palette.ink),
    );

    let mut meta = imprint.occurred_at.format("%B %-d, %Y").to_string();
    if let Some(location) = imprint.location_label.as_deref()
        && !location.trim().is_empty()
    {
        meta.push_str(&format!(" \u{00B7} {}", location.trim()));
    }
    surface.draw_text(
        &fit_line(&meta, text_width, 9.0, false),
        text_x,
        y + 9.5,
        &TextStyle::regular(9.0).with_color(palette.muted),
    );

    let tags = imprint.unique_tags();
    if !tags.is_empty() {
        let line = tags
            .iter()
            .map(|t| format!("#{}", t))
            .collect::<Vec<_>>()
            .join("  ");
        surface.draw_text(
            &fit_line(&line, text_width, 8.0, false),
            text_x,
            y + 15.5,
            &TextStyle::regular(8.0).with_color(palette.brand),
        );
    }

    let glyph = privacy_glyph(imprint.privacy_level, palette);
    let stamp_x = right - 10.0;
    primitives::draw_glyph_stamp(
        surface,
        stamp_x,
        y + 10.0,
        STAMP_RADIUS,
        glyph.symbol,
        glyph.color.lighten(0.8),
        glyph.color,
    );
    surface.draw_text(
        glyph.label,
        stamp_x,
        y + 16.5,
        &TextStyle::regular(7.0)
            .with_color(glyph.color)
            .aligned(TextAlign::Center),
    );

    Ok(())
}
