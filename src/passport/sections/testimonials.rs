//! Testimonials: variable-height quote cards, measured per record

use super::{SectionReport, SectionStyle, TESTIMONIALS_TITLE};
use crate::models::{TestimonialDirection, TestimonialRecord};
use crate::passport::LayoutError;
use crate::passport::metrics::fit_line;
use crate::passport::page::PageManager;
use crate::passport::primitives::{self, Paragraph};
use crate::passport::surface::{DrawingSurface, ShapeStyle, TextStyle};

pub const CARD_PADDING: f64 = 5.0;
pub const CARD_GAP: f64 = 4.0;

/// Attribution row above the body
const ATTRIBUTION_HEIGHT: f64 = 6.0;
/// Author row below the body
const AUTHOR_HEIGHT: f64 = 6.0;
/// Indent of the body from the quote rule
const QUOTE_INDENT: f64 = 4.0;

/// Height of everything on a card except the body
pub fn card_chrome_height() -> f64 {
    2.0 * CARD_PADDING + ATTRIBUTION_HEIGHT + AUTHOR_HEIGHT
}

/// Width available to the wrapped body
pub fn body_width(content_width: f64) -> f64 {
    content_width - 2.0 * CARD_PADDING - QUOTE_INDENT
}

pub fn render(
    testimonials: &[TestimonialRecord],
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    style: &SectionStyle,
) -> SectionReport {
    let mut report = SectionReport::default();
    let received = testimonials
        .iter()
        .filter(|t| t.direction == TestimonialDirection::Received)
        .count();
    let subtitle = (!testimonials.is_empty()).then(|| {
        format!(
            "{} received \u{00B7} {} given",
            received,
            testimonials.len() - received
        )
    });

    report.record(
        TESTIMONIALS_TITLE,
        "header",
        primitives::draw_section_header(
            surface,
            pages,
            TESTIMONIALS_TITLE,
            subtitle.as_deref(),
            &style.palette,
        )
        .map(|_| ()),
    );

    if testimonials.is_empty() {
        report.record(
            TESTIMONIALS_TITLE,
            "placeholder",
            primitives::draw_placeholder(surface, pages, "No testimonials yet.", &style.palette)
                .map(|_| ()),
        );
        return report;
    }

    for testimonial in testimonials {
        let result = draw_testimonial(testimonial, surface, pages, style);
        report.record(
            TESTIMONIALS_TITLE,
            &format!("testimonial from '{}'", testimonial.author_name),
            result,
        );
    }

    report
}

fn draw_testimonial(
    testimonial: &TestimonialRecord,
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    style: &SectionStyle,
) -> Result<(), LayoutError> {
    let body = Paragraph::measure(
        surface,
        testimonial.body_text.trim(),
        body_width(pages.content_width()),
        style.body_font_pt,
    )?;
    let height = card_chrome_height() + body.height();

    if height <= pages.usable_height() {
        draw_card(testimonial, &body, height, surface, pages, style)?;
    } else {
        flow_oversized(testimonial, &body, surface, pages, style)?;
    }
    pages.skip(CARD_GAP);
    Ok(())
}

fn draw_card(
    testimonial: &TestimonialRecord,
    body: &Paragraph,
    height: f64,
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    style: &SectionStyle,
) -> Result<(), LayoutError> {
    let palette = &style.palette;
    let placement = pages.reserve(surface, height)?;
    let (left, right, y) = (pages.content_left(), pages.content_right(), placement.y);
    let inner_left = left + CARD_PADDING;
    let inner_width = right - left - 2.0 * CARD_PADDING;

    primitives::draw_card(surface, left, y, right - left, height - 1.0, palette);

    let attribution_y = y + CARD_PADDING;
    surface.draw_text(
        &fit_line(&testimonial.attribution(), inner_width, 9.0, false),
        inner_left,
        attribution_y,
        &TextStyle::regular(9.0).with_color(palette.muted),
    );

    let body_y = attribution_y + ATTRIBUTION_HEIGHT;
    surface.draw_line(
        inner_left,
        body_y,
        inner_left,
        body_y + body.height(),
        &ShapeStyle::stroked(palette.accent, 0.8),
    );
    body.draw(surface, inner_left + QUOTE_INDENT, body_y, palette.ink);

    surface.draw_text(
        &fit_line(&author_line(testimonial), inner_width, 9.0, true),
        inner_left + QUOTE_INDENT,
        body_y + body.height() + 1.5,
        &TextStyle::bold(9.0).with_color(palette.ink),
    );
    Ok(())
}

/// Body taller than a page: attribution, line chunks, then author, without a card
fn flow_oversized(
    testimonial: &TestimonialRecord,
    body: &Paragraph,
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    style: &SectionStyle,
) -> Result<(), LayoutError> {
    let palette = &style.palette;
    let left = pages.content_left();
    let width = pages.content_width();

    pages.ensure_space(surface, ATTRIBUTION_HEIGHT + body.line_height())?;
    let placement = pages.reserve(surface, ATTRIBUTION_HEIGHT)?;
    surface.draw_text(
        &fit_line(&testimonial.attribution(), width, 9.0, false),
        left,
        placement.y,
        &TextStyle::regular(9.0).with_color(palette.muted),
    );

    primitives::flow_paragraph(surface, pages, body, left + QUOTE_INDENT, palette.ink)?;

    let placement = pages.reserve(surface, AUTHOR_HEIGHT)?;
    surface.draw_text(
        &fit_line(&author_line(testimonial), width, 9.0, true),
        left + QUOTE_INDENT,
        placement.y + 1.5,
        &TextStyle::bold(9.0).with_color(palette.ink),
    );
    Ok(())
}

fn author_line(testimonial: &TestimonialRecord) -> String {
    format!("\u{2014} {}", testimonial.author_name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passport::sections::test_support::{assert_no_overflow, setup};
    use crate::passport::surface::DrawOp;

    fn long_testimonial(i: usize) -> TestimonialRecord {
        TestimonialRecord::new(
            format!("Author {}", i),
            "Friend",
            "We walked the whole coast together and I still remember every single stop. ".repeat(8),
        )
    }

    #[test]
    fn test_card_height_tracks_body() {
        let (mut surface, mut pages) = setup();
        let short = TestimonialRecord::new("Maria", "Sister", "Kind.");
        render(&[short], &mut surface, &mut pages, &SectionStyle::default());
        let after_short = pages.cursor().y;

        let (mut surface2, mut pages2) = setup();
        render(&[long_testimonial(1)], &mut surface2, &mut pages2, &SectionStyle::default());
        assert!(pages2.cursor().y > after_short);
        assert!(surface.pages()[0].contains_text("From Maria (Sister)"));
        assert!(surface.pages()[0].contains_text("Maria"));
    }

    #[test]
    fn test_many_long_testimonials_paginate_without_truncation() {
        let (mut surface, mut pages) = setup();
        let records: Vec<_> = (0..20).map(long_testimonial).collect();
        let report = render(&records, &mut surface, &mut pages, &SectionStyle::default());
        assert_eq!(report.skipped, 0);
        assert_eq!(report.drawn, 21);
        assert!(surface.page_count() > 2);
        assert_no_overflow(&surface);

        let body = Paragraph::measure(
            &surface,
            records[0].body_text.trim(),
            body_width(pages.content_width()),
            10.0,
        )
        .unwrap();
        assert!(body.lines.len() >= 6);
        let ink = SectionStyle::default().palette.ink;
        let body_lines = surface
            .pages()
            .iter()
            .flat_map(|p| p.content())
            .filter(|op| {
                matches!(op, DrawOp::Text { style, .. }
                    if !style.bold && style.font_size_pt == 10.0 && style.color == ink)
            })
            .count();
        assert_eq!(body_lines, 20 * body.lines.len());
        for i in 0..20 {
            let author = format!("\u{2014} Author {}", i);
            assert!(surface.pages().iter().any(|p| p.texts().any(|t| t == author)));
        }
    }

    #[test]
    fn test_oversized_body_flows_across_pages() {
        let (mut surface, mut pages) = setup();
        let huge = TestimonialRecord::new("Grandpa", "", "Once upon a time. ".repeat(600));
        let report = render(&[huge], &mut surface, &mut pages, &SectionStyle::default());
        assert_eq!(report.skipped, 0);
        assert!(surface.page_count() >= 2);
        assert_no_overflow(&surface);
    }

    #[test]
    fn test_unmeasurable_record_is_skipped() {
        let (mut surface, mut pages) = setup();
        let style = SectionStyle {
            body_font_pt: 0.0,
            ..SectionStyle::default()
        };
        let records = vec![TestimonialRecord::new("A", "B", "C")];
        let report = render(&records, &mut surface, &mut pages, &style);
        assert_eq!(report, SectionReport { drawn: 1, skipped: 1 });
    }

    #[test]
    fn test_empty_placeholder() {
        let (mut surface, mut pages) = setup();
        render(&[], &mut surface, &mut pages, &SectionStyle::default());
        assert!(surface.pages()[0].contains_text("No testimonials yet."));
    }
}
