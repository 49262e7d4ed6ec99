//! Reusable block shapes
//!
//! Every primitive draws inside the box it is given; callers reserve that box
//! from the [`PageManager`] first.

use super::LayoutError;
use super::metrics::{self, em_height_mm, line_height_mm};
use super::page::{PageManager, Placement};
use super::surface::{Color, DrawingSurface, ShapeStyle, TextAlign, TextStyle};
use crate::config::PassportConfig;

pub const SECTION_HEADER_HEIGHT: f64 = 16.0;
pub const SECTION_SUBTITLE_EXTRA: f64 = 6.0;
pub const SUB_HEADER_HEIGHT: f64 = 10.0;
pub const CARD_RADIUS: f64 = 3.0;

const SECTION_TITLE_PT: f64 = 18.0;
const SUB_HEADER_PT: f64 = 12.0;

/// Colors shared by every renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub brand: Color,
    pub accent: Color,
    pub ink: Color,
    pub muted: Color,
    pub card_fill: Color,
    pub card_stroke: Color,
    pub track: Color,
    pub success: Color,
    pub danger: Color,
    pub warning: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::with_colors(Color::rgb(0x5B, 0x3F, 0xD9), Color::rgb(0xF2, 0xA9, 0x3B))
    }
}

impl Palette {
    pub fn with_colors(brand: Color, accent: Color) -> Self {
        Self {
            brand,
            accent,
            ink: Color::rgb(0x23, 0x21, 0x2B),
            muted: Color::rgb(0x6B, 0x6B, 0x76),
            card_fill: brand.lighten(0.94),
            card_stroke: brand.lighten(0.7),
            track: Color::rgb(0xE6, 0xE3, 0xEE),
            success: Color::rgb(0x2E, 0x9E, 0x5B),
            danger: Color::rgb(0xD1, 0x45, 0x3B),
            warning: Color::rgb(0xE0, 0xA5, 0x26),
        }
    }

    /// Colors from config; unparseable values fall back to the defaults
    pub fn from_config(config: &PassportConfig) -> Self {
        let defaults = Self::default();
        Self::with_colors(
            Color::from_hex(&config.branding.brand_color).unwrap_or(defaults.brand),
            Color::from_hex(&config.branding.accent_color).unwrap_or(defaults.accent),
        )
    }
}

/// Rounded, lightly tinted card background
pub fn draw_card(
    surface: &mut dyn DrawingSurface,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    palette: &Palette,
) {
    surface.draw_rounded_rect(
        x,
        y,
        w,
        h,
        CARD_RADIUS,
        &ShapeStyle::filled_and_stroked(palette.card_fill, palette.card_stroke, 0.3),
    );
}

/// Filled width of a bar for `fraction`, clamped to `[0, 1]`
pub fn fill_width(width: f64, fraction: f64) -> f64 {
    if fraction.is_nan() {
        return 0.0;
    }
    width * fraction.clamp(0.0, 1.0)
}

/// Two-color progress bar: full-width track, then the clamped fill on top
#[allow(clippy::too_many_arguments)]
pub fn draw_progress_bar(
    surface: &mut dyn DrawingSurface,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    fraction: f64,
    track: Color,
    fill: Color,
) -> f64 {
    let radius = h / 2.0;
    surface.draw_rounded_rect(x, y, w, h, radius, &ShapeStyle::filled(track));
    let filled = fill_width(w, fraction);
    if filled > 0.0 {
        surface.draw_rounded_rect(
            x,
            y,
            filled,
            h,
            radius.min(filled / 2.0),
            &ShapeStyle::filled(fill),
        );
    }
    filled
}

/// Circle with a centered symbol
pub fn draw_glyph_stamp(
    surface: &mut dyn DrawingSurface,
    cx: f64,
    cy: f64,
    r: f64,
    symbol: &str,
    fill: Color,
    ink: Color,
) {
    surface.draw_circle(cx, cy, r, &ShapeStyle::filled_and_stroked(fill, ink, 0.4));
    let font_pt = metrics::mm_to_pt(r);
    surface.draw_text(
        symbol,
        cx,
        cy - em_height_mm(font_pt) / 2.0,
        &TextStyle::bold(font_pt)
            .with_color(ink)
            .aligned(TextAlign::Center),
    );
}

/// Text already wrapped to a width
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub lines: Vec<String>,
    pub font_size_pt: f64,
}

impl Paragraph {
    pub fn measure(
        surface: &dyn DrawingSurface,
        text: &str,
        max_width_mm: f64,
        font_size_pt: f64,
    ) -> Result<Self, LayoutError> {
        Ok(Self {
            lines: surface.wrap_text(text, max_width_mm, font_size_pt)?,
            font_size_pt,
        })
    }

    pub fn line_height(&self) -> f64 {
        line_height_mm(self.font_size_pt)
    }

    pub fn height(&self) -> f64 {
        self.lines.len() as f64 * self.line_height()
    }

    /// Draw the lines in `range`, the first one at `y`
    pub fn draw_lines(
        &self,
        surface: &mut dyn DrawingSurface,
        range: std::ops::Range<usize>,
        x: f64,
        y: f64,
        color: Color,
    ) {
        let style = TextStyle::regular(self.font_size_pt).with_color(color);
        let lh = self.line_height();
        for (i, line) in self.lines[range].iter().enumerate() {
            surface.draw_text(line, x, y + i as f64 * lh, &style);
        }
    }

    pub fn draw(&self, surface: &mut dyn DrawingSurface, x: f64, y: f64, color: Color) {
        self.draw_lines(surface, 0..self.lines.len(), x, y, color);
    }
}

/// Flow a paragraph across pages in line chunks, each reserved as its own block
///
/// Returns the number of chunks drawn.
pub fn flow_paragraph(
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    paragraph: &Paragraph,
    x: f64,
    color: Color,
) -> Result<usize, LayoutError> {
    let lh = paragraph.line_height();
    let mut start = 0;
    let mut chunks = 0;
    while start < paragraph.lines.len() {
        pages.ensure_space(surface, lh)?;
        let fit = ((pages.cursor().remaining() + 1e-9) / lh).floor() as usize;
        let take = fit.clamp(1, paragraph.lines.len() - start);
        let placement = pages.reserve(surface, take as f64 * lh)?;
        paragraph.draw_lines(surface, start..start + take, x, placement.y, color);
        start += take;
        chunks += 1;
    }
    Ok(chunks)
}

/// Section title with a divider rule; also marks the section start
pub fn draw_section_header(
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    title: &str,
    subtitle: Option<&str>,
    palette: &Palette,
) -> Result<Placement, LayoutError> {
    let height = SECTION_HEADER_HEIGHT + subtitle.map_or(0.0, |_| SECTION_SUBTITLE_EXTRA);
    pages.ensure_space(surface, height)?;
    pages.begin_section(title);
    let placement = pages.reserve(surface, height)?;
    let (left, right) = (pages.content_left(), pages.content_right());

    surface.draw_text(
        title,
        left,
        placement.y,
        &TextStyle::bold(SECTION_TITLE_PT).with_color(palette.brand),
    );
    let mut rule_y = placement.y + 10.0;
    if let Some(subtitle) = subtitle {
        surface.draw_text(
            subtitle,
            left,
            placement.y + 9.0,
            &TextStyle::regular(10.0).with_color(palette.muted),
        );
        rule_y += SECTION_SUBTITLE_EXTRA;
    }
    surface.draw_line(left, rule_y, right, rule_y, &ShapeStyle::stroked(palette.brand, 0.6));
    Ok(placement)
}

/// Smaller heading kept on the same page as the first `keep_with` mm after it
pub fn draw_sub_header(
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    title: &str,
    keep_with: f64,
    palette: &Palette,
) -> Result<Placement, LayoutError> {
    let keep = (SUB_HEADER_HEIGHT + keep_with).min(pages.usable_height());
    pages.ensure_space(surface, keep)?;
    let placement = pages.reserve(surface, SUB_HEADER_HEIGHT)?;
    let (left, right) = (pages.content_left(), pages.content_right());
    surface.draw_text(
        title,
        left,
        placement.y + 2.0,
        &TextStyle::bold(SUB_HEADER_PT).with_color(palette.ink),
    );
    surface.draw_line(
        left,
        placement.y + 8.0,
        right,
        placement.y + 8.0,
        &ShapeStyle::stroked(palette.card_stroke, 0.3),
    );
    Ok(placement)
}

/// One muted line for empty sections
pub fn draw_placeholder(
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    text: &str,
    palette: &Palette,
) -> Result<Placement, LayoutError> {
    let placement = pages.reserve(surface, 10.0)?;
    surface.draw_text(
        text,
        pages.content_left(),
        placement.y + 2.0,
        &TextStyle::regular(10.0).with_color(palette.muted),
    );
    Ok(placement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passport::surface::{DocumentInfo, DrawOp, PdfSurface};

    fn setup() -> (PdfSurface, PageManager) {
        let surface = PdfSurface::new(
            210.0,
            297.0,
            DocumentInfo {
                title: "Test".to_string(),
                author: None,
                creation_date: None,
            },
        )
        .unwrap();
        let pages = PageManager::from_config(&surface, &PassportConfig::default());
        (surface, pages)
    }

    #[test]
    fn test_fill_width_clamps() {
        assert_eq!(fill_width(100.0, 3.0), 100.0);
        assert_eq!(fill_width(100.0, -1.0), 0.0);
        assert_eq!(fill_width(100.0, f64::NAN), 0.0);
        assert_eq!(fill_width(100.0, 0.25), 25.0);
    }

    #[test]
    fn test_progress_bar_draws_track_and_fill() {
        let (mut surface, _) = setup();
        let p = Palette::default();
        let filled = draw_progress_bar(&mut surface, 10.0, 10.0, 80.0, 4.0, 0.5, p.track, p.brand);
        assert_eq!(filled, 40.0);
        assert_eq!(surface.pages()[0].content().len(), 2);

        let empty = draw_progress_bar(&mut surface, 10.0, 20.0, 80.0, 4.0, 0.0, p.track, p.brand);
        assert_eq!(empty, 0.0);
        assert_eq!(surface.pages()[0].content().len(), 3);
    }

    #[test]
    fn test_glyph_stamp_text_inside_circle() {
        let (mut surface, _) = setup();
        draw_glyph_stamp(&mut surface, 50.0, 50.0, 10.0, "*", Color::WHITE, Color::BLACK);
        let ops = surface.pages()[0].content();
        let circle = ops[0].bounds();
        let text = ops[1].bounds();
        assert!(text.top >= circle.top && text.bottom <= circle.bottom);
    }

    #[test]
    fn test_flow_paragraph_splits_across_pages() {
        let (mut surface, mut pages) = setup();
        pages.reserve(&mut surface, 200.0).unwrap();
        let text = "lorem ipsum dolor sit amet ".repeat(300);
        let paragraph = Paragraph::measure(&surface, &text, 170.0, 10.0).unwrap();
        assert!(paragraph.height() > pages.usable_height());

        let chunks =
            flow_paragraph(&mut surface, &mut pages, &paragraph, 18.0, Color::BLACK).unwrap();
        assert!(chunks >= 2);
        let drawn: usize = surface
            .pages()
            .iter()
            .map(|p| p.content().iter().filter(|op| matches!(op, DrawOp::Text { .. })).count())
            .sum();
        assert_eq!(drawn, paragraph.lines.iter().filter(|l| !l.is_empty()).count());
        for page in surface.pages() {
            for op in page.content() {
                assert!(op.bounds().bottom <= 273.0 + 1e-6);
            }
        }
    }

    #[test]
    fn test_sub_header_keeps_with_next_block() {
        let (mut surface, mut pages) = setup();
        pages.reserve(&mut surface, 230.0).unwrap();
        let palette = Palette::default();
        let p = draw_sub_header(&mut surface, &mut pages, "Badges", 34.0, &palette).unwrap();
        assert_eq!(p.page_index, 1);
        assert_eq!(p.y, 22.0);
    }

    #[test]
    fn test_section_header_marks_section() {
        let (mut surface, mut pages) = setup();
        let p = draw_section_header(&mut surface, &mut pages, "Legacy", None, &Palette::default())
            .unwrap();
        assert_eq!(p.y, 22.0);
        assert!(surface.pages()[0].contains_text("Legacy"));
        assert_eq!(pages.cursor().y, 22.0 + SECTION_HEADER_HEIGHT);
    }
}
