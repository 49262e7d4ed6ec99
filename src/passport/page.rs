//! Page cursor and pagination
//!
//! [`PageManager`] is the only owner of the vertical cursor. Renderers ask it
//! for space with [`PageManager::reserve`] and draw at the returned
//! [`Placement`]; they never move the cursor themselves.
//!
//! Page decorations (border, continuation header, footer rule) are drawn when a
//! page is left, once its content is known. Footer text needs the final page
//! count, so each decorated page records a [`FooterStamp`] that
//! [`PageManager::finalize`] replays after layout.

use tracing::debug;

use super::surface::{Color, DrawingSurface, Layer, ShapeStyle, TextAlign, TextStyle};
use super::{ComposeError, LayoutError};
use crate::config::{MarginsSection, PassportConfig};

/// Tolerance for floating point comparisons against the page bottom
const EPSILON: f64 = 1e-6;

/// Inset of the decorative border from the page edge
const BORDER_INSET_MM: f64 = 8.0;

const FOOTER_FONT_PT: f64 = 8.0;
const RUNNING_HEADER_FONT_PT: f64 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl From<&MarginsSection> for Margins {
    fn from(section: &MarginsSection) -> Self {
        Self {
            top: section.top,
            right: section.right,
            bottom: section.bottom,
            left: section.left,
        }
    }
}

/// Position of the layout cursor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    pub page_index: usize,
    pub y: f64,
    pub page_height: f64,
    pub margins: Margins,
}

impl PageCursor {
    pub fn content_top(&self) -> f64 {
        self.margins.top
    }

    /// Lowest y any content may reach
    pub fn content_bottom(&self) -> f64 {
        self.page_height - self.margins.bottom
    }

    pub fn remaining(&self) -> f64 {
        (self.content_bottom() - self.y).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// Fresh page, nothing reserved yet
    AwaitingContent,
    Drawing,
    Finalizing,
}

/// Where a reserved block must be drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page_index: usize,
    pub y: f64,
}

/// Footer text deferred until the page total is known
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FooterStamp {
    pub page_index: usize,
    pub y: f64,
}

/// Static page furniture
#[derive(Debug, Clone, PartialEq)]
pub struct PageDecor {
    pub brand_text: String,
    pub border: bool,
    pub accent: Color,
    pub muted: Color,
}

impl PageDecor {
    pub fn from_config(config: &PassportConfig) -> Self {
        Self {
            brand_text: config.branding.brand_text.clone(),
            border: config.layout.page_border,
            accent: Color::from_hex(&config.branding.brand_color)
                .unwrap_or(Color::rgb(0x5B, 0x3F, 0xD9)),
            muted: Color::rgb(0x6B, 0x6B, 0x76),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageManager {
    cursor: PageCursor,
    page_width: f64,
    state: PageState,
    decor: PageDecor,
    section: Option<String>,
    section_first_page: usize,
    footer_stamps: Vec<FooterStamp>,
}

impl PageManager {
    /// Start managing the surface's current page
    pub fn new(surface: &dyn DrawingSurface, margins: Margins, decor: PageDecor) -> Self {
        Self {
            cursor: PageCursor {
                page_index: surface.current_page(),
                y: margins.top,
                page_height: surface.page_height(),
                margins,
            },
            page_width: surface.page_width(),
            state: PageState::AwaitingContent,
            decor,
            section: None,
            section_first_page: surface.current_page(),
            footer_stamps: Vec::new(),
        }
    }

    pub fn from_config(surface: &dyn DrawingSurface, config: &PassportConfig) -> Self {
        Self::new(
            surface,
            Margins::from(&config.layout.margins),
            PageDecor::from_config(config),
        )
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn content_left(&self) -> f64 {
        self.cursor.margins.left
    }

    pub fn content_right(&self) -> f64 {
        self.page_width - self.cursor.margins.right
    }

    pub fn content_width(&self) -> f64 {
        self.content_right() - self.content_left()
    }

    /// Height of an empty page between the margins
    pub fn usable_height(&self) -> f64 {
        self.cursor.content_bottom() - self.cursor.content_top()
    }

    pub fn footer_stamps(&self) -> &[FooterStamp] {
        &self.footer_stamps
    }

    /// Name the section subsequent pages continue
    pub fn begin_section(&mut self, title: &str) {
        debug!(
            "Section '{}' starts on page {}",
            title,
            self.cursor.page_index + 1
        );
        self.section = Some(title.to_string());
        self.section_first_page = self.cursor.page_index;
    }

    /// Claim `height` millimeters, breaking the page first if they do not fit
    pub fn reserve(
        &mut self,
        surface: &mut dyn DrawingSurface,
        height: f64,
    ) -> Result<Placement, LayoutError> {
        self.ensure_space(surface, height)?;
        let placement = Placement {
            page_index: self.cursor.page_index,
            y: self.cursor.y,
        };
        self.cursor.y += height;
        self.state = PageState::Drawing;
        Ok(placement)
    }

    /// Break the page unless `height` fits below the cursor; the cursor stays put
    pub fn ensure_space(
        &mut self,
        surface: &mut dyn DrawingSurface,
        height: f64,
    ) -> Result<(), LayoutError> {
        self.check_height(height)?;
        if self.cursor.y + height > self.cursor.content_bottom() + EPSILON {
            self.break_page(surface);
        }
        Ok(())
    }

    /// Whether `height` fits below the cursor without a break
    pub fn fits(&self, height: f64) -> bool {
        self.cursor.y + height <= self.cursor.content_bottom() + EPSILON
    }

    /// Blank vertical gap; never crosses the page bottom
    pub fn skip(&mut self, gap: f64) {
        if gap > 0.0 {
            self.cursor.y = (self.cursor.y + gap).min(self.cursor.content_bottom());
        }
    }

    /// Start a fresh page unless the current one is still empty
    pub fn force_page_break(&mut self, surface: &mut dyn DrawingSurface) {
        if self.state == PageState::Drawing {
            self.break_page(surface);
        }
    }

    /// Decorate the last page and stamp every footer with the final total
    pub fn finalize(&mut self, surface: &mut dyn DrawingSurface) -> Result<usize, ComposeError> {
        if self.state == PageState::Finalizing {
            return Err(ComposeError::Layout(
                "page manager already finalized".to_string(),
            ));
        }
        self.decorate_current(surface);
        self.state = PageState::Finalizing;

        let total = surface.page_count();
        if self.footer_stamps.len() != total {
            return Err(ComposeError::Layout(format!(
                "{} of {} pages decorated",
                self.footer_stamps.len(),
                total
            )));
        }

        let last = surface.current_page();
        surface.set_layer(Layer::Decoration);
        let left_style = TextStyle::regular(FOOTER_FONT_PT).with_color(self.decor.muted);
        let right_style = left_style.clone().aligned(TextAlign::Right);
        for stamp in &self.footer_stamps {
            surface.select_page(stamp.page_index)?;
            surface.draw_text(
                &self.decor.brand_text,
                self.content_left(),
                stamp.y,
                &left_style,
            );
            surface.draw_text(
                &format!("Page {} of {}", stamp.page_index + 1, total),
                self.content_right(),
                stamp.y,
                &right_style,
            );
        }
        surface.select_page(last)?;
        surface.set_layer(Layer::Content);

        debug!("Stamped footers on {} pages", total);
        Ok(total)
    }

    fn check_height(&self, height: f64) -> Result<(), LayoutError> {
        if !height.is_finite() || height < 0.0 {
            return Err(LayoutError::Unmeasurable(format!(
                "invalid block height {}",
                height
            )));
        }
        let available = self.usable_height();
        if height > available + EPSILON {
            return Err(LayoutError::BlockTooTall { height, available });
        }
        Ok(())
    }

    fn break_page(&mut self, surface: &mut dyn DrawingSurface) {
        self.decorate_current(surface);
        surface.new_page();
        self.cursor.page_index = surface.current_page();
        self.cursor.y = self.cursor.content_top();
        self.state = PageState::AwaitingContent;
        debug!("Page break: now on page {}", self.cursor.page_index + 1);
    }

    /// Draw the furniture of the page being left and defer its footer text
    fn decorate_current(&mut self, surface: &mut dyn DrawingSurface) {
        let page_index = self.cursor.page_index;
        let height = self.cursor.page_height;
        let bottom = self.cursor.content_bottom();

        surface.set_layer(Layer::Decoration);

        if self.decor.border {
            surface.draw_rect(
                BORDER_INSET_MM,
                BORDER_INSET_MM,
                self.page_width - 2.0 * BORDER_INSET_MM,
                height - 2.0 * BORDER_INSET_MM,
                &ShapeStyle::stroked(self.decor.accent.lighten(0.6), 0.4),
            );
        }

        if let Some(section) = &self.section
            && page_index > self.section_first_page
        {
            surface.draw_text(
                &format!("{} (continued)", section),
                self.content_left(),
                self.cursor.content_top() - 10.0,
                &TextStyle::bold(RUNNING_HEADER_FONT_PT).with_color(self.decor.accent),
            );
        }

        let rule_y = bottom + 6.0;
        surface.draw_line(
            self.content_left(),
            rule_y,
            self.content_right(),
            rule_y,
            &ShapeStyle::stroked(self.decor.muted, 0.2),
        );

        surface.set_layer(Layer::Content);

        self.footer_stamps.push(FooterStamp {
            page_index,
            y: rule_y + 3.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passport::surface::{DocumentInfo, PdfSurface};

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
    fn test_first_reserve_at_top_margin() {
        let (mut surface, mut pages) = setup();
        assert_eq!(pages.state(), PageState::AwaitingContent);
        let p = pages.reserve(&mut surface, 30.0).unwrap();
        assert_eq!(p.page_index, 0);
        assert_eq!(p.y, 22.0);
        assert_eq!(pages.cursor().y, 52.0);
        assert_eq!(pages.state(), PageState::Drawing);
    }

    #[test]
    fn test_reserve_breaks_on_overflow() {
        let (mut surface, mut pages) = setup();
        let mut last = pages.reserve(&mut surface, 100.0).unwrap();
        for _ in 0..5 {
            let p = pages.reserve(&mut surface, 100.0).unwrap();
            if p.page_index == last.page_index {
                assert!(p.y >= last.y);
            } else {
                assert_eq!(p.y, 22.0);
            }
            assert!(p.y + 100.0 <= 273.0 + EPSILON);
            last = p;
        }
        // 251 mm usable: two 100 mm blocks per page
        assert_eq!(surface.page_count(), 3);
    }

    #[test]
    fn test_exact_fit_does_not_break() {
        let (mut surface, mut pages) = setup();
        let usable = pages.usable_height();
        let p = pages.reserve(&mut surface, usable).unwrap();
        assert_eq!(p.page_index, 0);
        assert_eq!(surface.page_count(), 1);
    }

    #[test]
    fn test_block_too_tall() {
        let (mut surface, mut pages) = setup();
        let err = pages.reserve(&mut surface, 260.0).unwrap_err();
        assert!(matches!(err, LayoutError::BlockTooTall { .. }));
        assert_eq!(surface.page_count(), 1);
        assert!(matches!(
            pages.reserve(&mut surface, f64::NAN),
            Err(LayoutError::Unmeasurable(_))
        ));
    }

    #[test]
    fn test_force_break_skips_empty_page() {
        let (mut surface, mut pages) = setup();
        pages.force_page_break(&mut surface);
        assert_eq!(surface.page_count(), 1);
        pages.reserve(&mut surface, 10.0).unwrap();
        pages.force_page_break(&mut surface);
        assert_eq!(surface.page_count(), 2);
        assert_eq!(pages.cursor().y, 22.0);
        pages.force_page_break(&mut surface);
        assert_eq!(surface.page_count(), 2);
    }

    #[test]
    fn test_skip_is_capped_at_bottom() {
        let (mut surface, mut pages) = setup();
        pages.reserve(&mut surface, 10.0).unwrap();
        pages.skip(1000.0);
        assert_eq!(pages.cursor().y, 273.0);
        pages.skip(-5.0);
        assert_eq!(pages.cursor().y, 273.0);
    }

    #[test]
    fn test_ensure_space_keeps_cursor() {
        let (mut surface, mut pages) = setup();
        pages.reserve(&mut surface, 240.0).unwrap();
        pages.ensure_space(&mut surface, 20.0).unwrap();
        assert_eq!(surface.page_count(), 2);
        assert_eq!(pages.cursor().y, 22.0);
        assert!(pages.fits(20.0));
    }

    #[test]
    fn test_finalize_stamps_every_footer_with_total() {
        let (mut surface, mut pages) = setup();
        pages.begin_section("Testimonials");
        for _ in 0..7 {
            pages.reserve(&mut surface, 90.0).unwrap();
        }
        let total = pages.finalize(&mut surface).unwrap();
        assert_eq!(total, 4);
        assert_eq!(pages.state(), PageState::Finalizing);

        for (i, page) in surface.pages().iter().enumerate() {
            let footer = format!("Page {} of 4", i + 1);
            assert!(page.decorations().iter().any(|op| op.text() == Some(footer.as_str())));
            assert!(page.contains_text("Memory Passport"));
            assert_eq!(
                page.contains_text("Testimonials (continued)"),
                i > 0,
                "page {}",
                i + 1
            );
        }
        assert!(pages.finalize(&mut surface).is_err());
    }

    #[test]
    fn test_decorations_stay_on_page_at_minimum_margins() {
        let mut config = PassportConfig::default();
        config.layout.margins.top = crate::config::MIN_TOP_MARGIN_MM;
        config.layout.margins.bottom = crate::config::MIN_BOTTOM_MARGIN_MM;
        config.validate().unwrap();

        let (mut surface, _) = setup();
        let mut pages = PageManager::from_config(&surface, &config);
        pages.begin_section("Imprints");
        for _ in 0..4 {
            pages.reserve(&mut surface, 200.0).unwrap();
        }
        pages.finalize(&mut surface).unwrap();

        for page in surface.pages() {
            for op in page.decorations() {
                let b = op.bounds();
                assert!(b.top >= 0.0, "{:?}", op);
                assert!(b.bottom <= 297.0, "{:?}", op);
            }
        }
        assert!(surface.pages()[1].contains_text("Imprints (continued)"));
    }
}
