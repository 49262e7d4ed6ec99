//! Drawing surface
//!
//! All coordinates are millimeters with the origin at the top-left corner of
//! the page and `y` growing downwards. [`PdfSurface`] records every call as a
//! [`DrawOp`] on the current page; nothing is serialized until
//! [`DrawingSurface::save`].

use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

use super::metrics;
use super::{ComposeError, ImageLoadError, LayoutError, PassportArtifact};

/// RGB color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Mix towards white; `amount` 0 keeps the color, 1 yields white
    pub fn lighten(self, amount: f64) -> Self {
        let t = amount.clamp(0.0, 1.0);
        Self {
            r: self.r + (1.0 - self.r) * t,
            g: self.g + (1.0 - self.g) * t,
            b: self.b + (1.0 - self.b) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size_pt: f64,
    pub bold: bool,
    pub color: Color,
    pub align: TextAlign,
}

impl TextStyle {
    pub fn regular(font_size_pt: f64) -> Self {
        Self {
            font_size_pt,
            bold: false,
            color: Color::BLACK,
            align: TextAlign::Left,
        }
    }

    pub fn bold(font_size_pt: f64) -> Self {
        Self {
            bold: true,
            ..Self::regular(font_size_pt)
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn aligned(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub line_width_mm: f64,
}

impl ShapeStyle {
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
            line_width_mm: 0.0,
        }
    }

    pub fn stroked(color: Color, line_width_mm: f64) -> Self {
        Self {
            fill: None,
            stroke: Some(color),
            line_width_mm,
        }
    }

    pub fn filled_and_stroked(fill: Color, stroke: Color, line_width_mm: f64) -> Self {
        Self {
            fill: Some(fill),
            stroke: Some(stroke),
            line_width_mm,
        }
    }

    fn stroke_overhang(&self) -> f64 {
        if self.stroke.is_some() {
            self.line_width_mm / 2.0
        } else {
            0.0
        }
    }
}

/// Axis-aligned extent of a drawn operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Which pass an operation belongs to
///
/// Content is placed through the page cursor; decorations (border, footer,
/// running header) are drawn outside it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Content,
    Decoration,
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// `y` is the top of the em box
    Text {
        text: String,
        x: f64,
        y: f64,
        style: TextStyle,
    },
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius: f64,
        style: ShapeStyle,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        style: ShapeStyle,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: ShapeStyle,
    },
    /// `image` indexes [`PdfSurface::images`]
    Image {
        image: usize,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
}

impl DrawOp {
    pub fn bounds(&self) -> Bounds {
        match self {
            DrawOp::Text { text, x, y, style } => {
                let width = metrics::text_width_mm(text, style.font_size_pt, style.bold);
                let left = match style.align {
                    TextAlign::Left => *x,
                    TextAlign::Center => x - width / 2.0,
                    TextAlign::Right => x - width,
                };
                Bounds {
                    left,
                    top: *y,
                    right: left + width,
                    bottom: y + metrics::em_height_mm(style.font_size_pt),
                }
            }
            DrawOp::Rect {
                x, y, w, h, style, ..
            } => {
                let o = style.stroke_overhang();
                Bounds {
                    left: x - o,
                    top: y - o,
                    right: x + w + o,
                    bottom: y + h + o,
                }
            }
            DrawOp::Circle { cx, cy, r, style } => {
                let reach = r + style.stroke_overhang();
                Bounds {
                    left: cx - reach,
                    top: cy - reach,
                    right: cx + reach,
                    bottom: cy + reach,
                }
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                style,
            } => {
                let o = style.stroke_overhang();
                Bounds {
                    left: x1.min(*x2) - o,
                    top: y1.min(*y2) - o,
                    right: x1.max(*x2) + o,
                    bottom: y1.max(*y2) + o,
                }
            }
            DrawOp::Image { x, y, w, h, .. } => Bounds {
                left: *x,
                top: *y,
                right: x + w,
                bottom: y + h,
            },
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Operations recorded for one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfacePage {
    content: Vec<DrawOp>,
    decorations: Vec<DrawOp>,
}

impl SurfacePage {
    pub fn content(&self) -> &[DrawOp] {
        &self.content
    }

    pub fn decorations(&self) -> &[DrawOp] {
        &self.decorations
    }

    /// Content first, then decorations; the order they are painted in
    pub fn ops(&self) -> impl Iterator<Item = &DrawOp> {
        self.content.iter().chain(self.decorations.iter())
    }

    /// Every piece of text on the page
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops().filter_map(DrawOp::text)
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}

/// Decoded raster image ready for embedding
///
/// Pixels are 8-bit RGB, zlib-compressed for a `/FlateDecode` image stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width_px: u32,
    height_px: u32,
    deflated_rgb: Vec<u8>,
}

impl RasterImage {
    pub fn from_rgb8(width_px: u32, height_px: u32, rgb: &[u8]) -> Result<Self, ImageLoadError> {
        if width_px == 0 || height_px == 0 {
            return Err(ImageLoadError::Decode("image has no pixels".to_string()));
        }
        let expected = width_px as usize * height_px as usize * 3;
        if rgb.len() != expected {
            return Err(ImageLoadError::Decode(format!(
                "expected {} RGB bytes for {}x{}, got {}",
                expected,
                width_px,
                height_px,
                rgb.len()
            )));
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(rgb)
            .map_err(|e| ImageLoadError::Encode(e.to_string()))?;
        let deflated_rgb = encoder
            .finish()
            .map_err(|e| ImageLoadError::Encode(e.to_string()))?;

        Ok(Self {
            width_px,
            height_px,
            deflated_rgb,
        })
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    pub fn height_px(&self) -> u32 {
        self.height_px
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width_px as f64 / self.height_px as f64
    }

    pub fn deflated_rgb(&self) -> &[u8] {
        &self.deflated_rgb
    }
}

/// Document info dictionary
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub title: String,
    pub author: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
}

/// Page-oriented drawing primitives
pub trait DrawingSurface {
    fn page_width(&self) -> f64;

    fn page_height(&self) -> f64;

    fn page_count(&self) -> usize;

    /// Index of the page drawing calls currently land on
    fn current_page(&self) -> usize;

    /// Redirect drawing to an already allocated page
    fn select_page(&mut self, index: usize) -> Result<(), ComposeError>;

    fn set_layer(&mut self, layer: Layer);

    fn draw_text(&mut self, content: &str, x: f64, y: f64, style: &TextStyle);

    fn wrap_text(
        &self,
        content: &str,
        max_width_mm: f64,
        font_size_pt: f64,
    ) -> Result<Vec<String>, LayoutError> {
        metrics::wrap_text(content, max_width_mm, font_size_pt)
    }

    fn measure_wrapped_height(
        &self,
        content: &str,
        max_width_mm: f64,
        font_size_pt: f64,
    ) -> Result<f64, LayoutError> {
        metrics::measure_wrapped_height(content, max_width_mm, font_size_pt)
    }

    fn draw_rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &ShapeStyle);

    fn draw_rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius: f64,
        style: &ShapeStyle,
    );

    fn draw_circle(&mut self, cx: f64, cy: f64, r: f64, style: &ShapeStyle);

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &ShapeStyle);

    fn draw_image(
        &mut self,
        image: &RasterImage,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    ) -> Result<(), ImageLoadError>;

    /// Append a page and make it current
    fn new_page(&mut self);

    /// Serialize every page into the final artifact
    fn save(&mut self, filename: &str) -> Result<PassportArtifact, ComposeError>;
}

/// Surface that serializes to PDF
#[derive(Debug, Clone)]
pub struct PdfSurface {
    width: f64,
    height: f64,
    pages: Vec<SurfacePage>,
    images: Vec<RasterImage>,
    current: usize,
    layer: Layer,
    info: DocumentInfo,
}

impl PdfSurface {
    /// Create a surface with one empty page
    pub fn new(width: f64, height: f64, info: DocumentInfo) -> Result<Self, ComposeError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ComposeError::SurfaceError(format!(
                "invalid page size {}x{} mm",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            pages: vec![SurfacePage::default()],
            images: Vec::new(),
            current: 0,
            layer: Layer::Content,
            info,
        })
    }

    pub fn pages(&self) -> &[SurfacePage] {
        &self.pages
    }

    pub fn images(&self) -> &[RasterImage] {
        &self.images
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    fn push(&mut self, op: DrawOp) {
        let page = &mut self.pages[self.current];
        match self.layer {
            Layer::Content => page.content.push(op),
            Layer::Decoration => page.decorations.push(op),
        }
    }
}

impl DrawingSurface for PdfSurface {
    fn page_width(&self) -> f64 {
        self.width
    }

    fn page_height(&self) -> f64 {
        self.height
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn select_page(&mut self, index: usize) -> Result<(), ComposeError> {
        if index >= self.pages.len() {
            return Err(ComposeError::SurfaceError(format!(
                "page {} does not exist ({} pages)",
                index,
                self.pages.len()
            )));
        }
        self.current = index;
        Ok(())
    }

    fn set_layer(&mut self, layer: Layer) {
        self.layer = layer;
    }

    fn draw_text(&mut self, content: &str, x: f64, y: f64, style: &TextStyle) {
        if content.is_empty() {
            return;
        }
        self.push(DrawOp::Text {
            text: content.to_string(),
            x,
            y,
            style: style.clone(),
        });
    }

    fn draw_rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &ShapeStyle) {
        self.draw_rounded_rect(x, y, w, h, 0.0, style);
    }

    fn draw_rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius: f64,
        style: &ShapeStyle,
    ) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let radius = radius.clamp(0.0, w.min(h) / 2.0);
        self.push(DrawOp::Rect {
            x,
            y,
            w,
            h,
            radius,
            style: style.clone(),
        });
    }

    fn draw_circle(&mut self, cx: f64, cy: f64, r: f64, style: &ShapeStyle) {
        if r <= 0.0 {
            return;
        }
        self.push(DrawOp::Circle {
            cx,
            cy,
            r,
            style: style.clone(),
        });
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &ShapeStyle) {
        self.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            style: style.clone(),
        });
    }

    fn draw_image(
        &mut self,
        image: &RasterImage,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    ) -> Result<(), ImageLoadError> {
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(ImageLoadError::InvalidPlacement(format!(
                "{}x{} mm at ({}, {})",
                w, h, x, y
            )));
        }
        let index = match self.images.iter().position(|existing| existing == image) {
            Some(index) => index,
            None => {
                self.images.push(image.clone());
                self.images.len() - 1
            }
        };
        self.push(DrawOp::Image {
            image: index,
            x,
            y,
            w,
            h,
        });
        Ok(())
    }

    fn new_page(&mut self) {
        self.pages.push(SurfacePage::default());
        self.current = self.pages.len() - 1;
    }

    fn save(&mut self, filename: &str) -> Result<PassportArtifact, ComposeError> {
        let bytes = super::pdf::write_document(self)?;
        Ok(PassportArtifact {
            filename: filename.to_string(),
            bytes,
            page_count: self.pages.len(),
            title: self.info.title.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> PdfSurface {
        PdfSurface::new(
            210.0,
            297.0,
            DocumentInfo {
                title: "Test".to_string(),
                author: None,
                creation_date: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#FFFFFF"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("000000"), Some(Color::BLACK));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
    }

    #[test]
    fn test_lighten() {
        assert_eq!(Color::BLACK.lighten(1.0), Color::WHITE);
        assert_eq!(Color::BLACK.lighten(0.0), Color::BLACK);
    }

    #[test]
    fn test_invalid_page_size_rejected() {
        let info = surface().info().clone();
        assert!(matches!(
            PdfSurface::new(0.0, 297.0, info),
            Err(ComposeError::SurfaceError(_))
        ));
    }

    #[test]
    fn test_ops_recorded_on_current_page_and_layer() {
        let mut s = surface();
        s.draw_text("first", 10.0, 10.0, &TextStyle::regular(10.0));
        s.new_page();
        s.set_layer(Layer::Decoration);
        s.draw_line(0.0, 5.0, 210.0, 5.0, &ShapeStyle::stroked(Color::BLACK, 0.2));
        s.set_layer(Layer::Content);
        s.select_page(0).unwrap();
        s.draw_circle(50.0, 50.0, 5.0, &ShapeStyle::filled(Color::BLACK));

        assert_eq!(s.page_count(), 2);
        assert_eq!(s.pages()[0].content().len(), 2);
        assert!(s.pages()[0].contains_text("first"));
        assert_eq!(s.pages()[1].decorations().len(), 1);
        assert!(s.select_page(5).is_err());
    }

    #[test]
    fn test_bounds_include_stroke() {
        let op = DrawOp::Circle {
            cx: 20.0,
            cy: 20.0,
            r: 10.0,
            style: ShapeStyle::stroked(Color::BLACK, 2.0),
        };
        let b = op.bounds();
        assert_eq!(b.top, 9.0);
        assert_eq!(b.bottom, 31.0);
    }

    #[test]
    fn test_centered_text_bounds() {
        let style = TextStyle::regular(10.0).aligned(TextAlign::Center);
        let op = DrawOp::Text {
            text: "AB".to_string(),
            x: 100.0,
            y: 0.0,
            style,
        };
        let b = op.bounds();
        assert!((b.left + b.right - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_images_are_deduplicated() {
        let mut s = surface();
        let image = RasterImage::from_rgb8(1, 1, &[255, 0, 0]).unwrap();
        s.draw_image(&image, 0.0, 0.0, 10.0, 10.0).unwrap();
        s.draw_image(&image, 20.0, 0.0, 10.0, 10.0).unwrap();
        assert_eq!(s.images().len(), 1);
        assert!(matches!(
            s.draw_image(&image, 0.0, 0.0, 0.0, 10.0),
            Err(ImageLoadError::InvalidPlacement(_))
        ));
    }

    #[test]
    fn test_raster_image_rejects_wrong_length() {
        assert!(RasterImage::from_rgb8(2, 2, &[0; 5]).is_err());
        assert!(RasterImage::from_rgb8(0, 2, &[]).is_err());
    }
}
