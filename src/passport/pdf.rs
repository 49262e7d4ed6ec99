//! PDF 1.4 serialization of a [`PdfSurface`]
//!
//! Object layout:
//! - 1: catalog, 2: page tree
//! - 3 + 2i / 4 + 2i: page `i` and its content stream
//! - two Type1 fonts (Helvetica, Helvetica-Bold, WinAnsi encoded)
//! - one image XObject per embedded raster image
//! - the info dictionary
//!
//! Drawing operations use millimeters from the top-left corner; they are
//! converted here to points from the bottom-left corner.

use super::ComposeError;
use super::metrics::{self, ASCENT_FACTOR, mm_to_pt};
use super::surface::{Color, DrawOp, DrawingSurface, PdfSurface, ShapeStyle, SurfacePage, TextAlign};

/// Bezier control point factor approximating a quarter circle
const KAPPA: f64 = 0.5523;

const PRODUCER: &str = "Memory Passport";

/// Serialize the whole surface to PDF bytes
pub fn write_document(surface: &PdfSurface) -> Result<Vec<u8>, ComposeError> {
    let pages = surface.pages();
    if pages.is_empty() {
        return Err(ComposeError::SerializationError(
            "document has no pages".to_string(),
        ));
    }

    let page_count = pages.len();
    let width_pt = mm_to_pt(surface.page_width());
    let height_pt = mm_to_pt(surface.page_height());
    let font_obj_start = 3 + page_count * 2;
    let image_obj_start = font_obj_start + 2;
    let info_obj_id = image_obj_start + surface.images().len();

    let mut pdf: Vec<u8> = Vec::new();
    // Byte offset of object `id` lives at index `id - 1`
    let mut xref_positions: Vec<usize> = Vec::with_capacity(info_obj_id);

    pdf.extend_from_slice(b"%PDF-1.4\n");
    pdf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

    xref_positions.push(pdf.len());
    pdf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    xref_positions.push(pdf.len());
    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", 3 + i * 2))
        .collect();
    pdf.extend_from_slice(
        format!(
            "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
            kids.join(" "),
            page_count
        )
        .as_bytes(),
    );

    let xobjects: String = (0..surface.images().len())
        .map(|i| format!("/Im{} {} 0 R", i, image_obj_start + i))
        .collect::<Vec<_>>()
        .join(" ");
    let resources = if xobjects.is_empty() {
        format!(
            "<< /Font << /F1 {} 0 R /F2 {} 0 R >> >>",
            font_obj_start,
            font_obj_start + 1
        )
    } else {
        format!(
            "<< /Font << /F1 {} 0 R /F2 {} 0 R >> /XObject << {} >> >>",
            font_obj_start,
            font_obj_start + 1,
            xobjects
        )
    };

    for (page_idx, page) in pages.iter().enumerate() {
        let page_obj_id = 3 + page_idx * 2;
        let content_obj_id = page_obj_id + 1;

        xref_positions.push(pdf.len());
        pdf.extend_from_slice(
            format!(
                "{} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] /Contents {} 0 R /Resources {} >>\nendobj\n",
                page_obj_id, width_pt, height_pt, content_obj_id, resources
            )
            .as_bytes(),
        );

        let stream = page_content_stream(page, surface.page_height());
        xref_positions.push(pdf.len());
        pdf.extend_from_slice(
            format!(
                "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
                content_obj_id,
                stream.len(),
                stream
            )
            .as_bytes(),
        );
    }

    for (offset, base_font) in ["Helvetica", "Helvetica-Bold"].iter().enumerate() {
        xref_positions.push(pdf.len());
        pdf.extend_from_slice(
            format!(
                "{} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>\nendobj\n",
                font_obj_start + offset,
                base_font
            )
            .as_bytes(),
        );
    }

    for (i, image) in surface.images().iter().enumerate() {
        xref_positions.push(pdf.len());
        let data = image.deflated_rgb();
        pdf.extend_from_slice(
            format!(
                "{} 0 obj\n<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode /Length {} >>\nstream\n",
                image_obj_start + i,
                image.width_px(),
                image.height_px(),
                data.len()
            )
            .as_bytes(),
        );
        pdf.extend_from_slice(data);
        pdf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    let info = surface.info();
    let mut info_entries = format!(
        "/Title ({}) /Producer ({})",
        escape_pdf_string(&info.title),
        PRODUCER
    );
    if let Some(author) = &info.author {
        info_entries.push_str(&format!(" /Author ({})", escape_pdf_string(author)));
    }
    if let Some(created) = &info.creation_date {
        info_entries.push_str(&format!(
            " /CreationDate ({})",
            created.format("D:%Y%m%d%H%M%SZ")
        ));
    }
    xref_positions.push(pdf.len());
    pdf.extend_from_slice(
        format!("{} 0 obj\n<< {} >>\nendobj\n", info_obj_id, info_entries).as_bytes(),
    );

    if xref_positions.len() != info_obj_id {
        return Err(ComposeError::SerializationError(format!(
            "wrote {} objects, expected {}",
            xref_positions.len(),
            info_obj_id
        )));
    }

    let xref_start = pdf.len();
    pdf.extend_from_slice(b"xref\n");
    pdf.extend_from_slice(format!("0 {}\n", xref_positions.len() + 1).as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for pos in &xref_positions {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", pos).as_bytes());
    }

    pdf.extend_from_slice(b"trailer\n");
    pdf.extend_from_slice(
        format!(
            "<< /Size {} /Root 1 0 R /Info {} 0 R >>\n",
            xref_positions.len() + 1,
            info_obj_id
        )
        .as_bytes(),
    );
    pdf.extend_from_slice(b"startxref\n");
    pdf.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    pdf.extend_from_slice(b"%%EOF\n");

    Ok(pdf)
}

/// Render a page's recorded operations to a content stream
fn page_content_stream(page: &SurfacePage, page_height_mm: f64) -> String {
    let mut stream = String::new();
    let y = |y_mm: f64| mm_to_pt(page_height_mm - y_mm);

    for op in page.ops() {
        match op {
            DrawOp::Text { text, x, y: top, style } => {
                let width = metrics::text_width_mm(text, style.font_size_pt, style.bold);
                let left = match style.align {
                    TextAlign::Left => *x,
                    TextAlign::Center => x - width / 2.0,
                    TextAlign::Right => x - width,
                };
                let baseline = top + metrics::pt_to_mm(style.font_size_pt) * ASCENT_FACTOR;
                let font = if style.bold { "/F2" } else { "/F1" };
                stream.push_str("BT\n");
                stream.push_str(&format!("{} {:.1} Tf\n", font, style.font_size_pt));
                stream.push_str(&format!("{} rg\n", color_operands(style.color)));
                stream.push_str(&format!(
                    "1 0 0 1 {:.2} {:.2} Tm\n",
                    mm_to_pt(left),
                    y(baseline)
                ));
                stream.push_str(&format!("({}) Tj\n", escape_pdf_string(text)));
                stream.push_str("ET\n");
            }
            DrawOp::Rect {
                x,
                y: top,
                w,
                h,
                radius,
                style,
            } => {
                stream.push_str("q\n");
                push_paint_state(&mut stream, style);
                if *radius <= 0.0 {
                    stream.push_str(&format!(
                        "{:.2} {:.2} {:.2} {:.2} re\n",
                        mm_to_pt(*x),
                        y(top + h),
                        mm_to_pt(*w),
                        mm_to_pt(*h)
                    ));
                } else {
                    push_rounded_rect_path(
                        &mut stream,
                        mm_to_pt(*x),
                        y(top + h),
                        mm_to_pt(*w),
                        mm_to_pt(*h),
                        mm_to_pt(*radius),
                    );
                }
                stream.push_str(paint_operator(style));
                stream.push_str("Q\n");
            }
            DrawOp::Circle { cx, cy, r, style } => {
                stream.push_str("q\n");
                push_paint_state(&mut stream, style);
                push_circle_path(&mut stream, mm_to_pt(*cx), y(*cy), mm_to_pt(*r));
                stream.push_str(paint_operator(style));
                stream.push_str("Q\n");
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                style,
            } => {
                stream.push_str("q\n");
                push_paint_state(&mut stream, style);
                stream.push_str(&format!(
                    "{:.2} {:.2} m\n{:.2} {:.2} l\nS\n",
                    mm_to_pt(*x1),
                    y(*y1),
                    mm_to_pt(*x2),
                    y(*y2)
                ));
                stream.push_str("Q\n");
            }
            DrawOp::Image {
                image,
                x,
                y: top,
                w,
                h,
            } => {
                stream.push_str(&format!(
                    "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                    mm_to_pt(*w),
                    mm_to_pt(*h),
                    mm_to_pt(*x),
                    y(top + h),
                    image
                ));
            }
        }
    }

    stream
}

fn color_operands(color: Color) -> String {
    format!("{:.3} {:.3} {:.3}", color.r, color.g, color.b)
}

fn push_paint_state(stream: &mut String, style: &ShapeStyle) {
    if let Some(fill) = style.fill {
        stream.push_str(&format!("{} rg\n", color_operands(fill)));
    }
    if let Some(stroke) = style.stroke {
        stream.push_str(&format!("{} RG\n", color_operands(stroke)));
        stream.push_str(&format!("{:.2} w\n", mm_to_pt(style.line_width_mm)));
    }
}

fn paint_operator(style: &ShapeStyle) -> &'static str {
    match (style.fill.is_some(), style.stroke.is_some()) {
        (true, true) => "B\n",
        (true, false) => "f\n",
        (false, true) => "S\n",
        (false, false) => "n\n",
    }
}

/// Circle as four Bezier quarter arcs
fn push_circle_path(stream: &mut String, cx: f64, cy: f64, r: f64) {
    let k = KAPPA;
    stream.push_str(&format!("{:.2} {:.2} m\n", cx + r, cy));
    stream.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        cx + r,
        cy + r * k,
        cx + r * k,
        cy + r,
        cx,
        cy + r
    ));
    stream.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        cx - r * k,
        cy + r,
        cx - r,
        cy + r * k,
        cx - r,
        cy
    ));
    stream.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        cx - r,
        cy - r * k,
        cx - r * k,
        cy - r,
        cx,
        cy - r
    ));
    stream.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        cx + r * k,
        cy - r,
        cx + r,
        cy - r * k,
        cx + r,
        cy
    ));
}

/// Rounded rectangle with bottom-left corner at (x, y) in PDF space
fn push_rounded_rect_path(stream: &mut String, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let c = r * (1.0 - KAPPA);
    let (right, top) = (x + w, y + h);
    stream.push_str(&format!("{:.2} {:.2} m\n", x + r, y));
    stream.push_str(&format!("{:.2} {:.2} l\n", right - r, y));
    stream.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        right - c,
        y,
        right,
        y + c,
        right,
        y + r
    ));
    stream.push_str(&format!("{:.2} {:.2} l\n", right, top - r));
    stream.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        right,
        top - c,
        right - c,
        top,
        right - r,
        top
    ));
    stream.push_str(&format!("{:.2} {:.2} l\n", x + r, top));
    stream.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        x + c,
        top,
        x,
        top - c,
        x,
        top - r
    ));
    stream.push_str(&format!("{:.2} {:.2} l\n", x, y + r));
    stream.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        x,
        y + c,
        x + c,
        y,
        x + r,
        y
    ));
    stream.push_str("h\n");
}

/// Escape a string for a PDF literal in WinAnsiEncoding
pub fn escape_pdf_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '(' => result.push_str("\\("),
            ')' => result.push_str("\\)"),
            '\n' | '\r' | '\t' => result.push(' '),
            '\u{2022}' => result.push_str("\\225"), // bullet
            '\u{2013}' => result.push_str("\\226"), // en dash
            '\u{2014}' => result.push_str("\\227"), // em dash
            '\u{2018}' => result.push_str("\\221"),
            '\u{2019}' => result.push_str("\\222"),
            '\u{201C}' => result.push_str("\\223"),
            '\u{201D}' => result.push_str("\\224"),
            '\u{2122}' => result.push_str("\\231"), // trademark
            _ if c.is_ascii_control() => {}
            _ if c.is_ascii() => result.push(c),
            // Latin-1 supplement maps 1:1 onto WinAnsi
            '\u{00A0}'..='\u{00FF}' => result.push_str(&format!("\\{:03o}", c as u32)),
            _ => result.push('?'),
        }
    }
    result
}
