//! Text measurement for the built-in Helvetica faces
//!
//! Helvetica is one of the standard PDF fonts, so its advance widths are
//! fixed and no font program needs embedding. Widths are in 1/1000 em.

use super::LayoutError;

/// Points per millimeter
pub const PT_PER_MM: f64 = 2.83465;

/// Line advance as a multiple of the font size
pub const LINE_HEIGHT_FACTOR: f64 = 1.4;

/// Baseline offset below the top of the em box, as a fraction of the font size
pub const ASCENT_FACTOR: f64 = 0.78;

/// Helvetica advance widths for ' ' (0x20) through '~' (0x7E)
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold advance widths for ' ' (0x20) through '~' (0x7E)
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// Width used for characters outside the table (rendered as '?')
const FALLBACK_WIDTH: u16 = 556;

/// Widest glyph of either face (regular '@'); a line narrower than this cannot hold text
const WIDEST_GLYPH: u16 = 1015;

fn char_width_units(c: char, bold: bool) -> u16 {
    match c {
        ' '..='~' if bold => HELVETICA_BOLD_WIDTHS[c as usize - 0x20],
        ' '..='~' => HELVETICA_WIDTHS[c as usize - 0x20],
        '\u{2013}' => 556,
        '\u{2014}' => 1000,
        '\u{2022}' => 350,
        '\u{00B7}' => 278,
        _ => FALLBACK_WIDTH,
    }
}

pub fn pt_to_mm(pt: f64) -> f64 {
    pt / PT_PER_MM
}

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

/// Rendered width of a single line of text
pub fn text_width_mm(text: &str, font_size_pt: f64, bold: bool) -> f64 {
    let units: u32 = text.chars().map(|c| char_width_units(c, bold) as u32).sum();
    pt_to_mm(units as f64 * font_size_pt / 1000.0)
}

/// Vertical advance of one wrapped line
pub fn line_height_mm(font_size_pt: f64) -> f64 {
    pt_to_mm(font_size_pt * LINE_HEIGHT_FACTOR)
}

/// Height of the em box, the drawn extent of a single line of text
pub fn em_height_mm(font_size_pt: f64) -> f64 {
    pt_to_mm(font_size_pt)
}

/// Greedy word wrap to `max_width_mm`
///
/// Explicit newlines start a new line; words wider than the line are broken
/// by character. Empty input yields a single empty line.
pub fn wrap_text(
    text: &str,
    max_width_mm: f64,
    font_size_pt: f64,
) -> Result<Vec<String>, LayoutError> {
    if !font_size_pt.is_finite() || font_size_pt <= 0.0 {
        return Err(LayoutError::Unmeasurable(format!(
            "invalid font size {}",
            font_size_pt
        )));
    }
    let min_width = pt_to_mm(WIDEST_GLYPH as f64 * font_size_pt / 1000.0);
    if !max_width_mm.is_finite() || max_width_mm < min_width {
        return Err(LayoutError::Unmeasurable(format!(
            "line width {:.2} mm cannot hold a single glyph at {} pt",
            max_width_mm, font_size_pt
        )));
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if text_width_mm(&candidate, font_size_pt, false) <= max_width_mm {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width_mm(word, font_size_pt, false) <= max_width_mm {
                current = word.to_string();
            } else {
                let mut pieces = split_long_word(word, max_width_mm, font_size_pt);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        lines.push(current);
    }

    // Trailing blank lines add height without content
    while lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    Ok(lines)
}

fn split_long_word(word: &str, max_width_mm: f64, font_size_pt: f64) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if text_width_mm(&current, font_size_pt, false) > max_width_mm {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Total height of `text` wrapped to `max_width_mm`
pub fn measure_wrapped_height(
    text: &str,
    max_width_mm: f64,
    font_size_pt: f64,
) -> Result<f64, LayoutError> {
    let lines = wrap_text(text, max_width_mm, font_size_pt)?;
    Ok(lines.len() as f64 * line_height_mm(font_size_pt))
}

/// Hard substring cut to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Cut `text` so it fits on one line of `max_width_mm`, appending "..." when cut
pub fn fit_line(text: &str, max_width_mm: f64, font_size_pt: f64, bold: bool) -> String {
    if text_width_mm(text, font_size_pt, bold) <= max_width_mm {
        return text.to_string();
    }
    let mut fitted = String::new();
    for c in text.chars() {
        fitted.push(c);
        if text_width_mm(&format!("{}...", fitted), font_size_pt, bold) > max_width_mm {
            fitted.pop();
            break;
        }
    }
    format!("{}...", fitted.trim_end())
}
