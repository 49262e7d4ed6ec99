//! Achievements & Challenges: badge grids and challenge progress cards
//!
//! Badge grids reserve one block per row so a row never straddles a page
//! break. Column placement is tracked here, independently of the page cursor.

use super::{ACHIEVEMENTS_TITLE, SectionReport, SectionStyle};
use crate::models::{BadgeRecord, BadgeStanding, ChallengeRecord};
use crate::passport::LayoutError;
use crate::passport::metrics::{fit_line, truncate_chars};
use crate::passport::page::{PageManager, Placement};
use crate::passport::primitives::{self, Palette, fill_width};
use crate::passport::surface::{DrawingSurface, TextAlign, TextStyle};

pub const BADGE_ROW_HEIGHT: f64 = 34.0;
pub const BADGE_GLYPH_RADIUS: f64 = 10.0;
pub const CHALLENGE_CARD_HEIGHT: f64 = 30.0;
pub const CHALLENGE_CARD_GAP: f64 = 4.0;

const CARD_PADDING: f64 = 5.0;
const BAR_HEIGHT: f64 = 4.0;
const MINI_BAR_WIDTH: f64 = 24.0;

/// Number of badge cells per row; at least one
pub fn grid_columns(content_width: f64, cell_width: f64) -> usize {
    if cell_width.is_nan() || cell_width <= 0.0 {
        return 1;
    }
    ((content_width / cell_width).floor() as usize).max(1)
}

/// Filled width of a challenge bar
pub fn challenge_fill_width(challenge: &ChallengeRecord, bar_width: f64) -> f64 {
    fill_width(bar_width, challenge.fill_fraction())
}

/// Single character drawn inside a badge glyph
fn badge_symbol(name: &str) -> String {
    name.chars()
        .find(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_else(|| "*".to_string())
}

pub fn render(
    badges: &[BadgeRecord],
    challenges: &[ChallengeRecord],
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    style: &SectionStyle,
) -> SectionReport {
    let mut report = SectionReport::default();
    let palette = &style.palette;

    let achieved: Vec<&BadgeRecord> = badges
        .iter()
        .filter(|b| b.standing() == BadgeStanding::Achieved)
        .collect();
    let in_progress: Vec<&BadgeRecord> = badges
        .iter()
        .filter(|b| b.standing() == BadgeStanding::InProgress)
        .collect();

    let subtitle = format!(
        "{} badge{} earned \u{00B7} {} challenge{}",
        achieved.len(),
        if achieved.len() == 1 { "" } else { "s" },
        challenges.len(),
        if challenges.len() == 1 { "" } else { "s" }
    );
    report.record(
        ACHIEVEMENTS_TITLE,
        "header",
        primitives::draw_section_header(
            surface,
            pages,
            ACHIEVEMENTS_TITLE,
            Some(&subtitle),
            palette,
        )
        .map(|_| ()),
    );

    report.record(
        ACHIEVEMENTS_TITLE,
        "badges header",
        primitives::draw_sub_header(surface, pages, "Badges Earned", BADGE_ROW_HEIGHT, palette)
            .map(|_| ()),
    );
    if achieved.is_empty() {
        report.record(
            ACHIEVEMENTS_TITLE,
            "badges placeholder",
            primitives::draw_placeholder(surface, pages, "No badges earned yet.", palette)
                .map(|_| ()),
        );
    } else {
        report.merge(render_badge_grid(&achieved, surface, pages, style));
    }

    if !in_progress.is_empty() {
        pages.skip(2.0);
        report.record(
            ACHIEVEMENTS_TITLE,
            "in-progress header",
            primitives::draw_sub_header(surface, pages, "In Progress", BADGE_ROW_HEIGHT, palette)
                .map(|_| ()),
        );
        report.merge(render_badge_grid(&in_progress, surface, pages, style));
    }

    pages.skip(2.0);
    report.record(
        ACHIEVEMENTS_TITLE,
        "challenges header",
        primitives::draw_sub_header(
            surface,
            pages,
            "Challenges",
            CHALLENGE_CARD_HEIGHT,
            palette,
        )
        .map(|_| ()),
    );
    if challenges.is_empty() {
        report.record(
            ACHIEVEMENTS_TITLE,
            "challenges placeholder",
            primitives::draw_placeholder(surface, pages, "No challenges joined yet.", palette)
                .map(|_| ()),
        );
    }
    for challenge in challenges {
        let result = draw_challenge_card(challenge, surface, pages, palette);
        report.record(
            ACHIEVEMENTS_TITLE,
            &format!("challenge '{}'", challenge.title),
            result,
        );
    }

    report
}

/// Grid of badge glyphs, one reserved block per row
fn render_badge_grid(
    badges: &[&BadgeRecord],
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    style: &SectionStyle,
) -> SectionReport {
    let mut report = SectionReport::default();
    let columns = grid_columns(pages.content_width(), style.badge_cell_width_mm);
    let pitch = pages.content_width() / columns as f64;

    for row in badges.chunks(columns) {
        let row_origin = match pages.reserve(surface, BADGE_ROW_HEIGHT) {
            Ok(placement) => placement,
            Err(e) => {
                for badge in row {
                    report.record(
                        ACHIEVEMENTS_TITLE,
                        &format!("badge '{}'", badge.name),
                        Err(e.clone()),
                    );
                }
                continue;
            }
        };
        for (column, badge) in row.iter().enumerate() {
            let cx = pages.content_left() + (column as f64 + 0.5) * pitch;
            draw_badge_cell(badge, cx, row_origin, pitch, surface, style);
            report.drawn += 1;
        }
    }

    report
}

fn draw_badge_cell(
    badge: &BadgeRecord,
    cx: f64,
    row: Placement,
    pitch: f64,
    surface: &mut dyn DrawingSurface,
    style: &SectionStyle,
) {
    let palette = &style.palette;
    let y = row.y;
    let achieved = badge.standing() == BadgeStanding::Achieved;
    let (fill, ink) = if achieved {
        (palette.brand.lighten(0.85), palette.brand)
    } else {
        (palette.track, palette.muted)
    };

    primitives::draw_glyph_stamp(
        surface,
        cx,
        y + 12.0,
        BADGE_GLYPH_RADIUS,
        &badge_symbol(&badge.name),
        fill,
        ink,
    );

    let caption = truncate_chars(badge.name.trim(), style.badge_caption_chars);
    surface.draw_text(
        &fit_line(&caption, pitch - 2.0, 8.0, false),
        cx,
        y + 24.0,
        &TextStyle::regular(8.0)
            .with_color(palette.ink)
            .aligned(TextAlign::Center),
    );

    if !achieved {
        let percent = badge.clamped_progress();
        surface.draw_text(
            &format!("{:.0}% complete", percent),
            cx,
            y + 27.5,
            &TextStyle::regular(7.0)
                .with_color(palette.muted)
                .aligned(TextAlign::Center),
        );
        primitives::draw_progress_bar(
            surface,
            cx - MINI_BAR_WIDTH / 2.0,
            y + 30.5,
            MINI_BAR_WIDTH,
            2.0,
            percent / 100.0,
            palette.track,
            palette.accent,
        );
    }
}

fn draw_challenge_card(
    challenge: &ChallengeRecord,
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    palette: &Palette,
) -> Result<(), LayoutError> {
    let placement = pages.reserve(surface, CHALLENGE_CARD_HEIGHT)?;
    pages.skip(CHALLENGE_CARD_GAP);
    let (left, right, y) = (pages.content_left(), pages.content_right(), placement.y);
    let inner_left = left + CARD_PADDING;
    let inner_width = right - left - 2.0 * CARD_PADDING;

    primitives::draw_card(surface, left, y, right - left, CHALLENGE_CARD_HEIGHT - 1.0, palette);

    surface.draw_text(
        &fit_line(challenge.title.trim(), inner_width, 11.0, true),
        inner_left,
        y + 3.0,
        &TextStyle::bold(11.0).with_color(palette.ink),
    );

    let meta: Vec<&str> = [challenge.category_label.trim(), challenge.status_label.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !meta.is_empty() {
        surface.draw_text(
            &fit_line(&meta.join(" \u{00B7} "), inner_width, 9.0, false),
            inner_left,
            y + 9.5,
            &TextStyle::regular(9.0).with_color(palette.muted),
        );
    }

    primitives::draw_progress_bar(
        surface,
        inner_left,
        y + 17.0,
        inner_width,
        BAR_HEIGHT,
        challenge.fill_fraction(),
        palette.track,
        palette.accent,
    );

    let counts = TextStyle::regular(8.0).with_color(palette.muted);
    surface.draw_text(
        &format!("{}/{}", challenge.progress_count, challenge.target_count),
        inner_left,
        y + 23.0,
        &counts,
    );
    surface.draw_text(
        &format!("{:.0}%", challenge.fill_fraction() * 100.0),
        inner_left + inner_width,
        y + 23.0,
        &counts.aligned(TextAlign::Right),
    );

    Ok(())
}
