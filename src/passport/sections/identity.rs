//! Identity page: header, identity card with avatar, statistics strip, bio

use tracing::warn;

use super::{IDENTITY_TITLE, SectionReport, SectionStyle};
use crate::models::PassportInput;
use crate::passport::LayoutError;
use crate::passport::metrics::{self, fit_line};
use crate::passport::page::PageManager;
use crate::passport::primitives::{self, Paragraph};
use crate::passport::surface::{
    Color, DrawingSurface, RasterImage, ShapeStyle, TextAlign, TextStyle,
};

pub const IDENTITY_CARD_HEIGHT: f64 = 56.0;
pub const STATS_STRIP_HEIGHT: f64 = 24.0;
pub const AVATAR_SIZE_MM: f64 = 44.0;

const CARD_HEIGHT: f64 = 52.0;
const AVATAR_INSET: f64 = 4.0;

/// Tier derived from the number of achieved badges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeLevel {
    Seeker,
    Keeper,
    Guardian,
}

impl BadgeLevel {
    pub fn from_achieved(count: usize) -> Self {
        match count {
            10.. => BadgeLevel::Guardian,
            5..=9 => BadgeLevel::Keeper,
            _ => BadgeLevel::Seeker,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BadgeLevel::Guardian => "Memory Guardian",
            BadgeLevel::Keeper => "Memory Keeper",
            BadgeLevel::Seeker => "Memory Seeker",
        }
    }
}

pub fn render(
    input: &PassportInput,
    avatar: Option<&RasterImage>,
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    style: &SectionStyle,
) -> SectionReport {
    let mut report = SectionReport::default();
    let subtitle = format!("Memory Passport of {}", input.profile.display_name());

    report.record(
        IDENTITY_TITLE,
        "header",
        primitives::draw_section_header(
            surface,
            pages,
            IDENTITY_TITLE,
            Some(&subtitle),
            &style.palette,
        )
        .map(|_| ()),
    );
    report.record(
        IDENTITY_TITLE,
        "identity card",
        draw_identity_card(input, avatar, surface, pages, style),
    );
    report.record(
        IDENTITY_TITLE,
        "statistics",
        draw_stats_strip(input, surface, pages, style),
    );
    report.record(IDENTITY_TITLE, "bio", draw_bio(input, surface, pages, style));

    report
}

fn draw_identity_card(
    input: &PassportInput,
    avatar: Option<&RasterImage>,
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    style: &SectionStyle,
) -> Result<(), LayoutError> {
    let profile = &input.profile;
    let palette = &style.palette;
    let placement = pages.reserve(surface, IDENTITY_CARD_HEIGHT)?;
    let (left, right, y) = (pages.content_left(), pages.content_right(), placement.y);

    primitives::draw_card(surface, left, y, right - left, CARD_HEIGHT, palette);

    let avatar_x = left + AVATAR_INSET;
    let avatar_y = y + AVATAR_INSET;
    let drew_avatar = match avatar {
        Some(image) => {
            match surface.draw_image(image, avatar_x, avatar_y, AVATAR_SIZE_MM, AVATAR_SIZE_MM) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Identity: drawing without avatar: {}", e);
                    false
                }
            }
        }
        None => false,
    };

    let text_x = if drew_avatar {
        // Ring over the square image stands in for a circular crop
        let r = AVATAR_SIZE_MM / 2.0;
        surface.draw_circle(
            avatar_x + r,
            avatar_y + r,
            r,
            &ShapeStyle::stroked(palette.brand, 1.5),
        );
        avatar_x + AVATAR_SIZE_MM + 6.0
    } else {
        left + 6.0
    };
    let text_width = right - text_x - 4.0;

    surface.draw_text(
        &fit_line(profile.display_name(), text_width, 20.0, true),
        text_x,
        y + 6.0,
        &TextStyle::bold(20.0).with_color(palette.ink),
    );

    let detail_style = TextStyle::regular(10.0).with_color(palette.muted);
    let mut details = Vec::new();
    let location = profile.location_label.trim();
    if !location.is_empty() {
        details.push(format!("Based in {}", location));
    }
    details.push(format!("Member since {}", profile.joined_at.format("%B %Y")));
    details.push(format!("Profile visibility: {}", profile.profile_visibility));
    for (i, line) in details.iter().enumerate() {
        surface.draw_text(
            &fit_line(line, text_width, 10.0, false),
            text_x,
            y + 16.0 + i as f64 * 6.0,
            &detail_style,
        );
    }

    let achieved = input.achieved_badge_count();
    let level = BadgeLevel::from_achieved(achieved);
    let chip_text = format!(
        "{} \u{00B7} {} badge{}",
        level.label(),
        achieved,
        if achieved == 1 { "" } else { "s" }
    );
    let chip_width = (metrics::text_width_mm(&chip_text, 9.0, true) + 6.0).min(text_width);
    surface.draw_rounded_rect(
        text_x,
        y + 36.0,
        chip_width,
        8.0,
        4.0,
        &ShapeStyle::filled(palette.brand),
    );
    surface.draw_text(
        &chip_text,
        text_x + 3.0,
        y + 38.4,
        &TextStyle::bold(9.0).with_color(Color::WHITE),
    );

    Ok(())
}

fn draw_stats_strip(
    input: &PassportInput,
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    style: &SectionStyle,
) -> Result<(), LayoutError> {
    let palette = &style.palette;
    let placement = pages.reserve(surface, STATS_STRIP_HEIGHT)?;
    let stats = [
        (input.imprints.len(), "Imprints"),
        (input.testimonials.len(), "Testimonials"),
        (input.achieved_badge_count(), "Badges Earned"),
        (input.challenges.len(), "Challenges"),
    ];

    let gap = 4.0;
    let cell_width = (pages.content_width() - gap * (stats.len() - 1) as f64) / stats.len() as f64;
    for (i, (count, label)) in stats.iter().enumerate() {
        let x = pages.content_left() + i as f64 * (cell_width + gap);
        let center = x + cell_width / 2.0;
        primitives::draw_card(surface, x, placement.y, cell_width, 20.0, palette);
        surface.draw_text(
            &count.to_string(),
            center,
            placement.y + 3.0,
            &TextStyle::bold(16.0)
                .with_color(palette.brand)
                .aligned(TextAlign::Center),
        );
        surface.draw_text(
            label,
            center,
            placement.y + 13.0,
            &TextStyle::regular(8.0)
                .with_color(palette.muted)
                .aligned(TextAlign::Center),
        );
    }
    Ok(())
}

fn draw_bio(
    input: &PassportInput,
    surface: &mut dyn DrawingSurface,
    pages: &mut PageManager,
    style: &SectionStyle,
) -> Result<(), LayoutError> {
    let bio = input.profile.bio_text.trim();
    let (text, color) = if bio.is_empty() {
        ("No bio provided.", style.palette.muted)
    } else {
        (bio, style.palette.ink)
    };
    let paragraph = Paragraph::measure(surface, text, pages.content_width(), style.body_font_pt)?;

    pages.skip(2.0);
    primitives::draw_sub_header(
        surface,
        pages,
        "About",
        paragraph.line_height(),
        &style.palette,
    )?;
    let left = pages.content_left();
    primitives::flow_paragraph(surface, pages, &paragraph, left, color)?;
    Ok(())
}
