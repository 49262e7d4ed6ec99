//! End-to-end layout tests for passport composition

use async_trait::async_trait;
use base64::Engine;
use chrono::{TimeZone, Utc};
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use memory_passport::config::PassportConfig;
use memory_passport::passport::page::PageManager;
use memory_passport::passport::sections::{SectionStyle, achievements};
use memory_passport::passport::surface::{DocumentInfo, DrawOp, DrawingSurface, PdfSurface};
use memory_passport::{
    AvatarLoader, BadgeRecord, ChallengeRecord, ImageLoadError, ImprintRecord, LegacyNote,
    PassportComposer, PassportInput, PassportProfile, TestimonialRecord,
};
use std::io::Cursor;

const TOP: f64 = 22.0;
const BOTTOM: f64 = 273.0;

fn profile() -> PassportProfile {
    let mut profile = PassportProfile::new(
        "Grace Hopper",
        Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap(),
    );
    profile.location_label = "Arlington, Virginia".to_string();
    profile.bio_text = "Rear admiral and computing pioneer.".to_string();
    profile
}

fn blank_surface() -> PdfSurface {
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

fn assert_no_overflow(surface: &PdfSurface) {
    for (i, page) in surface.pages().iter().enumerate() {
        for op in page.content() {
            assert!(
                op.bounds().bottom <= BOTTOM + 1e-6,
                "content on page {} crosses the bottom margin: {:?}",
                i + 1,
                op
            );
        }
    }
}

fn assert_footers(surface: &PdfSurface) {
    let total = surface.page_count();
    for (i, page) in surface.pages().iter().enumerate() {
        let expected = format!("Page {} of {}", i + 1, total);
        let footers: Vec<&str> = page
            .decorations()
            .iter()
            .filter_map(DrawOp::text)
            .filter(|t| t.starts_with("Page "))
            .collect();
        assert_eq!(footers, vec![expected.as_str()], "page {}", i + 1);
    }
}

fn png_data_uri() -> String {
    let buffer = RgbImage::from_pixel(16, 16, image::Rgb([40, 120, 200]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(buffer)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

struct BrokenLoader;

#[async_trait]
impl AvatarLoader for BrokenLoader {
    async fn fetch(&self, _reference: &str) -> Result<Vec<u8>, ImageLoadError> {
        Ok(b"<html>not an image</html>".to_vec())
    }
}

#[test]
fn test_empty_passport_shows_every_placeholder() {
    let surface = PassportComposer::new()
        .layout(&PassportInput::new(profile()), None)
        .unwrap();

    assert_eq!(surface.page_count(), 5);
    let pages = surface.pages();
    assert!(pages[0].contains_text("Identity"));
    assert!(pages[0].contains_text("Rear admiral"));
    assert!(pages[1].contains_text("No imprints recorded yet."));
    assert!(pages[2].contains_text("No testimonials yet."));
    assert!(pages[3].contains_text("No badges earned yet."));
    assert!(pages[3].contains_text("No challenges joined yet."));
    assert!(pages[4].contains_text("has not written a legacy note yet"));
    assert_footers(&surface);
    assert_no_overflow(&surface);
}

#[test]
fn test_identity_anchored_on_first_page() {
    let surface = PassportComposer::new()
        .layout(&PassportInput::new(profile()), None)
        .unwrap();
    let title = surface.pages()[0]
        .content()
        .iter()
        .find(|op| op.text() == Some("Identity"))
        .unwrap();
    assert_eq!(title.bounds().top, TOP);
}

#[test]
fn test_legacy_starts_on_fresh_page_after_full_achievements() {
    let mut input = PassportInput::new(profile());
    // Enough challenges to leave the last achievements page partly filled
    input.challenges = (0..9)
        .map(|i| ChallengeRecord::new(format!("Challenge {}", i), i, 10))
        .collect();
    input.legacy = Some(LegacyNote::new("Leave every place better than you found it."));

    let surface = PassportComposer::new().layout(&input, None).unwrap();
    let legacy_page = surface
        .pages()
        .iter()
        .position(|p| p.content().iter().any(|op| op.text() == Some("Legacy")))
        .unwrap();

    assert_eq!(legacy_page, surface.page_count() - 1);
    let previous = &surface.pages()[legacy_page - 1];
    assert!(previous.contains_text("Challenge 8"));
    let title = surface.pages()[legacy_page]
        .content()
        .iter()
        .find(|op| op.text() == Some("Legacy"))
        .unwrap();
    assert_eq!(title.bounds().top, TOP);
    assert_footers(&surface);
}

#[test]
fn test_reserve_is_monotonic_and_resets_after_break() {
    let mut surface = blank_surface();
    let mut pages = PageManager::from_config(&surface, &PassportConfig::default());

    let mut last = (0usize, f64::MIN);
    for i in 0..60 {
        let height = 5.0 + (i % 7) as f64 * 3.0;
        let placement = pages.reserve(&mut surface, height).unwrap();
        if placement.page_index == last.0 {
            assert!(placement.y >= last.1);
        } else {
            assert_eq!(placement.page_index, last.0 + 1);
            assert_eq!(placement.y, TOP);
        }
        assert!(placement.y + height <= BOTTOM + 1e-6);
        last = (placement.page_index, placement.y);
    }
    assert!(surface.page_count() > 1);
}

#[test]
fn test_footer_totals_from_one_to_many_pages() {
    for blocks in [1usize, 10, 40, 95] {
        let mut surface = blank_surface();
        let mut pages = PageManager::from_config(&surface, &PassportConfig::default());
        for _ in 0..blocks {
            pages.reserve(&mut surface, 20.0).unwrap();
        }
        let total = pages.finalize(&mut surface).unwrap();
        assert_eq!(total, surface.page_count());
        assert_footers(&surface);
    }
}

#[test]
fn test_twenty_long_testimonials_flow_across_pages() {
    let mut input = PassportInput::new(profile());
    input.testimonials = (0..20)
        .map(|i| {
            TestimonialRecord::new(
                format!("Friend {}", i),
                "Neighbour",
                "She taught the whole street how to fix a radio and never lost her patience. "
                    .repeat(8),
            )
        })
        .collect();

    let surface = PassportComposer::new().layout(&input, None).unwrap();
    assert_no_overflow(&surface);
    assert_footers(&surface);

    let testimonial_pages: Vec<usize> = surface
        .pages()
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            p.contains_text("20 received \u{00B7} 0 given")
                || p.contains_text("Testimonials (continued)")
        })
        .map(|(i, _)| i)
        .collect();
    assert!(testimonial_pages.len() > 1);
    assert_eq!(surface.page_count(), 4 + testimonial_pages.len());

    for i in 0..20 {
        let author = format!("\u{2014} Friend {}", i);
        let count = surface
            .pages()
            .iter()
            .flat_map(|p| p.texts())
            .filter(|t| *t == author)
            .count();
        assert_eq!(count, 1, "{}", author);
    }

    // Each card lies entirely on one page: its frame and author share a page
    for page in &testimonial_pages {
        let cards = surface.pages()[*page]
            .content()
            .iter()
            .filter(|op| matches!(op, DrawOp::Rect { radius, .. } if *radius > 0.0))
            .count();
        let authors = surface.pages()[*page]
            .texts()
            .filter(|t| t.starts_with("\u{2014} Friend"))
            .count();
        assert_eq!(cards, authors, "page {}", page + 1);
    }
}

#[test]
fn test_over_target_challenge_fills_bar_exactly() {
    let mut input = PassportInput::new(profile());
    input.challenges = vec![ChallengeRecord::new("Walk 3 trails", 9, 3)];

    let surface = PassportComposer::new().layout(&input, None).unwrap();
    let bars: Vec<f64> = surface.pages()[3]
        .content()
        .iter()
        .filter_map(|op| match op {
            DrawOp::Rect { w, h, .. } if *h == 4.0 => Some(*w),
            _ => None,
        })
        .collect();
    // Track and fill share the full inner width
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0], bars[1]);
    assert!(surface.pages()[3].contains_text("9/3"));
}

#[test]
fn test_zero_target_challenge_draws_empty_bar() {
    let mut input = PassportInput::new(profile());
    input.challenges = vec![ChallengeRecord::new("Someday", 4, 0)];

    let surface = PassportComposer::new().layout(&input, None).unwrap();
    let bars = surface.pages()[3]
        .content()
        .iter()
        .filter(|op| matches!(op, DrawOp::Rect { h, .. } if *h == 4.0))
        .count();
    assert_eq!(bars, 1);
}

#[test]
fn test_badge_rows_stay_whole_at_a_page_boundary() {
    let mut surface = blank_surface();
    let mut pages = PageManager::from_config(&surface, &PassportConfig::default());
    // Leaves room for three badge rows but not a fourth
    pages.reserve(&mut surface, 100.0).unwrap();

    let badges: Vec<BadgeRecord> = (0..14)
        .map(|i| BadgeRecord::new(format!("Badge {}", i), true, 100.0))
        .collect();
    let style = SectionStyle::default();
    let report = achievements::render(&badges, &[], &mut surface, &mut pages, &style);
    assert_eq!(report.skipped, 0);

    let glyph_rows = |page: usize| {
        let mut rows: Vec<(f64, usize)> = Vec::new();
        for op in surface.pages()[page].content() {
            if let DrawOp::Circle { cy, r, .. } = op
                && *r == achievements::BADGE_GLYPH_RADIUS
            {
                match rows.iter_mut().find(|(y, _)| y == cy) {
                    Some(row) => row.1 += 1,
                    None => rows.push((*cy, 1)),
                }
            }
        }
        rows.into_iter().map(|(_, n)| n).collect::<Vec<_>>()
    };

    assert_eq!(glyph_rows(0), vec![4, 4, 4]);
    assert_eq!(glyph_rows(1), vec![2]);
    assert_no_overflow(&surface);
}

#[tokio::test]
async fn test_broken_avatar_keeps_identity_fields() {
    let mut profile = profile();
    profile.avatar_ref = Some("https://example.invalid/grace.png".to_string());
    let mut input = PassportInput::new(profile);
    input.badges = vec![BadgeRecord::new("Storyteller", true, 100.0)];

    let artifact = PassportComposer::new()
        .with_loader(Box::new(BrokenLoader))
        .compose(&input)
        .await
        .unwrap();
    assert_eq!(artifact.filename, "grace_hopper_passport.pdf");
    assert_eq!(artifact.page_count, 5);
    let pdf = String::from_utf8_lossy(&artifact.bytes);
    assert!(!pdf.contains("/Subtype /Image"));
    assert!(pdf.contains("(Grace Hopper)"));
    assert!(pdf.contains("(Based in Arlington, Virginia)"));
}

#[tokio::test]
async fn test_data_uri_avatar_is_embedded() {
    let mut profile = profile();
    profile.avatar_ref = Some(png_data_uri());
    let artifact = PassportComposer::new()
        .compose(&PassportInput::new(profile))
        .await
        .unwrap();
    let pdf = String::from_utf8_lossy(&artifact.bytes);
    assert!(pdf.contains("/Subtype /Image /Width 16 /Height 16"));
    assert!(pdf.contains("/Im0 Do"));
}

#[test]
fn test_full_passport_stays_within_margins() {
    let mut input = PassportInput::new(profile());
    input.imprints = (0..10)
        .map(|i| {
            let mut imprint = ImprintRecord::new(
                format!("Imprint {}", i),
                Utc.with_ymd_and_hms(2022, 1 + i % 12, 1, 0, 0, 0).unwrap(),
            );
            imprint.tags = vec!["family".to_string(), "travel".to_string()];
            imprint
        })
        .collect();
    input.badges = (0..7)
        .map(|i| BadgeRecord::new(format!("Badge {}", i), i % 2 == 0, 40.0))
        .collect();
    input.challenges = (0..5)
        .map(|i| ChallengeRecord::new(format!("Challenge {}", i), i * 3, 10))
        .collect();
    input.testimonials = vec![TestimonialRecord::new("Ada", "Colleague", "Tireless.")];
    input.legacy = Some(LegacyNote::new(
        "It is easier to ask forgiveness than to get permission. ".repeat(40),
    ));

    let surface = PassportComposer::new().layout(&input, None).unwrap();
    assert_no_overflow(&surface);
    assert_footers(&surface);
    assert!(surface.pages()[1].contains_text("Showing 6 of 10 imprints"));
    assert!(!surface.pages()[1].contains_text("Imprint 6"));
}
