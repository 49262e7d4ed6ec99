//! Document assembly
//!
//! Runs the section renderers in their fixed order with a forced page break
//! between sections, finalizes the footers and serializes the result.

use chrono::Utc;
use std::time::Duration;
use tracing::{info, warn};

use super::avatar::{self, AvatarLoader, DefaultAvatarLoader};
use super::filename::passport_filename;
use super::page::PageManager;
use super::sections::{
    SectionReport, SectionStyle, achievements, identity, imprints, legacy, testimonials,
};
use super::surface::{DocumentInfo, DrawingSurface, PdfSurface, RasterImage};
use super::{ComposeError, PassportArtifact};
use crate::config::{PAGE_HEIGHT_MM, PAGE_WIDTH_MM, PassportConfig};
use crate::models::{
    BadgeRecord, ChallengeRecord, ImprintRecord, LegacyNote, PassportInput, PassportProfile,
    TestimonialRecord,
};

/// Composes passports with a fixed configuration and avatar loader
pub struct PassportComposer {
    config: PassportConfig,
    loader: Box<dyn AvatarLoader>,
}

impl Default for PassportComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl PassportComposer {
    pub fn new() -> Self {
        Self::with_config(PassportConfig::default())
    }

    pub fn with_config(config: PassportConfig) -> Self {
        let loader = DefaultAvatarLoader::new(Duration::from_secs(config.avatar.timeout_secs));
        Self {
            config,
            loader: Box::new(loader),
        }
    }

    /// Replace the avatar loader
    pub fn with_loader(mut self, loader: Box<dyn AvatarLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn config(&self) -> &PassportConfig {
        &self.config
    }

    /// Compose and serialize a passport
    ///
    /// Awaits the avatar first; a failed avatar only removes the image. Any
    /// error returned here means no document was produced.
    pub async fn compose(&self, input: &PassportInput) -> Result<PassportArtifact, ComposeError> {
        self.config.validate()?;
        info!(
            "Composing passport for '{}' ({} imprints, {} testimonials, {} badges, {} challenges)",
            input.profile.display_name(),
            input.imprints.len(),
            input.testimonials.len(),
            input.badges.len(),
            input.challenges.len()
        );

        let avatar = self.load_avatar(&input.profile).await;
        let mut surface = self.layout(input, avatar.as_ref())?;

        let filename = passport_filename(input.profile.display_name());
        let artifact = surface.save(&filename)?;
        info!(
            "Composed {} ({} pages, {} bytes)",
            artifact.filename,
            artifact.page_count,
            artifact.bytes.len()
        );
        Ok(artifact)
    }

    async fn load_avatar(&self, profile: &PassportProfile) -> Option<RasterImage> {
        if !self.config.avatar.enabled {
            return None;
        }
        let reference = profile.avatar()?;
        match avatar::load_avatar(self.loader.as_ref(), reference, self.config.avatar.max_pixels)
            .await
        {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Avatar unavailable, continuing without it: {}", e);
                None
            }
        }
    }

    /// Lay every section out on a fresh surface, footers included
    pub fn layout(
        &self,
        input: &PassportInput,
        avatar: Option<&RasterImage>,
    ) -> Result<PdfSurface, ComposeError> {
        self.config.validate()?;

        let info = DocumentInfo {
            title: format!("Memory Passport - {}", input.profile.display_name()),
            author: self.config.branding.author.clone(),
            creation_date: self.config.branding.show_timestamp.then(Utc::now),
        };
        let mut surface = PdfSurface::new(PAGE_WIDTH_MM, PAGE_HEIGHT_MM, info)?;
        let mut pages = PageManager::from_config(&surface, &self.config);
        let style = SectionStyle::from_config(&self.config);
        let mut report = SectionReport::default();

        report.merge(identity::render(input, avatar, &mut surface, &mut pages, &style));

        pages.force_page_break(&mut surface);
        report.merge(imprints::render(&input.imprints, &mut surface, &mut pages, &style));

        pages.force_page_break(&mut surface);
        report.merge(testimonials::render(
            &input.testimonials,
            &mut surface,
            &mut pages,
            &style,
        ));

        pages.force_page_break(&mut surface);
        report.merge(achievements::render(
            &input.badges,
            &input.challenges,
            &mut surface,
            &mut pages,
            &style,
        ));

        pages.force_page_break(&mut surface);
        report.merge(legacy::render(
            input.legacy.as_ref(),
            input.profile.display_name(),
            &mut surface,
            &mut pages,
            &style,
        ));

        let total = pages.finalize(&mut surface)?;
        if report.skipped > 0 {
            warn!(
                "Passport composed with {} skipped block(s) out of {}",
                report.skipped,
                report.drawn + report.skipped
            );
        }
        info!("Laid out {} pages", total);

        Ok(surface)
    }
}

/// Compose a passport with the default configuration
pub async fn compose_passport_document(
    profile: &PassportProfile,
    imprints: &[ImprintRecord],
    badges: &[BadgeRecord],
    challenges: &[ChallengeRecord],
    testimonials: &[TestimonialRecord],
    legacy: Option<&LegacyNote>,
) -> Result<PassportArtifact, ComposeError> {
    let input = PassportInput {
        profile: profile.clone(),
        imprints: imprints.to_vec(),
        badges: badges.to_vec(),
        challenges: challenges.to_vec(),
        testimonials: testimonials.to_vec(),
        legacy: legacy.cloned(),
    };
    PassportComposer::new().compose(&input).await
}
