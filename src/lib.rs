//! Memory Passport - composes a member's history into a printable PDF
//!
//! Provides:
//! - Read-only passport data models (profile, imprints, testimonials, badges, challenges, legacy)
//! - Layout configuration with TOML files and environment overrides
//! - The paginated document composer and its PDF serializer

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod models;
pub mod passport;

pub use config::{ConfigError, PassportConfig};
pub use passport::{
    AvatarLoader, ComposeError, DefaultAvatarLoader, ImageLoadError, LayoutError,
    PassportArtifact, PassportComposer, compose_passport_document, passport_filename,
};

// Re-export models
pub use models::{
    BadgeRecord, BadgeStanding, ChallengeRecord, ImprintRecord, InputError, LegacyNote,
    PassportInput, PassportProfile, PrivacyLevel, TestimonialDirection, TestimonialRecord,
};
