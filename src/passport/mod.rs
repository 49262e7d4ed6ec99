//! Passport document composer
//!
//! Lays a passport holder's history out over fixed A4 pages and serializes
//! the result to PDF:
//!
//! - [`surface`]: millimeter, top-left-origin drawing primitives recorded per page
//! - [`page`]: the page cursor, page breaks and deferred footer stamping
//! - [`primitives`]: cards, progress bars, glyph stamps and paragraphs
//! - [`sections`]: one renderer per passport section
//! - [`assembler`]: fixed section order and the public entry points
//!
//! Per-record problems ([`LayoutError`], [`ImageLoadError`]) are logged and the
//! record is skipped or degraded. Only [`ComposeError`] aborts a composition.

pub mod assembler;
pub mod avatar;
pub mod filename;
pub mod metrics;
pub mod page;
pub mod pdf;
pub mod primitives;
pub mod sections;
pub mod surface;

use base64::Engine;
use std::path::{Path, PathBuf};

pub use assembler::{PassportComposer, compose_passport_document};
pub use avatar::{AvatarLoader, DefaultAvatarLoader, decode_avatar};
pub use filename::passport_filename;
pub use page::{Margins, PageCursor, PageManager, PageState, Placement};
pub use surface::{DrawOp, DrawingSurface, Layer, PdfSurface, RasterImage};

/// Fatal error: no artifact is produced
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Drawing surface error: {0}")]
    SurfaceError(String),
    #[error("Layout error: {0}")]
    Layout(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<crate::config::ConfigError> for ComposeError {
    fn from(err: crate::config::ConfigError) -> Self {
        ComposeError::InvalidConfig(err.to_string())
    }
}

/// Recoverable layout problem with a single block
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("Text cannot be measured: {0}")]
    Unmeasurable(String),
    #[error("Block of {height:.1} mm exceeds the {available:.1} mm usable page height")]
    BlockTooTall { height: f64, available: f64 },
}

/// Recoverable avatar failure; the identity page is drawn without the image
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImageLoadError {
    #[error("Empty image reference")]
    EmptyReference,
    #[error("Failed to fetch image: {0}")]
    Fetch(String),
    #[error("Timed out fetching image after {0}s")]
    Timeout(u64),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Invalid image placement: {0}")]
    InvalidPlacement(String),
}

/// Result of a successful composition
#[derive(Debug, Clone)]
#[must_use = "the artifact holds the only copy of the generated document"]
pub struct PassportArtifact {
    /// Suggested download name, e.g. `ada_lovelace_passport.pdf`
    pub filename: String,
    /// Serialized PDF
    pub bytes: Vec<u8>,
    /// Number of pages in the document
    pub page_count: usize,
    /// Document title
    pub title: String,
}

impl PassportArtifact {
    /// PDF content as base64, for transports that only carry text
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// Write the document into `dir` under its filename
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ComposeError> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes).map_err(|e| {
            ComposeError::IoError(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(path)
    }
}
