//! Avatar loading
//!
//! The avatar is the only input the composer fetches itself. References may be
//! `data:` URIs, `http(s)` URLs (feature `http-avatar`) or local paths. Every
//! failure is an [`ImageLoadError`]; the caller degrades to a page without an
//! image.
//!
//! The timeout bounds remote fetches only. Local paths are read synchronously;
//! every source is capped at the loader's byte limit.

use async_trait::async_trait;
use base64::Engine;
use image::GenericImageView;
use image::imageops::FilterType;
use std::io::Read;
use std::time::Duration;
use tracing::debug;

use super::ImageLoadError;
use super::surface::RasterImage;

/// Source of raw avatar bytes
#[async_trait]
pub trait AvatarLoader: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, ImageLoadError>;
}

/// Largest avatar payload accepted from any source
pub const DEFAULT_MAX_AVATAR_BYTES: u64 = 10 * 1024 * 1024;

/// Loader for data URIs, http(s) URLs and file paths
#[derive(Debug, Clone)]
pub struct DefaultAvatarLoader {
    timeout: Duration,
    max_bytes: u64,
}

impl Default for DefaultAvatarLoader {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl DefaultAvatarLoader {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            max_bytes: DEFAULT_MAX_AVATAR_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Applies to http(s) fetches only
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    fn too_large(&self, source: &str, len: u64) -> ImageLoadError {
        ImageLoadError::Fetch(format!(
            "{} is {} bytes; avatars are limited to {} bytes",
            source, len, self.max_bytes
        ))
    }

    fn read_local(&self, path: &str) -> Result<Vec<u8>, ImageLoadError> {
        let read_error = |e: std::io::Error| {
            ImageLoadError::Fetch(format!("Failed to read {}: {}", path, e))
        };
        let file = std::fs::File::open(path).map_err(read_error)?;
        let declared = file.metadata().map_err(read_error)?.len();
        if declared > self.max_bytes {
            return Err(self.too_large(path, declared));
        }

        // Length may be unknown (pipes, device files), so cap the read itself
        let mut bytes = Vec::new();
        file.take(self.max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(read_error)?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(self.too_large(path, bytes.len() as u64));
        }
        Ok(bytes)
    }

    #[cfg(feature = "http-avatar")]
    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, ImageLoadError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ImageLoadError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        let response = client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.map_http_error(e))?;

        if let Some(declared) = response.content_length()
            && declared > self.max_bytes
        {
            return Err(self.too_large(url, declared));
        }
        let bytes = response.bytes().await.map_err(|e| self.map_http_error(e))?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(self.too_large(url, bytes.len() as u64));
        }
        Ok(bytes.to_vec())
    }

    #[cfg(feature = "http-avatar")]
    fn map_http_error(&self, e: reqwest::Error) -> ImageLoadError {
        if e.is_timeout() {
            ImageLoadError::Timeout(self.timeout.as_secs())
        } else {
            ImageLoadError::Fetch(e.to_string())
        }
    }

    #[cfg(not(feature = "http-avatar"))]
    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, ImageLoadError> {
        Err(ImageLoadError::UnsupportedFormat(format!(
            "remote avatars are disabled in this build: {}",
            url
        )))
    }
}

#[async_trait]
impl AvatarLoader for DefaultAvatarLoader {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, ImageLoadError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ImageLoadError::EmptyReference);
        }

        if reference.starts_with("data:") {
            let bytes = decode_data_uri(reference)?;
            if bytes.len() as u64 > self.max_bytes {
                return Err(self.too_large("data URI", bytes.len() as u64));
            }
            return Ok(bytes);
        }

        if reference.starts_with("http://") || reference.starts_with("https://") {
            debug!("Fetching avatar from {}", reference);
            return self.fetch_remote(reference).await;
        }

        let path = reference.strip_prefix("file://").unwrap_or(reference);
        self.read_local(path)
    }
}

/// Bytes of a base64 `data:` URI
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ImageLoadError> {
    let (meta, data) = uri
        .split_once(',')
        .ok_or_else(|| ImageLoadError::Decode("data URI without payload".to_string()))?;
    if !meta.starts_with("data:image/") {
        return Err(ImageLoadError::UnsupportedFormat(format!(
            "not an image data URI: {}",
            meta
        )));
    }
    if !meta.ends_with(";base64") {
        return Err(ImageLoadError::UnsupportedFormat(
            "only base64 data URIs are supported".to_string(),
        ));
    }
    let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| ImageLoadError::Decode(format!("Invalid base64 payload: {}", e)))
}

/// Decode, center-crop to a square and downscale to at most `max_pixels` per side
pub fn decode_avatar(bytes: &[u8], max_pixels: u32) -> Result<RasterImage, ImageLoadError> {
    let img = image::load_from_memory(bytes).map_err(|e| match e {
        image::ImageError::Unsupported(_) => ImageLoadError::UnsupportedFormat(e.to_string()),
        _ => ImageLoadError::Decode(e.to_string()),
    })?;

    let (width, height) = img.dimensions();
    let side = width.min(height);
    if side == 0 {
        return Err(ImageLoadError::Decode("image has no pixels".to_string()));
    }
    let mut square = img.crop_imm((width - side) / 2, (height - side) / 2, side, side);

    let target = side.min(max_pixels.max(1));
    if target < side {
        square = square.resize_exact(target, target, FilterType::Triangle);
    }

    let rgb = square.to_rgb8();
    RasterImage::from_rgb8(rgb.width(), rgb.height(), rgb.as_raw())
}

/// Fetch and decode in one step
pub async fn load_avatar(
    loader: &dyn AvatarLoader,
    reference: &str,
    max_pixels: u32,
) -> Result<RasterImage, ImageLoadError> {
    let bytes = loader.fetch(reference).await?;
    decode_avatar(&bytes, max_pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, RgbImage};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let buffer = RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(buffer)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    fn data_uri(bytes: &[u8]) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )
    }

    #[test]
    fn test_decode_avatar_crops_to_square() {
        let image = decode_avatar(&png(8, 4), 256).unwrap();
        assert_eq!((image.width_px(), image.height_px()), (4, 4));
    }

    #[test]
    fn test_decode_avatar_downscales() {
        let image = decode_avatar(&png(20, 20), 5).unwrap();
        assert_eq!((image.width_px(), image.height_px()), (5, 5));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_avatar(b"definitely not an image", 64).is_err());
    }

    #[test]
    fn test_data_uri_rules() {
        let bytes = png(2, 2);
        assert_eq!(decode_data_uri(&data_uri(&bytes)).unwrap(), bytes);
        assert!(matches!(
            decode_data_uri("data:text/plain;base64,aGk="),
            Err(ImageLoadError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            decode_data_uri("data:image/svg+xml,<svg/>"),
            Err(ImageLoadError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            decode_data_uri("data:image/png;base64"),
            Err(ImageLoadError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_default_loader_sources() {
        let loader = DefaultAvatarLoader::default();
        let bytes = png(3, 3);

        assert_eq!(loader.fetch(&data_uri(&bytes)).await.unwrap(), bytes);

        let dir = tempdir().unwrap();
        let path = dir.path().join("avatar.png");
        std::fs::write(&path, &bytes).unwrap();
        let from_file = loader.fetch(path.to_str().unwrap()).await.unwrap();
        assert_eq!(from_file, bytes);

        assert_eq!(
            loader.fetch("  ").await.unwrap_err(),
            ImageLoadError::EmptyReference
        );
        assert!(matches!(
            loader.fetch("/no/such/avatar.png").await,
            Err(ImageLoadError::Fetch(_))
        ));
    }

    #[tokio::test]
    async fn test_loader_rejects_oversized_avatar() {
        let bytes = png(16, 16);
        let limit = bytes.len() as u64 - 1;
        let loader = DefaultAvatarLoader::default().with_max_bytes(limit);
        assert_eq!(loader.max_bytes(), limit);

        let dir = tempdir().unwrap();
        let path = dir.path().join("large.png");
        std::fs::write(&path, &bytes).unwrap();
        let err = loader.fetch(path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(&err, ImageLoadError::Fetch(msg) if msg.contains("limited to")));

        assert!(matches!(
            loader.fetch(&data_uri(&bytes)).await,
            Err(ImageLoadError::Fetch(_))
        ));

        // Exactly at the limit is accepted
        let loader = loader.with_max_bytes(bytes.len() as u64);
        let url = format!("file://{}", path.display());
        assert_eq!(loader.fetch(&url).await.unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_load_avatar() {
        let loader = DefaultAvatarLoader::default();
        let image = load_avatar(&loader, &data_uri(&png(6, 9)), 256).await.unwrap();
        assert_eq!(image.width_px(), 6);
    }
}
