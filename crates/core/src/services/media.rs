//! Image storage and resized WebP variants.
//!
//! Every saved image gets `<root>_w<width>.webp` siblings for responsive
//! `srcset`s. Variant generation is best-effort: failures are logged and never
//! fail the save that triggered them.

use std::io::Cursor;

use aerodict_common::storage::{file_name, sanitize_file_name, split_extension, variant_key};
use aerodict_common::{AppError, AppResult, IdGenerator, StorageService, UploadedFile};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, warn};

/// Variant widths for term images.
pub const TERM_IMAGE_WIDTHS: [u32; 3] = [320, 640, 1280];

/// Variant widths for suggestion draft images.
pub const SUGGESTION_IMAGE_WIDTHS: [u32; 2] = [320, 640];

/// An uploaded image waiting to be stored.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Decode `data` and encode one WebP per width the original is large enough
/// for. An original smaller than a width in both dimensions yields no variant
/// for that width.
pub fn render_variants(data: &[u8], widths: &[u32]) -> AppResult<Vec<(u32, Vec<u8>)>> {
    let original = image::load_from_memory(data)
        .map_err(|e| AppError::BadRequest(format!("Unreadable image: {e}")))?;
    let rgb = DynamicImage::ImageRgb8(original.to_rgb8());
    let (width, height) = rgb.dimensions();

    let mut variants = Vec::new();
    for &target in widths {
        if width < target && height < target {
            continue;
        }

        let target_height = ((f64::from(height) * f64::from(target) / f64::from(width)) as u32).max(1);
        let resized = rgb.resize_exact(target, target_height, FilterType::Lanczos3);

        let mut buffer = Cursor::new(Vec::new());
        resized
            .write_with_encoder(WebPEncoder::new_lossless(&mut buffer))
            .map_err(|e| AppError::Internal(format!("WebP encoding failed: {e}")))?;
        variants.push((target, buffer.into_inner()));
    }

    Ok(variants)
}

/// Image storage with variant generation.
#[derive(Clone)]
pub struct MediaService {
    storage: StorageService,
    id_gen: IdGenerator,
}

impl MediaService {
    /// Create a new media service.
    #[must_use]
    pub const fn new(storage: StorageService) -> Self {
        Self {
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Underlying storage backend.
    #[must_use]
    pub const fn storage(&self) -> &StorageService {
        &self.storage
    }

    /// Public URL of a stored key.
    #[must_use]
    pub fn url(&self, key: &str) -> String {
        self.storage.public_url(key)
    }

    /// Whether a stored key exists.
    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        self.storage.exists(key).await
    }

    /// Store an image under `dir` and generate its variants.
    ///
    /// An existing file with the same name is never overwritten; a short
    /// unique suffix is appended instead.
    pub async fn save_image(
        &self,
        dir: &str,
        upload: &ImageUpload,
        widths: &[u32],
    ) -> AppResult<UploadedFile> {
        let key = self.free_key(dir, &sanitize_file_name(&upload.file_name)).await?;
        let stored = self
            .storage
            .upload(&key, &upload.data, &upload.content_type)
            .await?;

        if !widths.is_empty() {
            self.generate_variants(&stored.key, widths).await;
        }
        Ok(stored)
    }

    /// Copy a stored image to `dir`, generate variants for the copy, and
    /// return the new key.
    pub async fn copy_image(&self, source_key: &str, dir: &str, widths: &[u32]) -> AppResult<String> {
        let data = self.storage.read(source_key).await?;
        let key = self.free_key(dir, file_name(source_key)).await?;
        let content_type = content_type_for(&key);
        self.storage.upload(&key, &data, content_type).await?;

        self.generate_variants(&key, widths).await;
        Ok(key)
    }

    /// Delete an image and any variants next to it.
    pub async fn delete_image(&self, key: &str) -> AppResult<()> {
        for width in TERM_IMAGE_WIDTHS {
            let variant = variant_key(key, width);
            if self.storage.exists(&variant).await? {
                self.storage.delete(&variant).await?;
            }
        }
        self.storage.delete(key).await
    }

    /// Write missing variants of `key`. Returns how many were written;
    /// failures are logged at warn level and count as zero.
    pub async fn generate_variants(&self, key: &str, widths: &[u32]) -> usize {
        match self.try_generate_variants(key, widths).await {
            Ok(written) => {
                debug!(key, written, "Generated image variants");
                written
            }
            Err(e) => {
                warn!(key, error = %e, "Image variant generation failed");
                0
            }
        }
    }

    async fn try_generate_variants(&self, key: &str, widths: &[u32]) -> AppResult<usize> {
        let data = self.storage.read(key).await?;
        let owned_widths = widths.to_vec();
        let variants = tokio::task::spawn_blocking(move || render_variants(&data, &owned_widths))
            .await
            .map_err(|e| AppError::Internal(format!("Variant task failed: {e}")))??;

        let mut written = 0;
        for (width, bytes) in variants {
            let variant = variant_key(key, width);
            if self.storage.exists(&variant).await? {
                continue;
            }
            self.storage.upload(&variant, &bytes, "image/webp").await?;
            written += 1;
        }
        Ok(written)
    }

    /// `srcset` value listing the variants that exist for `key`,
    /// e.g. `"/media/a_w320.webp 320w, /media/a_w640.webp 640w"`.
    pub async fn srcset(&self, key: &str, widths: &[u32]) -> String {
        let mut parts = Vec::new();
        for &width in widths {
            let variant = variant_key(key, width);
            match self.storage.exists(&variant).await {
                Ok(true) => parts.push(format!("{} {width}w", self.storage.public_url(&variant))),
                Ok(false) => {}
                Err(e) => debug!(key = %variant, error = %e, "Skipping variant in srcset"),
            }
        }
        parts.join(", ")
    }

    async fn free_key(&self, dir: &str, name: &str) -> AppResult<String> {
        let dir = dir.trim_matches('/');
        let candidate = format!("{dir}/{name}");
        if !self.storage.exists(&candidate).await? {
            return Ok(candidate);
        }

        let (root, ext) = split_extension(name);
        let suffix: String = self.id_gen.generate().chars().rev().take(7).collect();
        Ok(if ext.is_empty() {
            format!("{dir}/{root}_{suffix}")
        } else {
            format!("{dir}/{root}_{suffix}.{ext}")
        })
    }
}

/// Guess a content type from a key's extension.
#[must_use]
pub fn content_type_for(key: &str) -> &'static str {
    match split_extension(key).1.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use aerodict_common::MemoryStorage;
    use image::{ImageFormat, RgbImage};
    use std::sync::Arc;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, image::Rgb([14, 118, 230]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_small_original_yields_no_variants() {
        let variants = render_variants(&png(100, 80), &TERM_IMAGE_WIDTHS).unwrap();
        assert!(variants.is_empty());
    }

    #[test]
    fn test_variant_preserves_aspect_ratio() {
        let variants = render_variants(&png(700, 350), &TERM_IMAGE_WIDTHS).unwrap();
        let widths: Vec<u32> = variants.iter().map(|(w, _)| *w).collect();
        assert_eq!(widths, vec![320, 640]);

        let decoded = image::load_from_memory(&variants[0].1).unwrap();
        assert_eq!(decoded.dimensions(), (320, 160));
    }

    #[test]
    fn test_tall_narrow_original_is_upscaled_to_width() {
        // Narrower than 320 but taller, so the 320 variant is still produced
        let variants = render_variants(&png(200, 400), &SUGGESTION_IMAGE_WIDTHS).unwrap();
        assert_eq!(variants.len(), 1);
        let decoded = image::load_from_memory(&variants[0].1).unwrap();
        assert_eq!(decoded.dimensions(), (320, 640));
    }

    #[test]
    fn test_render_rejects_garbage() {
        assert!(render_variants(b"not an image", &TERM_IMAGE_WIDTHS).is_err());
    }

    #[tokio::test]
    async fn test_save_image_writes_variants_and_srcset() {
        let storage = Arc::new(MemoryStorage::new("/media"));
        let media = MediaService::new(storage.clone());

        let upload = ImageUpload {
            file_name: "cockpit.png".to_string(),
            content_type: "image/png".to_string(),
            data: png(400, 300),
        };
        let stored = media
            .save_image("terms/apu", &upload, &TERM_IMAGE_WIDTHS)
            .await
            .unwrap();

        assert_eq!(stored.key, "terms/apu/cockpit.png");
        assert_eq!(
            storage.keys().await,
            vec!["terms/apu/cockpit.png", "terms/apu/cockpit_w320.webp"]
        );
        assert_eq!(
            media.srcset(&stored.key, &TERM_IMAGE_WIDTHS).await,
            "/media/terms/apu/cockpit_w320.webp 320w"
        );
    }

    #[tokio::test]
    async fn test_generate_variants_swallows_errors() {
        let storage = Arc::new(MemoryStorage::new("/media"));
        let media = MediaService::new(storage);
        assert_eq!(media.generate_variants("missing.png", &TERM_IMAGE_WIDTHS).await, 0);
    }

    #[tokio::test]
    async fn test_save_image_never_overwrites() {
        let storage = Arc::new(MemoryStorage::new("/media"));
        let media = MediaService::new(storage.clone());
        let upload = ImageUpload {
            file_name: "a.png".to_string(),
            content_type: "image/png".to_string(),
            data: png(10, 10),
        };

        let first = media.save_image("terms/x", &upload, &[]).await.unwrap();
        let second = media.save_image("terms/x", &upload, &[]).await.unwrap();
        assert_ne!(first.key, second.key);
        assert!(second.key.starts_with("terms/x/a_"));
        assert!(second.key.ends_with(".png"));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a/b.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a/b"), "application/octet-stream");
    }
}
