use std::sync::Arc;

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, GenericImageView};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

/// Turns an uploaded picture into the encoded form stored on a recipe.
pub trait MediaNormalizer: Send + Sync {
    fn normalize(&self, body: &[u8]) -> anyhow::Result<String>;
}

/// Shrinks to fit a bounding box, flattens to RGB and re-encodes as base64 JPEG.
#[derive(Debug, Clone)]
pub struct JpegNormalizer {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
}

impl Default for JpegNormalizer {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 600,
            quality: 80,
        }
    }
}

impl MediaNormalizer for JpegNormalizer {
    fn normalize(&self, body: &[u8]) -> anyhow::Result<String> {
        let img = image::load_from_memory(body).context("decode image")?;
        let (w, h) = img.dimensions();
        let img = if w > self.max_width || h > self.max_height {
            img.resize(self.max_width, self.max_height, FilterType::Lanczos3)
        } else {
            img
        };

        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        let mut out = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, self.quality))
            .context("encode jpeg")?;

        debug!(from = ?(w, h), to = ?rgb.dimensions(), bytes = out.len(), "image normalized");
        Ok(STANDARD.encode(out))
    }
}

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

pub(crate) fn is_image_mime(ct: &str) -> bool {
    ct.starts_with("image/")
}

/// Normalize an upload off the async runtime. Non-image uploads are ignored.
pub async fn normalize_upload(
    media: Arc<dyn MediaNormalizer>,
    item: UploadItem,
) -> AppResult<Option<String>> {
    if !is_image_mime(&item.content_type) {
        warn!(content_type = %item.content_type, "ignoring non-image upload");
        return Ok(None);
    }
    let encoded = tokio::task::spawn_blocking(move || media.normalize(&item.body))
        .await
        .context("image worker")?
        .map_err(|e| AppError::Validation(format!("Could not process image: {e}")))?;
    Ok(Some(encoded))
}
