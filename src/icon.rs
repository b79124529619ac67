//! App icon thumbnails.
//!
//! `IconRenderer` is the capability the gateway depends on: turn a package
//! name into a fixed-size PNG. `PngIconRenderer` implements it on top of any
//! `IconSource`, so the gateway never touches platform graphics directly.

use crate::config::GatewayConfig;
use crate::constants::PNG_DATA_URI_PREFIX;
use crate::error::IconError;
use crate::platform::{IconSource, RgbaIcon};
use base64::Engine as _;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{ColorType, ImageEncoder, RgbaImage};
use std::sync::Arc;

/// Rasterize a package's icon to a fixed-size encoded thumbnail.
pub trait IconRenderer: Send + Sync {
    fn render_png(&self, package_name: &str) -> Result<Vec<u8>, IconError>;
}

pub struct PngIconRenderer<S> {
    source: Arc<S>,
    size_px: u32,
    compression: CompressionType,
}

impl<S: IconSource> PngIconRenderer<S> {
    pub fn new(source: Arc<S>, config: &GatewayConfig) -> Self {
        Self {
            source,
            size_px: config.icon_size_px,
            compression: compression_for_quality(config.icon_quality),
        }
    }
}

impl<S: IconSource> IconRenderer for PngIconRenderer<S> {
    fn render_png(&self, package_name: &str) -> Result<Vec<u8>, IconError> {
        let icon = self.source.application_icon(package_name, self.size_px)?;
        let thumbnail = fit_to_square(icon, self.size_px)?;
        encode_png(&thumbnail, self.compression)
    }
}

/// Wrap PNG bytes as a `data:` URI.
pub fn png_data_uri(png: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    format!("{PNG_DATA_URI_PREFIX}{encoded}")
}

/// PNG is lossless; the quality hint only picks compression effort.
fn compression_for_quality(quality: u8) -> CompressionType {
    match quality {
        0..=33 => CompressionType::Fast,
        34..=89 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn fit_to_square(icon: RgbaIcon, size_px: u32) -> Result<RgbaImage, IconError> {
    let RgbaIcon { width, height, pixels } = icon;
    let expected = u64::from(width) * u64::from(height) * 4;
    if width == 0 || height == 0 || u64::try_from(pixels.len()).ok() != Some(expected) {
        return Err(IconError::BufferSize {
            width,
            height,
            expected: usize::try_from(expected).unwrap_or(usize::MAX),
            actual: pixels.len(),
        });
    }

    let image = RgbaImage::from_raw(width, height, pixels).ok_or(IconError::BufferSize {
        width,
        height,
        expected: usize::try_from(expected).unwrap_or(usize::MAX),
        actual: 0,
    })?;

    if width == size_px && height == size_px {
        Ok(image)
    } else {
        Ok(imageops::resize(&image, size_px, size_px, FilterType::Lanczos3))
    }
}

fn encode_png(image: &RgbaImage, compression: CompressionType) -> Result<Vec<u8>, IconError> {
    let mut buffer = Vec::new();
    PngEncoder::new_with_quality(&mut buffer, compression, PngFilter::Adaptive).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    Ok(buffer)
}
