use std::thread;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use lookbook_contracts::assets::ImageAsset;
use tracing::{debug, warn};

pub const JPEG_QUALITY: u8 = 80;
pub const RESIZED_MIME: &str = "image/jpeg";

/// Target size for a `width`x`height` source bounded by `max_dimension`.
///
/// The longer side becomes `max_dimension` and the shorter one is rounded to
/// the nearest pixel. Square sources take the height branch.
pub fn scaled_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }
    let max = f64::from(max_dimension);
    if width > height {
        let scaled = (f64::from(height) * max / f64::from(width)).round() as u32;
        (max_dimension, scaled.max(1))
    } else {
        let scaled = (f64::from(width) * max / f64::from(height)).round() as u32;
        (scaled.max(1), max_dimension)
    }
}

/// Downscales and re-encodes as JPEG. Never fails: an asset that cannot be
/// decoded or encoded comes back unchanged.
pub fn resize_asset(asset: ImageAsset, max_dimension: u32) -> ImageAsset {
    match try_resize(&asset, max_dimension) {
        Ok(resized) => resized,
        Err(err) => {
            warn!(
                mime_type = asset.mime_type(),
                bytes = asset.len(),
                "resize skipped, sending original image: {err:#}"
            );
            asset
        }
    }
}

/// Resizes both inputs on scoped threads and joins them before returning.
pub fn resize_pair(
    first: ImageAsset,
    second: ImageAsset,
    max_dimension: u32,
) -> (ImageAsset, ImageAsset) {
    thread::scope(|scope| {
        let handle = scope.spawn(move || resize_asset(second, max_dimension));
        let first = resize_asset(first, max_dimension);
        let second = match handle.join() {
            Ok(resized) => resized,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        (first, second)
    })
}

fn try_resize(asset: &ImageAsset, max_dimension: u32) -> Result<ImageAsset> {
    let decoded = image::load_from_memory(asset.bytes()).context("image decode failed")?;
    let (source_width, source_height) = (decoded.width(), decoded.height());
    let (width, height) = scaled_dimensions(source_width, source_height, max_dimension);

    let flattened = flatten_onto_white(&decoded);
    let resized = if (width, height) == (source_width, source_height) {
        flattened
    } else {
        DynamicImage::ImageRgb8(flattened)
            .resize_exact(width, height, FilterType::Triangle)
            .to_rgb8()
    };

    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    encoder
        .encode_image(&resized)
        .context("jpeg encode failed")?;

    debug!(
        source_width,
        source_height,
        width,
        height,
        bytes_in = asset.len(),
        bytes_out = bytes.len(),
        "image resized"
    );
    Ok(ImageAsset::new(bytes, RESIZED_MIME))
}

/// JPEG has no alpha channel; blend transparent pixels against white.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut flattened = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = u16::from(pixel[3]);
        let blend = |channel: u8| -> u8 {
            (((u16::from(channel) * alpha) + (255 * (255 - alpha))) / 255) as u8
        };
        flattened.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }
    flattened
}
