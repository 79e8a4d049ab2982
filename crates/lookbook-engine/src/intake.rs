use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use lookbook_contracts::assets::ImageAsset;

/// Reads an uploaded file and labels it with the MIME type sniffed from its
/// bytes. Files that are not a recognised image format are rejected.
pub fn load_image_asset(path: &Path) -> Result<ImageAsset> {
    let bytes = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    asset_from_bytes(bytes).with_context(|| format!("{} is not an image", path.display()))
}

pub fn asset_from_bytes(bytes: Vec<u8>) -> Result<ImageAsset> {
    if bytes.is_empty() {
        bail!("empty file");
    }
    let format = image::guess_format(&bytes).context("unrecognised image format")?;
    Ok(ImageAsset::new(bytes, format.to_mime_type()))
}

/// Pixel dimensions of an encoded asset, if it decodes.
pub fn image_dimensions(asset: &ImageAsset) -> Option<(u32, u32)> {
    image::load_from_memory(asset.bytes())
        .ok()
        .map(|decoded| (decoded.width(), decoded.height()))
}
