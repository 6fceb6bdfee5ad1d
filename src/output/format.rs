use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::Result;
use image::{DynamicImage, ImageFormat, RgbImage};
use log::debug;

use crate::atlas::Atlas;
use crate::cli::CompressionLevel;
use crate::error::TrimpackError;

/// Save atlas image as PNG, optionally with compression
pub fn save_atlas_image(
    atlas: &Atlas,
    path: &Path,
    opaque: bool,
    compress: Option<CompressionLevel>,
) -> Result<()> {
    let png_data = encode_png(atlas, opaque).map_err(|e| TrimpackError::ImageSave {
        path: path.to_path_buf(),
        source: e,
    })?;

    let output_data = if let Some(level) = compress {
        let opts = match level {
            CompressionLevel::Level(n) => oxipng::Options::from_preset(n),
            CompressionLevel::Max => oxipng::Options::max_compression(),
        };
        let compressed = oxipng::optimize_from_memory(&png_data, &opts).map_err(|e| {
            TrimpackError::PngCompress {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        debug!(
            "Compressed {} from {} to {} bytes",
            path.display(),
            png_data.len(),
            compressed.len()
        );
        compressed
    } else {
        png_data
    };

    fs::write(path, output_data).map_err(|e| TrimpackError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Remove an atlas image left over from an earlier build, if any
pub fn remove_atlas_image(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).map_err(|e| TrimpackError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(true)
}

fn encode_png(atlas: &Atlas, opaque: bool) -> Result<Vec<u8>, image::ImageError> {
    let mut png_data = Cursor::new(Vec::new());
    if opaque {
        let rgb: RgbImage = DynamicImage::ImageRgba8(atlas.image.clone()).into_rgb8();
        rgb.write_to(&mut png_data, ImageFormat::Png)?;
    } else {
        atlas.image.write_to(&mut png_data, ImageFormat::Png)?;
    }
    Ok(png_data.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn small_atlas() -> Atlas {
        let mut atlas = Atlas::new(4, 2);
        atlas.image.put_pixel(1, 1, Rgba([10, 20, 30, 128]));
        atlas
    }

    #[test]
    fn test_encode_rgba_keeps_alpha() {
        let bytes = encode_png(&small_atlas(), false).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().into_rgba8();

        assert_eq!(decoded.dimensions(), (4, 2));
        assert_eq!(*decoded.get_pixel(1, 1), Rgba([10, 20, 30, 128]));
    }

    #[test]
    fn test_encode_opaque_drops_alpha() {
        let bytes = encode_png(&small_atlas(), true).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();

        assert!(!decoded.color().has_alpha());
    }
}
