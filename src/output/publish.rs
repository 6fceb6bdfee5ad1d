use std::path::Path;

use anyhow::Result;
use log::info;

use super::{remove_atlas_image, save_atlas_image, write_sprite_table};
use crate::atlas::BuildOutput;
use crate::cli::CompressionLevel;

/// Write a build's atlas image and sprite table into `output_dir`.
///
/// A cleared build deletes any `<base_name>.png` left by an earlier build and
/// writes an empty table, so the directory never pairs a stale image with
/// the new table.
pub fn publish_build(
    output: &BuildOutput,
    output_dir: &Path,
    base_name: &str,
    opaque: bool,
    compress: Option<CompressionLevel>,
) -> Result<()> {
    let image_path = output_dir.join(format!("{}.png", base_name));

    match &output.atlas {
        Some(atlas) => {
            save_atlas_image(atlas, &image_path, opaque, compress)?;
            info!("Saved {}", image_path.display());
        }
        None => {
            if remove_atlas_image(&image_path)? {
                info!("Removed stale {}", image_path.display());
            }
        }
    }

    write_sprite_table(&output.sprites, output.atlas.as_ref(), output_dir, base_name)?;
    info!("Generated {}.json", base_name);

    Ok(())
}
