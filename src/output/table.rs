use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::atlas::{Atlas, SpriteRecord, SpriteTable};
use crate::error::TrimpackError;

#[derive(Serialize, Deserialize)]
struct TableFile {
    meta: Meta,
    /// Atlas image file name, absent when the atlas was cleared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    size: Size,
    sprites: Vec<SpriteRecord>,
}

#[derive(Serialize, Deserialize)]
struct Meta {
    app: String,
    version: String,
    coordinates: String,
}

#[derive(Serialize, Deserialize, Default)]
struct Size {
    w: u32,
    h: u32,
}

/// Write the sprite table next to its atlas image.
///
/// `atlas` is `None` for a cleared build, which writes an empty table.
pub fn write_sprite_table(
    sprites: &SpriteTable,
    atlas: Option<&Atlas>,
    output_dir: &Path,
    base_name: &str,
) -> Result<()> {
    let file = TableFile {
        meta: Meta {
            app: "trimpack".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            coordinates: "pixels".to_string(),
        },
        image: atlas.map(|_| format!("{}.png", base_name)),
        size: atlas
            .map(|a| Size {
                w: a.width,
                h: a.height,
            })
            .unwrap_or_default(),
        sprites: sprites.values().cloned().collect(),
    };

    let json_path = table_path(output_dir, base_name);
    let content = serde_json::to_string_pretty(&file)?;

    fs::write(&json_path, content).map_err(|e| TrimpackError::OutputWrite {
        path: json_path,
        source: e,
    })?;

    Ok(())
}

/// Read the sprite table written by an earlier build.
///
/// A missing file is an empty table; a malformed one is an error so a
/// hand-edited table is never silently discarded.
pub fn read_sprite_table(output_dir: &Path, base_name: &str) -> Result<SpriteTable> {
    let json_path = table_path(output_dir, base_name);
    if !json_path.exists() {
        return Ok(SpriteTable::new());
    }

    let content = fs::read_to_string(&json_path)
        .with_context(|| format!("failed to read sprite table: {}", json_path.display()))?;
    let file: TableFile =
        serde_json::from_str(&content).map_err(|e| TrimpackError::SpriteTable {
            path: json_path.clone(),
            source: e,
        })?;

    debug!(
        "Read {} prior sprites from {}",
        file.sprites.len(),
        json_path.display()
    );

    Ok(file
        .sprites
        .into_iter()
        .map(|sprite| (sprite.name.clone(), sprite))
        .collect())
}

fn table_path(output_dir: &Path, base_name: &str) -> std::path::PathBuf {
    output_dir.join(format!("{}.json", base_name))
}
