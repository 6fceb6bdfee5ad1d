use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::ImageReader;
use log::{debug, info};
use rayon::prelude::*;

use super::SourceImage;
use crate::error::TrimpackError;

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tga"];

/// Image path with its base directory for computing sprite names
struct ImagePath {
    path: PathBuf,
    base: Option<PathBuf>,
}

/// Load source images from input paths (files or directories).
///
/// Directories are walked recursively in sorted order so repeated runs hand
/// the builder the same list. Decoding runs in parallel but the returned
/// list keeps input order, which decides last-write-wins for duplicate names.
pub fn load_images(inputs: &[impl AsRef<Path>]) -> Result<Vec<SourceImage>> {
    let image_paths = collect_image_paths(inputs)?;

    if image_paths.is_empty() {
        return Err(TrimpackError::NoImages.into());
    }

    info!("Loading {} images...", image_paths.len());

    image_paths
        .par_iter()
        .map(|img_path| load_single_image(&img_path.path, img_path.base.as_deref()))
        .collect()
}

fn collect_image_paths(inputs: &[impl AsRef<Path>]) -> Result<Vec<ImagePath>> {
    let mut paths = Vec::new();

    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(TrimpackError::InputNotFound(path.to_path_buf()).into());
        }

        if path.is_file() {
            if is_supported_image(path) {
                paths.push(ImagePath {
                    path: path.to_path_buf(),
                    base: None,
                });
            } else {
                debug!("Skipping unsupported file {}", path.display());
            }
        } else if path.is_dir() {
            collect_from_directory(path, path, &mut paths)?;
        }
    }

    Ok(paths)
}

fn collect_from_directory(base: &Path, dir: &Path, paths: &mut Vec<ImagePath>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        if path.is_file() && is_supported_image(&path) {
            paths.push(ImagePath {
                path,
                base: Some(base.to_path_buf()),
            });
        } else if path.is_dir() {
            collect_from_directory(base, &path, paths)?;
        }
    }

    Ok(())
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Sprite name for an image file: the path relative to `base` without its
/// extension, using `/` separators, or the bare file stem when there is no base.
pub fn sprite_name(path: &Path, base: Option<&Path>) -> String {
    let relative = base
        .and_then(|base_dir| path.strip_prefix(base_dir).ok())
        .unwrap_or_else(|| Path::new(path.file_name().unwrap_or(path.as_os_str())));

    let stem = relative.with_extension("");
    stem.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn load_single_image(path: &Path, base: Option<&Path>) -> Result<SourceImage> {
    let image = ImageReader::open(path)
        .map_err(|e| TrimpackError::ImageLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })?
        .decode()
        .map_err(|e| TrimpackError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?
        .into_rgba8();

    Ok(SourceImage::new(sprite_name(path, base), image))
}
