use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use super::types::TrimpackConfig;

/// Write a project file as pretty-printed JSON.
pub fn save_config(config: &TrimpackConfig, path: &Path) -> Result<()> {
    let content =
        serde_json::to_string_pretty(config).context("failed to serialize project file")?;

    std::fs::write(path, content)
        .with_context(|| format!("failed to write project file: {}", path.display()))?;

    debug!("Saved project file {}", path.display());
    Ok(())
}

/// Express an input (a path or glob pattern given relative to the working
/// directory) relative to the directory of the project file at `config_path`,
/// which is how `LoadedConfig::resolve_inputs` reads it back.
///
/// Inputs outside the project directory get `..` steps; inputs that share no
/// root with it (another drive on Windows) are stored absolute.
pub fn relative_input(input: &Path, config_path: &Path) -> Result<String> {
    let config_dir = match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let input = absolute(input)?;
    let base = absolute(config_dir)?;

    let relative = diff_paths(&input, &base).unwrap_or(input);
    let relative = if relative.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        relative
    };

    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("failed to resolve path: {}", path.display()))
}

/// `path` relative to `base`, both absolute. `None` when they have different roots.
fn diff_paths(path: &Path, base: &Path) -> Option<PathBuf> {
    let path: Vec<_> = path.components().filter(|c| *c != Component::CurDir).collect();
    let base: Vec<_> = base.components().filter(|c| *c != Component::CurDir).collect();

    if path.first() != base.first() {
        return None;
    }

    let common = path
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &path[common..] {
        relative.push(component);
    }
    Some(relative)
}
