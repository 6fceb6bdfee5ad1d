use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use super::types::TrimpackConfig;

/// A loaded configuration file with its associated directory.
///
/// Paths in the config are relative to the config file location,
/// so we need to track where the config was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration
    pub config: TrimpackConfig,
    /// The directory containing the config file
    pub config_dir: PathBuf,
}

impl LoadedConfig {
    /// Load a config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: TrimpackConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        if config.version != 1 {
            anyhow::bail!(
                "unsupported config version {} in {}",
                config.version,
                path.display()
            );
        }

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        debug!("Loaded config {}", path.display());
        Ok(Self { config, config_dir })
    }

    /// Resolve input patterns to actual file paths.
    ///
    /// Glob patterns are expanded in sorted order, and all paths are resolved
    /// relative to the config file directory.
    pub fn resolve_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut results = Vec::new();

        for pattern in &self.config.input {
            if is_glob_pattern(pattern) {
                let full_pattern = self.config_dir.join(pattern);
                let pattern_str = full_pattern.to_string_lossy();

                let paths = glob::glob(&pattern_str)
                    .with_context(|| format!("invalid glob pattern: {}", pattern))?;

                let mut matched = Vec::new();
                for entry in paths {
                    let path =
                        entry.with_context(|| format!("failed to read glob entry: {}", pattern))?;
                    matched.push(path);
                }
                matched.sort();
                results.extend(matched);
            } else {
                results.push(self.config_dir.join(pattern));
            }
        }

        Ok(results)
    }

    /// Resolve the output directory relative to the config file directory.
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.config_dir.join(&self.config.output_dir)
    }
}

/// Check if a pattern contains glob characters.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_glob_pattern() {
        assert!(is_glob_pattern("*.png"));
        assert!(is_glob_pattern("sprites/*.png"));
        assert!(is_glob_pattern("sprites/**/*.png"));
        assert!(is_glob_pattern("sprite?.png"));
        assert!(is_glob_pattern("sprite[0-9].png"));
        assert!(!is_glob_pattern("sprite.png"));
        assert!(!is_glob_pattern("sprites/hero.png"));
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let loaded = LoadedConfig {
            config: TrimpackConfig {
                input: vec!["hero".to_string(), "extra/cape.png".to_string()],
                output_dir: "build".to_string(),
                ..TrimpackConfig::default()
            },
            config_dir: PathBuf::from("/project/art"),
        };

        assert_eq!(
            loaded.resolve_inputs().unwrap(),
            [
                PathBuf::from("/project/art/hero"),
                PathBuf::from("/project/art/extra/cape.png")
            ]
        );
        assert_eq!(
            loaded.resolve_output_dir(),
            PathBuf::from("/project/art/build")
        );
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let path = std::env::temp_dir().join(format!(
            "trimpack-version-{}.trimpack",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "version": 9 }"#).unwrap();

        let result = LoadedConfig::load(&path);
        std::fs::remove_file(&path).ok();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("unsupported config version 9"));
    }
}
