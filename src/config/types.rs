use serde::{Deserialize, Serialize};

use crate::cli::{DuplicatePolicy, PackingHeuristic};

/// PNG compression level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompressConfig {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression ("max")
    Max(String),
}

/// Trimpack configuration file structure.
///
/// All paths in the config are relative to the config file location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimpackConfig {
    /// Config file version (currently 1)
    pub version: u32,
    /// Input file paths, directories or glob patterns
    pub input: Vec<String>,
    /// Output directory for the atlas and sprite table
    pub output_dir: String,
    /// Base name for output files (atlas.png, atlas.json)
    pub name: String,
    /// Maximum atlas width and height in pixels
    pub max_size: u32,
    /// Gap between sprites in pixels
    pub padding: u32,
    /// Packing heuristic to use
    pub heuristic: PackingHeuristic,
    /// Keep power-of-two atlas dimensions
    pub power_of_two: bool,
    /// What to do when two images share a name
    pub duplicates: DuplicatePolicy,
    /// Carry inner rect adjustments over from the previous sprite table
    pub preserve_inner: bool,
    /// PNG compression configuration (optional)
    pub compress: Option<CompressConfig>,
    /// Output RGB instead of RGBA (opaque atlas)
    pub opaque: bool,
}

impl Default for TrimpackConfig {
    fn default() -> Self {
        Self {
            version: 1,
            input: Vec::new(),
            output_dir: ".".to_string(),
            name: "atlas".to_string(),
            max_size: 4096,
            padding: 1,
            heuristic: PackingHeuristic::BestShortSideFit,
            power_of_two: true,
            duplicates: DuplicatePolicy::Reject,
            preserve_inner: true,
            compress: None,
            opaque: false,
        }
    }
}
