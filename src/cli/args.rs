use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "trimpack")]
#[command(version, about = "Sprite trimmer and atlas packer", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Trim and pack images into an atlas and update its sprite table
    Build(BuildArgs),
    /// Write a .trimpack config file with default settings
    Init(InitArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Input image files or directories
    #[arg(required_unless_present = "config")]
    pub input: Vec<PathBuf>,

    /// Load settings from a .trimpack config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory for the atlas and sprite table [default: .]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Base name for output files (atlas.png, atlas.json) [default: atlas]
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Maximum atlas width and height in pixels [default: 4096]
    #[arg(long)]
    pub max_size: Option<u32>,

    /// Gap between sprites in pixels [default: 1]
    #[arg(short, long)]
    pub padding: Option<u32>,

    /// Packing heuristic to use [default: best-short-side-fit]
    #[arg(long, value_enum)]
    pub heuristic: Option<PackingHeuristic>,

    /// Shrink the atlas to the packed extent instead of a power of two
    #[arg(long)]
    pub no_pot: bool,

    /// What to do when two images share a name [default: reject]
    #[arg(long, value_enum)]
    pub duplicates: Option<DuplicatePolicy>,

    /// Ignore the existing sprite table in the output directory
    #[arg(long)]
    pub fresh: bool,

    /// Derive inner rects from trimming only, discarding earlier adjustments
    #[arg(long)]
    pub no_preserve_inner: bool,

    /// Output RGB instead of RGBA (opaque atlas)
    #[arg(long)]
    pub opaque: bool,

    /// Compress PNG output (0-6 or 'max'). Default level is 2 if flag is present without value.
    #[arg(long, value_name = "LEVEL", default_missing_value = "2", num_args = 0..=1)]
    pub compress: Option<CompressionLevel>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Path of the config file to create
    pub path: PathBuf,

    /// Input files, directories or glob patterns to record in the config
    #[arg(short, long)]
    pub input: Vec<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// How same-named input images are handled
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Fail the build when two different images share a name
    #[default]
    #[value(name = "reject")]
    Reject,
    /// The image listed last replaces earlier ones
    #[value(name = "last-write-wins")]
    LastWriteWins,
}

/// PNG compression level (0-6 or max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression
    Max,
}

impl std::str::FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            Ok(CompressionLevel::Max)
        } else {
            s.parse::<u8>()
                .map_err(|_e| format!("invalid compression level: {}", s))
                .and_then(|n| {
                    if n <= 6 {
                        Ok(CompressionLevel::Level(n))
                    } else {
                        Err(format!("compression level must be 0-6 or 'max', got {}", n))
                    }
                })
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        CompressionLevel::Level(2)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackingHeuristic {
    /// Best Short Side Fit - minimizes the shorter leftover side
    #[default]
    #[value(name = "best-short-side-fit")]
    BestShortSideFit,
    /// Best Long Side Fit - minimizes the longer leftover side
    #[value(name = "best-long-side-fit")]
    BestLongSideFit,
    /// Best Area Fit - picks the smallest free rectangle
    #[value(name = "best-area-fit")]
    BestAreaFit,
    /// Bottom Left - Tetris-style packing
    #[value(name = "bottom-left")]
    BottomLeft,
    /// Contact Point - maximizes contact with placed rectangles and bin edges
    #[value(name = "contact-point")]
    ContactPoint,
    /// Best - tries all heuristics and picks the most efficient result
    #[value(name = "best")]
    Best,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_level_parse() {
        assert_eq!("max".parse(), Ok(CompressionLevel::Max));
        assert_eq!("MAX".parse(), Ok(CompressionLevel::Max));
        assert_eq!("4".parse(), Ok(CompressionLevel::Level(4)));
        assert!("7".parse::<CompressionLevel>().is_err());
        assert!("fast".parse::<CompressionLevel>().is_err());
    }

    #[test]
    fn test_build_args_parse() {
        let cli = CliArgs::parse_from([
            "trimpack",
            "build",
            "art/hero",
            "--max-size",
            "1024",
            "--duplicates",
            "last-write-wins",
            "--heuristic",
            "contact-point",
            "--compress",
        ]);

        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(args.input, [PathBuf::from("art/hero")]);
        assert_eq!(args.max_size, Some(1024));
        assert_eq!(args.duplicates, Some(DuplicatePolicy::LastWriteWins));
        assert_eq!(args.heuristic, Some(PackingHeuristic::ContactPoint));
        assert_eq!(args.compress, Some(CompressionLevel::Level(2)));
        assert!(!args.fresh);
    }

    #[test]
    fn test_build_requires_input_or_config() {
        assert!(CliArgs::try_parse_from(["trimpack", "build"]).is_err());
        assert!(CliArgs::try_parse_from(["trimpack", "build", "-c", "hero.trimpack"]).is_ok());
    }

    #[test]
    fn test_heuristic_serde_names_match_cli() {
        let json = serde_json::to_string(&PackingHeuristic::BestShortSideFit).unwrap();
        assert_eq!(json, "\"best-short-side-fit\"");

        let policy: DuplicatePolicy = serde_json::from_str("\"last-write-wins\"").unwrap();
        assert_eq!(policy, DuplicatePolicy::LastWriteWins);
    }
}
