pub mod atlas;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod packing;
pub mod sprite;

pub use atlas::{Atlas, AtlasBuilder, BuildOutput, BuildWarning, SpriteRecord, SpriteTable};
pub use cli::{CliArgs, Command, DuplicatePolicy, PackingHeuristic};
pub use error::TrimpackError;
pub use packing::{PackEntry, PackOptions, PackedLayout, pack};
pub use sprite::{SourceImage, TrimInfo, TrimResult, trim};
