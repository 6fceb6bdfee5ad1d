use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrimpackError {
    #[error("Failed to load image '{path}': {source}")]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to save image '{path}': {source}")]
    ImageSave {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("No valid images found in input")]
    NoImages,

    #[error("Nothing to pack")]
    EmptyPack,

    #[error("Image '{name}' is malformed: {width}x{height} with {len} bytes of pixel data")]
    MalformedImage {
        name: String,
        width: u32,
        height: u32,
        len: usize,
    },

    #[error("Two different images share the name '{0}'")]
    DuplicateName(String),

    #[error("Sprite '{name}' ({width}x{height}) exceeds maximum atlas size ({max_size}x{max_size})")]
    SpriteTooLarge {
        name: String,
        width: u32,
        height: u32,
        max_size: u32,
    },

    #[error("Padding {padding} is larger than the maximum atlas size ({max_size})")]
    PaddingTooLarge { padding: u32, max_size: u32 },

    #[error("Cannot fit {sprites} sprites into a {max_size}x{max_size} atlas")]
    PackingOverflow { sprites: usize, max_size: u32 },

    #[error("Failed to read sprite table '{path}': {source}")]
    SpriteTable {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to compress PNG '{path}': {message}")]
    PngCompress { path: PathBuf, message: String },

    #[error("Input path does not exist: {0}")]
    InputNotFound(PathBuf),
}
