use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::TrimpackError;

/// Pixels removed from each side of a source image by trimming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TrimInfo {
    /// Pixels trimmed from left edge
    pub left: u32,
    /// Pixels trimmed from right edge
    pub right: u32,
    /// Pixels trimmed from top edge
    pub top: u32,
    /// Pixels trimmed from bottom edge
    pub bottom: u32,
    /// Original width before trimming
    pub source_width: u32,
    /// Original height before trimming
    pub source_height: u32,
}

impl TrimInfo {
    /// Create TrimInfo for an untrimmed sprite
    pub fn untrimmed(width: u32, height: u32) -> Self {
        Self {
            source_width: width,
            source_height: height,
            ..Self::default()
        }
    }

    /// Returns true if the sprite was actually trimmed
    pub fn was_trimmed(&self) -> bool {
        self.left != 0 || self.right != 0 || self.top != 0 || self.bottom != 0
    }

    /// Width left after trimming
    pub fn trimmed_width(&self) -> u32 {
        self.source_width - self.left - self.right
    }

    /// Height left after trimming
    pub fn trimmed_height(&self) -> u32 {
        self.source_height - self.top - self.bottom
    }
}

/// A named input image, as handed over by the host
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Unique identifier within a build
    pub name: String,
    pub image: RgbaImage,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    /// Wrap a raw row-major RGBA8 buffer, validating its dimensions
    pub fn from_rgba(
        name: impl Into<String>,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<Self, TrimpackError> {
        let name = name.into();
        let len = pixels.len();
        let expected = u64::from(width) * u64::from(height) * 4;

        if width == 0 || height == 0 || len as u64 != expected {
            return Err(TrimpackError::MalformedImage {
                name,
                width,
                height,
                len,
            });
        }

        match RgbaImage::from_raw(width, height, pixels) {
            Some(image) => Ok(Self { name, image }),
            None => Err(TrimpackError::MalformedImage {
                name,
                width,
                height,
                len,
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// A sprite cropped to its opaque content
#[derive(Debug, Clone)]
pub struct TrimmedSprite {
    pub name: String,
    /// Cropped image data (the source buffer itself when nothing was trimmed)
    pub image: RgbaImage,
    /// Trim metadata for offset reconstruction
    pub trim_info: TrimInfo,
}

impl TrimmedSprite {
    /// Width of the sprite (after trimming)
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height of the sprite (after trimming)
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Outcome of trimming one source image
#[derive(Debug, Clone)]
pub enum TrimResult {
    /// The image has no opaque pixel and produces no sprite
    Empty { name: String, width: u32, height: u32 },
    Content(TrimmedSprite),
}

impl TrimResult {
    pub fn name(&self) -> &str {
        match self {
            TrimResult::Empty { name, .. } => name,
            TrimResult::Content(sprite) => &sprite.name,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TrimResult::Empty { .. })
    }

    /// True if the crop equals the original and no copy was made
    pub fn is_fully_opaque(&self) -> bool {
        match self {
            TrimResult::Empty { .. } => false,
            TrimResult::Content(sprite) => !sprite.trim_info.was_trimmed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_valid() {
        let source = SourceImage::from_rgba("a", 2, 3, vec![0; 24]).unwrap();
        assert_eq!(source.width(), 2);
        assert_eq!(source.height(), 3);
        assert_eq!(source.name, "a");
    }

    #[test]
    fn test_from_rgba_rejects_zero_dimensions() {
        let err = SourceImage::from_rgba("a", 0, 3, Vec::new()).unwrap_err();
        assert!(matches!(err, TrimpackError::MalformedImage { width: 0, .. }));
    }

    #[test]
    fn test_from_rgba_rejects_short_buffer() {
        let err = SourceImage::from_rgba("a", 2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, TrimpackError::MalformedImage { len: 15, .. }));
    }

    #[test]
    fn test_trimmed_dimensions() {
        let info = TrimInfo {
            left: 2,
            right: 4,
            top: 3,
            bottom: 3,
            source_width: 10,
            source_height: 10,
        };

        assert_eq!(info.trimmed_width(), 4);
        assert_eq!(info.trimmed_height(), 4);
        assert!(info.was_trimmed());
        assert!(!TrimInfo::untrimmed(10, 10).was_trimmed());
    }
}
