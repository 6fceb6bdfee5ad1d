use std::collections::BTreeMap;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::packing::Rect;

/// A completed texture atlas
#[derive(Debug)]
pub struct Atlas {
    /// Atlas width
    pub width: u32,
    /// Atlas height
    pub height: u32,
    /// Rendered atlas image
    pub image: RgbaImage,
    /// Where every sprite's opaque content was placed
    pub rects: BTreeMap<String, Rect>,
    /// Ratio of sprite area to canvas area
    pub occupancy: f64,
}

impl Atlas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            image: RgbaImage::new(width, height),
            rects: BTreeMap::new(),
            occupancy: 0.0,
        }
    }
}

/// Half-open pixel rectangle. Coordinates are signed because a sprite's
/// outer rect may extend past the atlas once trim margins are added back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl PixelRect {
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> i32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i32 {
        self.y_max - self.y_min
    }

    pub fn contains(&self, other: &PixelRect) -> bool {
        self.x_min <= other.x_min
            && self.y_min <= other.y_min
            && self.x_max >= other.x_max
            && self.y_max >= other.y_max
    }
}

impl From<Rect> for PixelRect {
    fn from(rect: Rect) -> Self {
        let x = i32::try_from(rect.x).unwrap_or(i32::MAX);
        let y = i32::try_from(rect.y).unwrap_or(i32::MAX);
        let w = i32::try_from(rect.width).unwrap_or(i32::MAX);
        let h = i32::try_from(rect.height).unwrap_or(i32::MAX);
        Self::new(x, y, x.saturating_add(w), y.saturating_add(h))
    }
}

/// Empty space around a sprite, as a fraction of its packed size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Padding {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// One sprite as published to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteRecord {
    pub name: String,
    /// Packed rect grown back out by the trim margins
    pub outer: PixelRect,
    /// Opaque content, or a hand-tuned region carried over from a previous build
    pub inner: PixelRect,
    pub padding: Padding,
}

/// Sprites keyed by name, iterated in name order
pub type SpriteTable = BTreeMap<String, SpriteRecord>;

/// Non-fatal issue found while building
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildWarning {
    #[error("Image '{name}' has no opaque pixels and was skipped")]
    EmptyImage { name: String },

    #[error("Sprite '{name}' has a zero-sized rect; padding set to 0")]
    DegenerateSprite { name: String },

    #[error("Image name '{name}' appears more than once; {}", duplicate_outcome(.identical))]
    DuplicateName { name: String, identical: bool },
}

fn duplicate_outcome(identical: &bool) -> &'static str {
    if *identical {
        "identical copies merged"
    } else {
        "last one wins"
    }
}

/// Result of a successful build
#[derive(Debug)]
pub struct BuildOutput {
    /// `None` means every input was empty and the host should clear its atlas
    pub atlas: Option<Atlas>,
    pub sprites: SpriteTable,
    pub warnings: Vec<BuildWarning>,
}

impl BuildOutput {
    pub fn cleared(warnings: Vec<BuildWarning>) -> Self {
        Self {
            atlas: None,
            sprites: SpriteTable::new(),
            warnings,
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.atlas.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_rect_from_rect() {
        let rect = PixelRect::from(Rect::new(4, 6, 10, 3));
        assert_eq!(rect, PixelRect::new(4, 6, 14, 9));
        assert_eq!(rect.width(), 10);
        assert_eq!(rect.height(), 3);
    }

    #[test]
    fn test_pixel_rect_contains() {
        let outer = PixelRect::new(-2, -2, 18, 18);
        assert!(outer.contains(&PixelRect::new(0, 0, 16, 16)));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&PixelRect::new(-3, 0, 16, 16)));
    }

    #[test]
    fn test_warning_messages() {
        let merged = BuildWarning::DuplicateName {
            name: "a".to_string(),
            identical: true,
        };
        assert!(merged.to_string().contains("identical copies merged"));

        let replaced = BuildWarning::DuplicateName {
            name: "a".to_string(),
            identical: false,
        };
        assert!(replaced.to_string().contains("last one wins"));
    }
}
