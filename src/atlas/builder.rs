use std::collections::HashMap;

use image::imageops;
use log::{debug, info, warn};

use super::reconcile::{carry_inner, normalized_padding, outer_rect};
use super::{Atlas, BuildOutput, BuildWarning, Padding, PixelRect, SpriteRecord, SpriteTable};
use crate::cli::{DuplicatePolicy, PackingHeuristic};
use crate::error::TrimpackError;
use crate::packing::{PackEntry, PackOptions, pack};
use crate::sprite::{SourceImage, TrimResult, TrimmedSprite, trim};

/// Configuration for atlas building
#[derive(Debug, Clone)]
pub struct AtlasBuilder {
    pub max_size: u32,
    pub padding: u32,
    pub heuristic: PackingHeuristic,
    pub power_of_two: bool,
    pub duplicates: DuplicatePolicy,
    pub preserve_inner: bool,
}

impl Default for AtlasBuilder {
    fn default() -> Self {
        Self::new(4096)
    }
}

impl AtlasBuilder {
    pub fn new(max_size: u32) -> Self {
        Self {
            max_size,
            padding: 1,
            heuristic: PackingHeuristic::BestShortSideFit,
            power_of_two: true,
            duplicates: DuplicatePolicy::Reject,
            preserve_inner: true,
        }
    }

    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn heuristic(mut self, heuristic: PackingHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn power_of_two(mut self, pot: bool) -> Self {
        self.power_of_two = pot;
        self
    }

    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Carry hand-tuned inner rects over from the prior sprite table
    pub fn preserve_inner(mut self, preserve: bool) -> Self {
        self.preserve_inner = preserve;
        self
    }

    fn pack_options(&self) -> PackOptions {
        PackOptions {
            max_size: self.max_size,
            padding: self.padding,
            heuristic: self.heuristic,
            power_of_two: self.power_of_two,
            ..PackOptions::default()
        }
    }

    /// Trim, pack and composite `images` into one atlas.
    ///
    /// `prior` is only read: records whose names match contribute their
    /// inner/outer deltas, everything else in it is ignored. The returned
    /// table holds exactly the sprites of this build.
    pub fn build(
        &self,
        images: Vec<SourceImage>,
        prior: &SpriteTable,
    ) -> Result<BuildOutput, TrimpackError> {
        if let Some(image) = images.iter().find(|i| i.width() == 0 || i.height() == 0) {
            return Err(TrimpackError::MalformedImage {
                name: image.name.clone(),
                width: image.width(),
                height: image.height(),
                len: image.image.as_raw().len(),
            });
        }

        let mut warnings = Vec::new();
        let images = self.resolve_duplicates(images, &mut warnings)?;

        let mut sprites = Vec::with_capacity(images.len());
        for image in images {
            match trim(image) {
                TrimResult::Empty { name, .. } => {
                    warnings.push(BuildWarning::EmptyImage { name });
                }
                TrimResult::Content(sprite) => {
                    debug!(
                        "Trimmed '{}' to {}x{}",
                        sprite.name,
                        sprite.width(),
                        sprite.height()
                    );
                    sprites.push(sprite);
                }
            }
        }

        if sprites.is_empty() {
            info!("No opaque sprites left; clearing atlas");
            return Ok(finish(BuildOutput::cleared(warnings)));
        }

        let entries: Vec<_> = sprites
            .iter()
            .map(|s| PackEntry::new(s.name.clone(), s.width(), s.height()))
            .collect();
        let layout = pack(&entries, &self.pack_options())?;

        let mut atlas = Atlas::new(layout.width, layout.height);
        atlas.occupancy = layout.occupancy;

        let mut by_name: HashMap<String, TrimmedSprite> = sprites
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect();
        let mut table = SpriteTable::new();

        for placement in layout.placements {
            let Some(sprite) = by_name.remove(&placement.name) else {
                continue;
            };
            let rect = placement.rect;

            imageops::replace(
                &mut atlas.image,
                &sprite.image,
                i64::from(rect.x),
                i64::from(rect.y),
            );

            let outer = outer_rect(rect, &sprite.trim_info);
            let inner = match prior.get(&sprite.name) {
                Some(previous) if self.preserve_inner => carry_inner(previous, outer),
                _ => PixelRect::from(rect),
            };
            let padding = normalized_padding(rect, &sprite.trim_info).unwrap_or_else(|| {
                warnings.push(BuildWarning::DegenerateSprite {
                    name: sprite.name.clone(),
                });
                Padding::default()
            });

            atlas.rects.insert(sprite.name.clone(), rect);
            table.insert(
                sprite.name.clone(),
                SpriteRecord {
                    name: sprite.name,
                    outer,
                    inner,
                    padding,
                },
            );
        }

        info!(
            "Atlas {}x{} with {} sprites ({:.1}% efficiency, {:?})",
            atlas.width,
            atlas.height,
            table.len(),
            atlas.occupancy * 100.0,
            layout.heuristic,
        );

        Ok(finish(BuildOutput {
            atlas: Some(atlas),
            sprites: table,
            warnings,
        }))
    }

    /// Collapse same-named inputs according to the duplicate policy, keeping
    /// the position of the first occurrence.
    fn resolve_duplicates(
        &self,
        images: Vec<SourceImage>,
        warnings: &mut Vec<BuildWarning>,
    ) -> Result<Vec<SourceImage>, TrimpackError> {
        let mut kept: Vec<SourceImage> = Vec::with_capacity(images.len());
        let mut index: HashMap<String, usize> = HashMap::new();

        for image in images {
            let Some(slot) = index.get(&image.name).copied() else {
                index.insert(image.name.clone(), kept.len());
                kept.push(image);
                continue;
            };

            let identical = kept[slot].image == image.image;
            if !identical && self.duplicates == DuplicatePolicy::Reject {
                return Err(TrimpackError::DuplicateName(image.name));
            }

            warnings.push(BuildWarning::DuplicateName {
                name: image.name.clone(),
                identical,
            });
            kept[slot] = image;
        }

        Ok(kept)
    }
}

fn finish(output: BuildOutput) -> BuildOutput {
    for warning in &output.warnings {
        warn!("{}", warning);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packing::Rect;
    use image::{Rgba, RgbaImage};

    fn solid(name: &str, w: u32, h: u32, color: [u8; 4]) -> SourceImage {
        SourceImage::new(name, RgbaImage::from_pixel(w, h, Rgba(color)))
    }

    /// A `w`x`h` image with a transparent border of `border` pixels
    fn bordered(name: &str, w: u32, h: u32, border: u32, color: [u8; 4]) -> SourceImage {
        let image = RgbaImage::from_fn(w, h, |x, y| {
            let inside = x >= border && y >= border && x < w - border && y < h - border;
            if inside { Rgba(color) } else { Rgba([0, 0, 0, 0]) }
        });
        SourceImage::new(name, image)
    }

    fn two_sprites() -> Vec<SourceImage> {
        vec![
            solid("a", 10, 10, [255, 0, 0, 255]),
            bordered("b", 20, 20, 2, [0, 0, 255, 255]),
        ]
    }

    #[test]
    fn test_end_to_end_two_sprites() {
        let output = AtlasBuilder::default()
            .build(two_sprites(), &SpriteTable::new())
            .unwrap();
        let atlas = output.atlas.unwrap();

        assert!(output.warnings.is_empty());
        assert_eq!(output.sprites.len(), 2);

        let a = &output.sprites["a"];
        assert_eq!(a.padding, Padding::default());
        assert_eq!(a.inner, a.outer);
        assert_eq!(a.inner.width(), 10);

        let b = &output.sprites["b"];
        assert_eq!(b.inner.width(), 16);
        assert_eq!(b.inner.height(), 16);
        assert_eq!(b.outer.width(), 20);
        assert_eq!(b.outer.height(), 20);
        for side in [b.padding.left, b.padding.right, b.padding.top, b.padding.bottom] {
            assert_eq!(side, 0.125);
        }

        // Both sprites fit side by side with the gap
        let ra = atlas.rects["a"];
        let rb = atlas.rects["b"];
        assert!(!ra.grown(1).intersects(&rb.grown(1)));
        assert!(ra.right() <= atlas.width && rb.bottom() <= atlas.height);
    }

    #[test]
    fn test_composite_copies_pixels() {
        let output = AtlasBuilder::default()
            .build(two_sprites(), &SpriteTable::new())
            .unwrap();
        let atlas = output.atlas.unwrap();

        let rb = atlas.rects["b"];
        for y in rb.y..rb.bottom() {
            for x in rb.x..rb.right() {
                assert_eq!(*atlas.image.get_pixel(x, y), Rgba([0, 0, 255, 255]));
            }
        }

        let ra = atlas.rects["a"];
        assert_eq!(*atlas.image.get_pixel(ra.x, ra.y), Rgba([255, 0, 0, 255]));

        // The gap to the right of the first sprite stays transparent
        let first = if ra.x == 0 && ra.y == 0 { ra } else { rb };
        assert_eq!(atlas.image.get_pixel(first.right(), first.y)[3], 0);
    }

    #[test]
    fn test_rebuild_with_prior_table_is_stable() {
        let builder = AtlasBuilder::default();
        let first = builder.build(two_sprites(), &SpriteTable::new()).unwrap();
        let second = builder.build(two_sprites(), &first.sprites).unwrap();

        assert_eq!(first.sprites, second.sprites);
    }

    #[test]
    fn test_hand_tuned_inner_survives_rebuild() {
        let builder = AtlasBuilder::default();
        let first = builder.build(two_sprites(), &SpriteTable::new()).unwrap();

        let mut edited = first.sprites.clone();
        if let Some(a) = edited.get_mut("a") {
            a.inner.x_min += 3;
            a.inner.y_max -= 2;
        }

        let second = builder.build(two_sprites(), &edited).unwrap();
        let a = &second.sprites["a"];
        assert_eq!(a.inner.x_min - a.outer.x_min, 3);
        assert_eq!(a.outer.y_max - a.inner.y_max, 2);

        // Without preservation the edit is discarded
        let fresh = builder
            .clone()
            .preserve_inner(false)
            .build(two_sprites(), &edited)
            .unwrap();
        assert_eq!(fresh.sprites["a"], first.sprites["a"]);
    }

    #[test]
    fn test_prior_entries_for_missing_sprites_are_dropped() {
        let builder = AtlasBuilder::default();
        let first = builder.build(two_sprites(), &SpriteTable::new()).unwrap();

        let second = builder
            .build(vec![solid("a", 10, 10, [255, 0, 0, 255])], &first.sprites)
            .unwrap();

        assert_eq!(second.sprites.keys().collect::<Vec<_>>(), ["a"]);
        assert_eq!(first.sprites.len(), 2);
    }

    #[test]
    fn test_empty_images_are_skipped_with_warning() {
        let images = vec![
            solid("a", 10, 10, [255, 0, 0, 255]),
            SourceImage::new("ghost", RgbaImage::new(8, 8)),
        ];
        let output = AtlasBuilder::default()
            .build(images, &SpriteTable::new())
            .unwrap();

        assert_eq!(output.sprites.len(), 1);
        assert_eq!(
            output.warnings,
            [BuildWarning::EmptyImage {
                name: "ghost".to_string()
            }]
        );
    }

    #[test]
    fn test_all_empty_clears_atlas() {
        let images = vec![
            SourceImage::new("ghost", RgbaImage::new(8, 8)),
            SourceImage::new("dot", RgbaImage::new(1, 1)),
        ];
        let output = AtlasBuilder::default()
            .build(images, &SpriteTable::new())
            .unwrap();

        assert!(output.is_cleared());
        assert!(output.sprites.is_empty());
        assert_eq!(output.warnings.len(), 2);
    }

    #[test]
    fn test_zero_sized_image_aborts_build() {
        let images = vec![
            solid("a", 10, 10, [255, 0, 0, 255]),
            SourceImage::new("flat", RgbaImage::new(12, 0)),
        ];
        let err = AtlasBuilder::default()
            .build(images, &SpriteTable::new())
            .unwrap_err();

        assert!(matches!(
            err,
            TrimpackError::MalformedImage { ref name, width: 12, height: 0, len: 0 } if name == "flat"
        ));

        let err = AtlasBuilder::default()
            .build(vec![SourceImage::new("zero", RgbaImage::new(0, 0))], &SpriteTable::new())
            .unwrap_err();
        assert!(matches!(err, TrimpackError::MalformedImage { .. }));
    }

    #[test]
    fn test_extreme_prior_coordinates_do_not_overflow() {
        let builder = AtlasBuilder::default();
        let first = builder.build(two_sprites(), &SpriteTable::new()).unwrap();

        let mut edited = first.sprites.clone();
        if let Some(a) = edited.get_mut("a") {
            a.outer = PixelRect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
            a.inner = PixelRect::new(i32::MAX, i32::MAX, i32::MIN, i32::MIN);
        }

        let second = builder.build(two_sprites(), &edited).unwrap();
        let a = &second.sprites["a"];
        assert!(a.outer.contains(&a.inner));
        assert_eq!(a.outer, first.sprites["a"].outer);
    }

    #[test]
    fn test_no_images_clears_atlas() {
        let output = AtlasBuilder::default()
            .build(Vec::new(), &SpriteTable::new())
            .unwrap();
        assert!(output.is_cleared());
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_names_rejected_by_default() {
        let images = vec![
            solid("a", 10, 10, [255, 0, 0, 255]),
            solid("a", 10, 10, [0, 255, 0, 255]),
        ];
        let err = AtlasBuilder::default()
            .build(images, &SpriteTable::new())
            .unwrap_err();

        assert!(matches!(err, TrimpackError::DuplicateName(name) if name == "a"));
    }

    #[test]
    fn test_identical_duplicates_merge() {
        let images = vec![
            solid("a", 10, 10, [255, 0, 0, 255]),
            solid("a", 10, 10, [255, 0, 0, 255]),
        ];
        let output = AtlasBuilder::default()
            .build(images, &SpriteTable::new())
            .unwrap();

        assert_eq!(output.sprites.len(), 1);
        assert_eq!(
            output.warnings,
            [BuildWarning::DuplicateName {
                name: "a".to_string(),
                identical: true
            }]
        );
    }

    #[test]
    fn test_duplicate_last_write_wins() {
        let images = vec![
            solid("a", 10, 10, [255, 0, 0, 255]),
            solid("a", 12, 6, [0, 255, 0, 255]),
        ];
        let output = AtlasBuilder::default()
            .duplicates(DuplicatePolicy::LastWriteWins)
            .build(images, &SpriteTable::new())
            .unwrap();
        let atlas = output.atlas.unwrap();

        let rect = atlas.rects["a"];
        assert_eq!((rect.width, rect.height), (12, 6));
        assert_eq!(*atlas.image.get_pixel(rect.x, rect.y), Rgba([0, 255, 0, 255]));
        assert!(matches!(
            output.warnings.as_slice(),
            [BuildWarning::DuplicateName {
                identical: false,
                ..
            }]
        ));
    }

    #[test]
    fn test_overflow_is_fatal() {
        let images: Vec<_> = (0..5)
            .map(|i| solid(&format!("tile_{i}"), 30, 30, [9, 9, 9, 255]))
            .collect();
        let err = AtlasBuilder::new(64)
            .build(images, &SpriteTable::new())
            .unwrap_err();

        assert!(matches!(err, TrimpackError::PackingOverflow { sprites: 5, .. }));
    }

    #[test]
    fn test_non_pot_canvas_fits_content() {
        let output = AtlasBuilder::default()
            .power_of_two(false)
            .padding(0)
            .build(vec![solid("a", 10, 7, [1, 2, 3, 255])], &SpriteTable::new())
            .unwrap();
        let atlas = output.atlas.unwrap();

        assert_eq!((atlas.width, atlas.height), (10, 7));
        assert_eq!(atlas.rects["a"], Rect::new(0, 0, 10, 7));
    }
}
