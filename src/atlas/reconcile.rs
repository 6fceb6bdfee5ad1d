use super::{Padding, PixelRect, SpriteRecord};
use crate::packing::Rect;
use crate::sprite::TrimInfo;

/// Inner/outer distances of a record, per side. Widened to `i64` since the
/// record comes from a hand-editable file and may hold any `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SideDeltas {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl SideDeltas {
    fn of(record: &SpriteRecord) -> Self {
        let (inner, outer) = (&record.inner, &record.outer);
        Self {
            left: i64::from(inner.x_min) - i64::from(outer.x_min),
            top: i64::from(inner.y_min) - i64::from(outer.y_min),
            right: i64::from(outer.x_max) - i64::from(inner.x_max),
            bottom: i64::from(outer.y_max) - i64::from(inner.y_max),
        }
    }
}

/// Grow a packed rect back out by the margins trimming removed
pub fn outer_rect(packed: Rect, trim: &TrimInfo) -> PixelRect {
    let inner = PixelRect::from(packed);
    PixelRect::new(
        inner.x_min.saturating_sub(to_i32(trim.left)),
        inner.y_min.saturating_sub(to_i32(trim.top)),
        inner.x_max.saturating_add(to_i32(trim.right)),
        inner.y_max.saturating_add(to_i32(trim.bottom)),
    )
}

/// Re-apply a previous record's inner deltas onto a new outer rect, keeping
/// the result inside `outer`. A collapsed axis pins to zero size.
pub fn carry_inner(prior: &SpriteRecord, outer: PixelRect) -> PixelRect {
    let d = SideDeltas::of(prior);

    let x_min = shift_clamped(outer.x_min, d.left, outer.x_min, outer.x_max);
    let y_min = shift_clamped(outer.y_min, d.top, outer.y_min, outer.y_max);
    let x_max = shift_clamped(outer.x_max, -d.right, x_min, outer.x_max);
    let y_max = shift_clamped(outer.y_max, -d.bottom, y_min, outer.y_max);

    PixelRect::new(x_min, y_min, x_max, y_max)
}

/// `edge + delta` clamped to `lo..=hi`; the bounds are `i32`, so the
/// clamped value always fits.
fn shift_clamped(edge: i32, delta: i64, lo: i32, hi: i32) -> i32 {
    let shifted = (i64::from(edge) + delta).clamp(i64::from(lo), i64::from(hi));
    i32::try_from(shifted).unwrap_or(hi)
}

/// Trim margins as fractions of the packed size on each axis.
///
/// Returns `None` for a zero-sized axis; the caller reports the sprite as
/// degenerate and publishes zero padding.
pub fn normalized_padding(packed: Rect, trim: &TrimInfo) -> Option<Padding> {
    if packed.width == 0 || packed.height == 0 {
        return None;
    }

    let width = packed.width as f32;
    let height = packed.height as f32;

    Some(Padding {
        left: trim.left as f32 / width,
        right: trim.right as f32 / width,
        top: trim.top as f32 / height,
        bottom: trim.bottom as f32 / height,
    })
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
