use log::debug;

use super::{MaxRectsPacker, Rect};
use crate::cli::PackingHeuristic;
use crate::error::TrimpackError;

/// Concrete heuristics tried, in order, when packing with `Best`
pub const ALL_HEURISTICS: [PackingHeuristic; 5] = [
    PackingHeuristic::BestShortSideFit,
    PackingHeuristic::BestLongSideFit,
    PackingHeuristic::BestAreaFit,
    PackingHeuristic::BottomLeft,
    PackingHeuristic::ContactPoint,
];

/// A rectangle to be placed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEntry {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl PackEntry {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }
}

/// Where an entry ended up on the canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub name: String,
    pub rect: Rect,
}

/// A complete packing of every entry
#[derive(Debug, Clone, PartialEq)]
pub struct PackedLayout {
    pub width: u32,
    pub height: u32,
    /// One placement per entry, in packing order
    pub placements: Vec<Placement>,
    pub heuristic: PackingHeuristic,
    pub occupancy: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PackOptions {
    /// Largest canvas side allowed
    pub max_size: u32,
    /// Gap kept between neighboring rectangles
    pub padding: u32,
    /// Smallest canvas side tried
    pub min_size: u32,
    pub heuristic: PackingHeuristic,
    /// Keep the power-of-two canvas instead of shrinking to the used extent
    pub power_of_two: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            max_size: 4096,
            padding: 1,
            min_size: 32,
            heuristic: PackingHeuristic::BestShortSideFit,
            power_of_two: true,
        }
    }
}

/// Pack `entries` into the smallest power-of-two canvas that holds them all.
///
/// The canvas starts at `min_size` (or the power of two covering the largest
/// entry) and doubles its shorter side until everything fits. Fails with
/// `PackingOverflow` once both sides would exceed `max_size`; a partial
/// layout is never returned.
pub fn pack(entries: &[PackEntry], options: &PackOptions) -> Result<PackedLayout, TrimpackError> {
    if entries.is_empty() {
        return Err(TrimpackError::EmptyPack);
    }

    if options.padding > options.max_size {
        return Err(TrimpackError::PaddingTooLarge {
            padding: options.padding,
            max_size: options.max_size,
        });
    }

    for entry in entries {
        if entry.width > options.max_size || entry.height > options.max_size {
            return Err(TrimpackError::SpriteTooLarge {
                name: entry.name.clone(),
                width: entry.width,
                height: entry.height,
                max_size: options.max_size,
            });
        }
    }

    let order = sorted_order(entries);
    let total_area: u64 = entries
        .iter()
        .map(|e| u64::from(e.width) * u64::from(e.height))
        .sum();
    let largest_side = entries
        .iter()
        .map(|e| e.width.max(e.height))
        .max()
        .unwrap_or(1);

    let start = next_power_of_two(options.min_size.max(largest_side).max(1));
    let mut width = start.min(options.max_size);
    let mut height = width;

    loop {
        if u64::from(width) * u64::from(height) >= total_area
            && let Some(layout) = try_sizes(entries, &order, width, height, options)
        {
            debug!(
                "Packed {} rectangles into {}x{} ({:?}, {:.1}% occupancy)",
                layout.placements.len(),
                layout.width,
                layout.height,
                layout.heuristic,
                layout.occupancy * 100.0
            );
            return Ok(layout);
        }

        debug!("{} rectangles do not fit {}x{}, growing", entries.len(), width, height);

        // Double the shorter side; width first when square
        if width <= height && width < options.max_size {
            width = width.saturating_mul(2).min(options.max_size);
        } else if height < options.max_size {
            height = height.saturating_mul(2).min(options.max_size);
        } else if width < options.max_size {
            width = width.saturating_mul(2).min(options.max_size);
        } else {
            return Err(TrimpackError::PackingOverflow {
                sprites: entries.len(),
                max_size: options.max_size,
            });
        }
    }
}

/// Height descending, then width descending, then name
fn sorted_order(entries: &[PackEntry]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| {
        let (ea, eb) = (&entries[a], &entries[b]);
        eb.height
            .cmp(&ea.height)
            .then(eb.width.cmp(&ea.width))
            .then_with(|| ea.name.cmp(&eb.name))
    });
    order
}

fn try_sizes(
    entries: &[PackEntry],
    order: &[usize],
    width: u32,
    height: u32,
    options: &PackOptions,
) -> Option<PackedLayout> {
    let heuristics: &[PackingHeuristic] = if options.heuristic == PackingHeuristic::Best {
        &ALL_HEURISTICS
    } else {
        std::slice::from_ref(&options.heuristic)
    };

    let mut best: Option<PackedLayout> = None;
    for &heuristic in heuristics {
        let Some(layout) = try_pack(entries, order, width, height, heuristic, options) else {
            continue;
        };

        let better = best.as_ref().is_none_or(|b| {
            u64::from(layout.width) * u64::from(layout.height)
                < u64::from(b.width) * u64::from(b.height)
        });
        if better {
            best = Some(layout);
        }
    }

    best
}

fn try_pack(
    entries: &[PackEntry],
    order: &[usize],
    width: u32,
    height: u32,
    heuristic: PackingHeuristic,
    options: &PackOptions,
) -> Option<PackedLayout> {
    // Every rectangle reserves its trailing gap; the bin is widened by one gap
    // so the last column/row may butt against the canvas edge.
    let mut packer = MaxRectsPacker::new(
        width.checked_add(options.padding)?,
        height.checked_add(options.padding)?,
    );
    let mut placements = Vec::with_capacity(order.len());
    let mut max_x = 0u32;
    let mut max_y = 0u32;

    for &i in order {
        let entry = &entries[i];
        let slot = packer.insert(
            entry.width.checked_add(options.padding)?,
            entry.height.checked_add(options.padding)?,
            heuristic,
        )?;
        let rect = Rect::new(slot.x, slot.y, entry.width, entry.height);

        max_x = max_x.max(rect.right());
        max_y = max_y.max(rect.bottom());
        placements.push(Placement {
            name: entry.name.clone(),
            rect,
        });
    }

    let (width, height) = if options.power_of_two {
        (width, height)
    } else {
        (max_x, max_y)
    };

    let used: u64 = placements.iter().map(|p| p.rect.area()).sum();
    let occupancy = used as f64 / (u64::from(width) * u64::from(height)) as f64;

    Some(PackedLayout {
        width,
        height,
        placements,
        heuristic,
        occupancy,
    })
}

pub fn next_power_of_two(n: u32) -> u32 {
    if n == 0 {
        return 1;
    }
    let mut v = n - 1;
    v |= v >> 1;
    v |= v >> 2;
    v |= v >> 4;
    v |= v >> 8;
    v |= v >> 16;
    v + 1
}
