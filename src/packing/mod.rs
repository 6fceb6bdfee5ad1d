mod maxrects;
mod packer;
mod rect;

pub use maxrects::MaxRectsPacker;
pub use packer::{
    ALL_HEURISTICS, PackEntry, PackOptions, PackedLayout, Placement, next_power_of_two, pack,
};
pub use rect::Rect;
