mod builder;
mod reconcile;
mod types;

pub use builder::AtlasBuilder;
pub use reconcile::{carry_inner, normalized_padding, outer_rect};
pub use types::{Atlas, BuildOutput, BuildWarning, Padding, PixelRect, SpriteRecord, SpriteTable};
