mod loader;
mod pixels;
mod sprite;
mod trimmer;

pub use loader::{load_images, sprite_name};
pub use pixels::{crop, opaque_bounds};
pub use sprite::{SourceImage, TrimInfo, TrimResult, TrimmedSprite};
pub use trimmer::trim;
