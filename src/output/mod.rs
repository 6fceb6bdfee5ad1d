mod format;
mod publish;
mod table;

pub use format::{remove_atlas_image, save_atlas_image};
pub use publish::publish_build;
pub use table::{read_sprite_table, write_sprite_table};
