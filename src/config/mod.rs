mod load;
mod save;
mod types;

pub use load::LoadedConfig;
pub use save::{relative_input, save_config};
pub use types::{CompressConfig, TrimpackConfig};
