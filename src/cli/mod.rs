mod args;

pub use args::{
    BuildArgs, CliArgs, Command, CompressionLevel, DuplicatePolicy, InitArgs, PackingHeuristic,
};
