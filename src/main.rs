use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use trimpack::atlas::{AtlasBuilder, SpriteTable};
use trimpack::cli::{
    BuildArgs, CliArgs, Command, CompressionLevel, DuplicatePolicy, InitArgs, PackingHeuristic,
};
use trimpack::config::{CompressConfig, LoadedConfig, TrimpackConfig, relative_input, save_config};
use trimpack::output::{publish_build, read_sprite_table};
use trimpack::sprite::load_images;

#[allow(clippy::print_stderr)]
fn main() {
    if let Err(e) = run() {
        // Use eprintln instead of error! because logger may not be initialized
        // (e.g., config loading fails before logger init)
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliArgs::parse();

    match &cli.command {
        Command::Build(args) => build(args),
        Command::Init(args) => {
            init_logging(false);
            init(args)
        }
    }
}

fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn build(args: &BuildArgs) -> Result<()> {
    // Load config if specified and merge with CLI args
    let merged = merge_config_with_args(args)?;
    init_logging(merged.verbose);

    info!("Trimpack v{}", env!("CARGO_PKG_VERSION"));

    if !merged.output.exists() {
        fs::create_dir_all(&merged.output).with_context(|| {
            format!("failed to create output directory: {}", merged.output.display())
        })?;
    }

    let prior = if merged.fresh {
        SpriteTable::new()
    } else {
        read_sprite_table(&merged.output, &merged.name)?
    };

    let images = load_images(&merged.input)?;
    info!("Loaded {} images", images.len());

    let output = AtlasBuilder::new(merged.max_size)
        .padding(merged.padding)
        .heuristic(merged.heuristic)
        .power_of_two(merged.power_of_two)
        .duplicates(merged.duplicates)
        .preserve_inner(merged.preserve_inner)
        .build(images, &prior)?;

    publish_build(
        &output,
        &merged.output,
        &merged.name,
        merged.opaque,
        merged.compress,
    )?;

    let removed = prior
        .keys()
        .filter(|name| !output.sprites.contains_key(*name))
        .count();
    if removed > 0 {
        info!("Dropped {} sprites no longer in the input", removed);
    }

    if !output.warnings.is_empty() {
        info!("Done with {} warning(s)", output.warnings.len());
    } else {
        info!("Done!");
    }

    Ok(())
}

fn init(args: &InitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        );
    }

    let input = args
        .input
        .iter()
        .map(|p| relative_input(p, &args.path))
        .collect::<Result<Vec<_>>>()?;

    let config = TrimpackConfig {
        input,
        ..TrimpackConfig::default()
    };
    save_config(&config, &args.path)?;
    info!("Wrote {}", args.path.display());

    Ok(())
}

/// Merged configuration from CLI args and optional config file.
struct MergedConfig {
    input: Vec<PathBuf>,
    output: PathBuf,
    name: String,
    max_size: u32,
    padding: u32,
    heuristic: PackingHeuristic,
    power_of_two: bool,
    duplicates: DuplicatePolicy,
    preserve_inner: bool,
    fresh: bool,
    opaque: bool,
    verbose: bool,
    compress: Option<CompressionLevel>,
}

/// Merge config file values with CLI arguments.
/// CLI arguments always take precedence over config values.
fn merge_config_with_args(args: &BuildArgs) -> Result<MergedConfig> {
    let loaded_config = if let Some(config_path) = &args.config {
        Some(
            LoadedConfig::load(config_path)
                .with_context(|| format!("failed to load config: {}", config_path.display()))?,
        )
    } else {
        None
    };

    let defaults = TrimpackConfig::default();
    let config = loaded_config
        .as_ref()
        .map(|lc| &lc.config)
        .unwrap_or(&defaults);

    // Determine input files: CLI args override config
    let input = if !args.input.is_empty() {
        args.input.clone()
    } else if let Some(ref lc) = loaded_config {
        lc.resolve_inputs()
            .context("failed to resolve input files from config")?
    } else {
        // This shouldn't happen due to clap's required_unless_present
        Vec::new()
    };

    // Determine output directory: CLI > config > default
    let output = args.output.clone().unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(|lc| lc.resolve_output_dir())
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let compress = if args.compress.is_some() {
        args.compress
    } else {
        config.compress.as_ref().map(|c| match c {
            CompressConfig::Level(n) => CompressionLevel::Level(*n),
            CompressConfig::Max(_) => CompressionLevel::Max,
        })
    };

    Ok(MergedConfig {
        input,
        output,
        name: args.name.clone().unwrap_or_else(|| config.name.clone()),
        max_size: args.max_size.unwrap_or(config.max_size),
        padding: args.padding.unwrap_or(config.padding),
        heuristic: args.heuristic.unwrap_or(config.heuristic),
        // Boolean flags: CLI presence wins, otherwise use config
        power_of_two: !args.no_pot && config.power_of_two,
        duplicates: args.duplicates.unwrap_or(config.duplicates),
        preserve_inner: !args.no_preserve_inner && config.preserve_inner,
        fresh: args.fresh,
        opaque: args.opaque || config.opaque,
        verbose: args.verbose,
        compress,
    })
}
