//! Trailgen - Command-line tools

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trail_core::config::{Difficulty, GeneratorConfig, MapSize};
use trail_core::map_generation::{MapData, MapGenerator};
use trail_tools::batch::{run_batch, BatchConfig};
use trail_tools::export::{export_map, write_output, ExportFormat};
use trail_tools::render::{describe, render_ascii_with_path};
use trail_tools::{Result, ToolError};

#[derive(Parser)]
#[command(name = "trail-tools")]
#[command(about = "Deterministic tile-map generation tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a map and print or save it
    Generate {
        /// Map width in cells
        #[arg(long, default_value_t = 16)]
        width: u32,
        /// Map height in cells
        #[arg(long, default_value_t = 16)]
        height: u32,
        /// Seed string (random if omitted)
        #[arg(long)]
        seed: Option<String>,
        /// Size preset, overrides width and height (tiny, small, ..., custom_10000)
        #[arg(long)]
        size: Option<String>,
        /// Difficulty preset (easy, normal, hard)
        #[arg(long)]
        difficulty: Option<String>,
        /// Generator config file (RON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Ascii)]
        format: ExportFormat,
        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Save the binary map to this file as well
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Generate a map and report its start-to-goal route
    Path {
        /// Map width in cells
        #[arg(long, default_value_t = 16)]
        width: u32,
        /// Map height in cells
        #[arg(long, default_value_t = 16)]
        height: u32,
        /// Seed string
        #[arg(long)]
        seed: Option<String>,
        /// Load a saved binary map instead of generating one
        #[arg(long, conflicts_with = "seed")]
        map: Option<PathBuf>,
        /// Print the map with the route highlighted
        #[arg(long)]
        show: bool,
    },
    /// Generate many maps in parallel and summarize connectivity
    Batch {
        /// Map width in cells
        #[arg(long, default_value_t = 16)]
        width: u32,
        /// Map height in cells
        #[arg(long, default_value_t = 16)]
        height: u32,
        /// Number of maps
        #[arg(long, default_value_t = 100)]
        count: u32,
        /// Seed prefix
        #[arg(long, default_value = "batch")]
        prefix: String,
        /// Generator config file (RON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print full results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a generator config file
    Validate {
        /// Path to config file (RON)
        path: PathBuf,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Generate {
            width,
            height,
            seed,
            size,
            difficulty,
            config,
            format,
            out,
            save,
        } => run_generate(
            width,
            height,
            seed.as_deref(),
            size.as_deref(),
            difficulty.as_deref(),
            config.as_deref(),
            format,
            out.as_deref(),
            save.as_deref(),
        ),
        Commands::Path {
            width,
            height,
            seed,
            map,
            show,
        } => run_path(width, height, seed.as_deref(), map.as_deref(), show),
        Commands::Batch {
            width,
            height,
            count,
            prefix,
            config,
            json,
        } => run_batch_command(
            BatchConfig::new(width, height, count).with_prefix(prefix),
            config.as_deref(),
            json,
        ),
        Commands::Validate { path } => {
            tracing::info!("Validating config file: {}", path.display());
            trail_tools::validate::validate_config_file(&path).map(|config| {
                tracing::info!("Validation passed");
                println!("{config:#?}");
            })
        }
    };

    if let Err(e) = outcome {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>, difficulty: Option<&str>) -> Result<GeneratorConfig> {
    let mut config = match path {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(name) = difficulty {
        let difficulty = Difficulty::from_name(name)
            .ok_or_else(|| ToolError::InvalidArgument(format!("unknown difficulty '{name}'")))?;
        config = config.with_difficulty(difficulty);
    }
    Ok(config)
}

fn generate(
    generator: &MapGenerator,
    width: u32,
    height: u32,
    size: Option<&str>,
    seed: Option<&str>,
) -> Result<MapData> {
    if let Some(name) = size {
        let size = MapSize::from_name(name)
            .ok_or_else(|| ToolError::InvalidArgument(format!("unknown size preset '{name}'")))?;
        return Ok(generator.generate_size(size, seed)?);
    }

    let (w, h) = generator.config().clamp_dimensions(width, height);
    if (w, h) != (width, height) {
        tracing::warn!(width, height, clamped_width = w, clamped_height = h, "Clamped map size");
    }
    Ok(generator.generate(w, h, seed)?)
}

fn run_generate(
    width: u32,
    height: u32,
    seed: Option<&str>,
    size: Option<&str>,
    difficulty: Option<&str>,
    config: Option<&Path>,
    format: ExportFormat,
    out: Option<&Path>,
    save: Option<&Path>,
) -> Result<()> {
    let generator = MapGenerator::new(load_config(config, difficulty)?)?;
    let map = generate(&generator, width, height, size, seed)?;
    tracing::info!("{}", describe(&map));

    if let Some(path) = save {
        map.save(path)?;
    }
    write_output(&export_map(&map, format)?, out)
}

fn run_path(
    width: u32,
    height: u32,
    seed: Option<&str>,
    saved: Option<&Path>,
    show: bool,
) -> Result<()> {
    let map = match saved {
        Some(path) => MapData::load(path)?,
        None => generate(&MapGenerator::default(), width, height, None, seed)?,
    };

    let path = map.solution();
    if path.is_empty() {
        println!("seed={} no route from start to goal", map.seed());
    } else {
        println!(
            "seed={} path_length={} multiple_routes={}",
            map.seed(),
            path.len(),
            map.has_multiple_routes()
        );
    }
    if show {
        print!("{}", render_ascii_with_path(&map, &path));
    }
    Ok(())
}

fn run_batch_command(config: BatchConfig, generator: Option<&Path>, json: bool) -> Result<()> {
    let results = run_batch(config, load_config(generator, None)?)?;
    let summary = &results.summary;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!(
            "maps={} guaranteed={} ({:.1}%) avg_repairs={:.2} max_repairs={} avg_path={:.1} avg_walkable={:.1}%",
            summary.total_maps,
            summary.guaranteed,
            summary.guaranteed_rate() * 100.0,
            summary.avg_repair_attempts,
            summary.max_repair_attempts,
            summary.avg_path_length,
            summary.avg_walkable_ratio * 100.0
        );
    }
    Ok(())
}
