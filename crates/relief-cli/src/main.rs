//! Relief CLI - Command-line interface for the Relief terrain generator

mod commands;
mod export;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{animate, generate, init};
use relief_water::WaterStrategy;

#[derive(Parser)]
#[command(name = "relief")]
#[command(about = "Procedural heightmap terrain and water surface generator", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads for mesh generation (default: one per core)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Config file path
        #[arg(default_value = "relief.toml")]
        path: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate terrain and water, print statistics, optionally export JSON
    Generate {
        /// Path to config file (default: ./relief.toml if present)
        #[arg(short, long)]
        config: Option<String>,

        /// Detail factor multiplied into the base sizes
        #[arg(long)]
        resolution: Option<f32>,

        /// Height multiplier
        #[arg(long)]
        height: Option<f32>,

        /// Noise frequency scale
        #[arg(long)]
        noise_scale: Option<f32>,

        /// Noise seed
        #[arg(long)]
        seed: Option<u32>,

        /// Water depth offset
        #[arg(long)]
        water_depth: Option<f32>,

        /// Water strategy (planar or masked)
        #[arg(long)]
        water: Option<WaterStrategy>,

        /// Write terrain and water buffers to this JSON file
        #[arg(short, long)]
        output: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Run the wave simulation for a number of frames
    Animate {
        /// Path to config file (default: ./relief.toml if present)
        #[arg(short, long)]
        config: Option<String>,

        /// Number of frames to simulate
        #[arg(long, default_value = "120")]
        frames: u32,

        /// Frame time in seconds
        #[arg(long, default_value = "0.016666668")]
        dt: f64,

        /// Water strategy (planar or masked)
        #[arg(long)]
        water: Option<WaterStrategy>,

        /// Print a line every N frames
        #[arg(long, default_value = "30")]
        report_every: u32,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    match cli.command {
        Commands::Init { path, force } => init::run(&path, force),
        Commands::Generate {
            config,
            resolution,
            height,
            noise_scale,
            seed,
            water_depth,
            water,
            output,
            pretty,
        } => generate::run(generate::GenerateArgs {
            config,
            resolution,
            height,
            noise_scale,
            seed,
            water_depth,
            water,
            output,
            pretty,
        }),
        Commands::Animate {
            config,
            frames,
            dt,
            water,
            report_every,
        } => animate::run(animate::AnimateArgs {
            config,
            frames,
            dt,
            water,
            report_every,
        }),
    }
}
