mod config;
mod script;
mod sim;

use clap::{Parser, Subcommand};
use config::AppConfig;
use sim::SimOptions;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "terrastream-cli", about = "CLI tool for terrastream terrain streaming")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the effective configuration as YAML
    Config {
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Fly a scripted camera over procedural terrain
    Simulate {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// Seed for terrain and flight path
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Render through a headless wgpu device
        #[arg(long)]
        gpu: bool,
        /// Pace ticks in wall time and stream without waiting on loads
        #[arg(long)]
        realtime: bool,
        /// Tick length in milliseconds
        #[arg(long, default_value = "16")]
        dt_ms: u64,
    },
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(&path),
        None => Ok(AppConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Info => {
            println!("terrastream-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", terrastream_common::crate_info());
            println!("terrain: {}", terrastream_terrain::crate_info());
            println!("render: {}", terrastream_render::crate_info());
            println!("render-wgpu: {}", terrastream_render_wgpu::crate_info());
            println!("stream: {}", terrastream_stream::crate_info());
            println!("input: {}", terrastream_input::crate_info());
        }
        Commands::Config { config } => {
            let config = load_config(config)?;
            print!("{}", config.to_yaml()?);
        }
        Commands::Simulate {
            ticks,
            seed,
            config,
            gpu,
            realtime,
            dt_ms,
        } => {
            let config = load_config(config)?;
            let opts = SimOptions {
                ticks,
                seed,
                dt: Duration::from_millis(dt_ms.max(1)),
                gpu,
                realtime,
            };
            println!("Simulating: seed={seed}, ticks={ticks}, gpu={gpu}, realtime={realtime}");
            let summary = sim::run(&config, &opts)?;
            summary.print();
        }
    }

    Ok(())
}
