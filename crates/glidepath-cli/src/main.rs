use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glidepath_core::{DeviceContext, ScrollConfig, ScrollMode};

mod commands;
mod layout;
mod sim;

#[derive(Parser)]
#[command(name = "glidepath")]
#[command(author, version, about = "Scroll-triggered viewport tracking simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ~/.config/glidepath/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scroll through a page layout and print element events
    Simulate(SimulateArgs),
    /// Show the effective configuration and compatibility warnings
    Config {
        /// Write the default configuration (to --config if given) if no file exists yet
        #[arg(long)]
        init: bool,
    },
    /// Classify a device and show which settings apply to it
    Device {
        #[arg(short = 'u', long)]
        user_agent: String,
        /// Viewport width in CSS pixels
        #[arg(short = 'w', long)]
        width: f64,
        #[arg(short = 'p', long, default_value = "")]
        platform: String,
        #[arg(short = 't', long, default_value_t = 0)]
        touch_points: u32,
    },
}

#[derive(clap::Args)]
pub struct SimulateArgs {
    /// Layout file (TOML)
    pub layout: PathBuf,
    /// Offset to scroll to (defaults to the bottom of the page)
    #[arg(long)]
    pub to: Option<f64>,
    /// Distance per step
    #[arg(long, default_value_t = 100.0)]
    pub step: f64,
    /// Animate with an eased scroll_to instead of stepping
    #[arg(long)]
    pub animate: bool,
    #[arg(long, value_enum, default_value_t = ModeArg::Native)]
    pub mode: ModeArg,
    #[arg(long, value_enum, default_value_t = ContextArg::Desktop)]
    pub context: ContextArg,
    /// Pace frames in real time at this rate (0 = as fast as possible)
    #[arg(long)]
    pub fps: Option<u32>,
    /// Print scroll events too
    #[arg(long)]
    pub scroll_events: bool,
    /// Emit JSON lines instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Native,
    Smooth,
}

impl From<ModeArg> for ScrollMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Native => ScrollMode::Native,
            ModeArg::Smooth => ScrollMode::Smooth,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ContextArg {
    Desktop,
    Tablet,
    Smartphone,
}

impl From<ContextArg> for DeviceContext {
    fn from(context: ContextArg) -> Self {
        match context {
            ContextArg::Desktop => DeviceContext::Desktop,
            ContextArg::Tablet => DeviceContext::Tablet,
            ContextArg::Smartphone => DeviceContext::Smartphone,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration; `config --init` may be creating the --config file
    let init = matches!(cli.command, Commands::Config { init: true });
    let config = match &cli.config {
        Some(path) if init && !path.exists() => ScrollConfig::default(),
        Some(path) => ScrollConfig::load_from(path)?,
        None => ScrollConfig::load()?,
    };

    match cli.command {
        Commands::Simulate(args) => commands::simulate::run(args, config).await,
        Commands::Config { init } => commands::config::run(&config, init, cli.config.as_deref()),
        Commands::Device {
            user_agent,
            width,
            platform,
            touch_points,
        } => commands::device::run(&config, user_agent, width, platform, touch_points),
    }
}
