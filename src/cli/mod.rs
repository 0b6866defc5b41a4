//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `liveprobe probe <inputs>...` - Probe candidates and write alive targets
//! - `liveprobe expand <inputs>...` - Print normalized targets without probing
//! - `liveprobe proxies <file>` - Load and list a proxy file
//! - `liveprobe settings` - Show or initialise persisted defaults

mod expand;
mod probe;
mod proxies;
mod settings;

pub use expand::ExpandCommand;
pub use probe::ProbeCommand;
pub use proxies::ProxiesCommand;
pub use settings::SettingsCommand;

use crate::config::Settings;
use crate::error::CliResult;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// liveprobe - HTTP liveness probing for discovered hosts.
///
/// Reads candidate hostnames or URLs, expands them into probe targets,
/// checks each one over HTTP (optionally through rotating proxies), and
/// writes the targets that answered to a newline-delimited file.
#[derive(Parser, Debug)]
#[command(name = "liveprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Concurrent HTTP liveness prober", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe candidates and write the alive targets
    #[command(alias = "p")]
    Probe(ProbeCommand),

    /// Print the targets candidates expand to, without probing
    #[command(alias = "x")]
    Expand(ExpandCommand),

    /// Load a proxy list and show what would be used
    Proxies(ProxiesCommand),

    /// Show or initialise persisted settings
    Settings(SettingsCommand),
}

/// Output format for run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Load settings from `--config`, or the default location.
pub fn load_settings(config: Option<&Path>) -> CliResult<Settings> {
    let settings = match config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    Ok(settings)
}
