//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for release-tracker using clap's derive macros.

use clap::{Parser, Subcommand};

use crate::storage::{Branch, Method};

/// Release tracker - stores scraped OS/firmware releases and resolves the latest ones
#[derive(Parser)]
#[command(name = "release-tracker")]
#[command(version)]
#[command(about = "Track OS and firmware releases per device", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create the schema and optionally register devices
    Init {
        /// JSON array of devices to register
        #[arg(long)]
        devices: Option<String>,
    },

    /// Ingest candidates from a JSON file (one object or an array)
    Ingest {
        /// Input file path
        file_path: String,

        /// Do not promote Stable Beta builds confirmed by this batch
        #[arg(long)]
        no_promote: bool,
    },

    /// Promote a Stable Beta build to Stable
    Promote {
        version: String,

        /// Installation method
        #[arg(long, default_value_t = Method::Recovery)]
        method: Method,
    },

    /// Show the latest release per device
    Latest {
        /// Branch, e.g. "Stable", "Stable Beta", "Weekly"
        #[arg(long, default_value = "Stable")]
        branch: Branch,

        /// Only this installation method
        #[arg(long)]
        method: Option<Method>,
    },

    /// Show the latest releases of one device and its regional variants
    Device {
        codename: String,

        /// List every stored release instead of the latest per branch
        #[arg(long)]
        history: bool,
    },

    /// Show the latest firmware packages
    Firmware,

    /// Write the JSON snapshots
    Export {
        /// Latest-releases snapshot path (default: export.latest_path)
        #[arg(long)]
        latest: Option<String>,

        /// Device list path (default: export.devices_path)
        #[arg(long)]
        devices: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
