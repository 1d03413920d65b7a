//! CLI interface module
//!
//! This module provides command-line interface functionality for release-tracker.

pub mod commands;

use std::fmt;
use std::sync::Arc;

use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use crate::errors::TrackerError;
use crate::storage::{SeaOrmStorage, StorageFactory};
use commands::{
    config_generate, export_snapshots, ingest_file, init_schema, promote_version, show_device,
    show_firmware, show_latest,
};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<TrackerError> for CliError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Validation(_) | TrackerError::Serialization(_) => {
                CliError::ParseError(err.format_simple())
            }
            TrackerError::NotFound(_) | TrackerError::FileOperation(_) => {
                CliError::CommandError(err.format_simple())
            }
            _ => CliError::StorageError(err.format_simple()),
        }
    }
}

async fn open_storage(config: &StaticConfig) -> Result<Arc<SeaOrmStorage>, CliError> {
    StorageFactory::create(&config.database)
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands, config: &StaticConfig) -> Result<(), CliError> {
    // Generate doesn't need a DB connection
    if let Commands::Config { action } = cmd {
        let ConfigCommands::Generate { output_path, force } = action;
        return config_generate(output_path, force);
    }

    let storage = open_storage(config).await?;

    match cmd {
        Commands::Init { devices } => init_schema(storage, devices).await,

        Commands::Ingest {
            file_path,
            no_promote,
        } => ingest_file(storage, file_path, !no_promote).await,

        Commands::Promote { version, method } => promote_version(storage, version, method).await,

        Commands::Latest { branch, method } => {
            show_latest(storage, &config.resolution, branch, method).await
        }

        Commands::Device { codename, history } => {
            show_device(storage, &config.resolution, codename, history).await
        }

        Commands::Firmware => show_firmware(storage, &config.resolution).await,

        Commands::Export { latest, devices } => {
            export_snapshots(storage, config, latest, devices).await
        }

        Commands::Config { .. } => unreachable!("handled above"),
    }
}
