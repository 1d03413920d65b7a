//! Init command

use std::sync::Arc;

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::storage::{Device, SeaOrmStorage};

/// The schema already exists once storage is open; this registers devices.
pub async fn init_schema(
    storage: Arc<SeaOrmStorage>,
    devices_path: Option<String>,
) -> Result<(), CliError> {
    println!(
        "{} Schema ready ({})",
        "✓".bold().green(),
        storage.backend_name().cyan()
    );

    let Some(path) = devices_path else {
        return Ok(());
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| CliError::CommandError(format!("Failed to read {}: {}", path, e)))?;
    let devices: Vec<Device> = serde_json::from_str(&content)
        .map_err(|e| CliError::ParseError(format!("Invalid device list {}: {}", path, e)))?;

    let mut registered = 0;
    for device in &devices {
        if storage.register_device(device).await? {
            registered += 1;
        }
    }

    println!(
        "{} Registered {} new devices ({} already known)",
        "✓".bold().green(),
        registered.to_string().cyan(),
        (devices.len() - registered).to_string().yellow()
    );
    Ok(())
}
