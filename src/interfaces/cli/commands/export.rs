//! Export command

use std::sync::Arc;

use colored::Colorize;

use crate::config::StaticConfig;
use crate::interfaces::cli::CliError;
use crate::services::{ExportService, ResolutionService};
use crate::storage::SeaOrmStorage;

pub async fn export_snapshots(
    storage: Arc<SeaOrmStorage>,
    config: &StaticConfig,
    latest_path: Option<String>,
    devices_path: Option<String>,
) -> Result<(), CliError> {
    let latest_path = latest_path.unwrap_or_else(|| config.export.latest_path.clone());
    let devices_path = devices_path.unwrap_or_else(|| config.export.devices_path.clone());

    let resolution = ResolutionService::new(storage.clone(), &config.resolution);
    let export = ExportService::new(storage, resolution);

    let entries = export.write_snapshot(&latest_path).await?;
    println!(
        "{} Wrote {} releases to {}",
        "✓".bold().green(),
        entries.to_string().cyan(),
        latest_path.blue()
    );

    let devices = export.write_devices(&devices_path).await?;
    println!(
        "{} Wrote {} devices to {}",
        "✓".bold().green(),
        devices.to_string().cyan(),
        devices_path.blue()
    );
    Ok(())
}
