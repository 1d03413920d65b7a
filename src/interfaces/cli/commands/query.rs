//! Read-only query commands

use std::sync::Arc;

use colored::Colorize;

use crate::config::ResolutionConfig;
use crate::interfaces::cli::CliError;
use crate::services::ResolutionService;
use crate::storage::{Branch, Method, ResolvedUpdate, SeaOrmStorage};
use crate::utils::human_size;

fn print_release(resolved: &ResolvedUpdate) {
    let update = &resolved.update;
    let date = update
        .date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {} {} {} {} [{} {}] {}",
        update.codename.cyan(),
        resolved.full_name,
        update.version.green(),
        format!("Android {}", update.android).dimmed(),
        update.branch.as_str().yellow(),
        update.method,
        date.dimmed()
    );
    println!(
        "    {} {}",
        human_size(update.size),
        update.link.blue().underline()
    );
}

pub async fn show_latest(
    storage: Arc<SeaOrmStorage>,
    config: &ResolutionConfig,
    branch: Branch,
    method: Option<Method>,
) -> Result<(), CliError> {
    let resolution = ResolutionService::new(storage, config);
    let releases = resolution.latest_updates(&branch, method).await?;

    if releases.is_empty() {
        println!("{}", format!("No {} releases found", branch).yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Latest {} releases ({}):", branch, releases.len())
            .bold()
            .green()
    );
    for resolved in &releases {
        print_release(resolved);
    }
    Ok(())
}

pub async fn show_device(
    storage: Arc<SeaOrmStorage>,
    config: &ResolutionConfig,
    codename: String,
    history: bool,
) -> Result<(), CliError> {
    let resolution = ResolutionService::new(storage, config);
    let releases = if history {
        resolution.device_roms(&codename).await?
    } else {
        resolution.device_latest(&codename).await?
    };

    if releases.is_empty() {
        return Err(CliError::CommandError(format!(
            "No releases found for '{}'",
            codename
        )));
    }

    for resolved in &releases {
        print_release(resolved);
    }
    Ok(())
}

pub async fn show_firmware(
    storage: Arc<SeaOrmStorage>,
    config: &ResolutionConfig,
) -> Result<(), CliError> {
    let resolution = ResolutionService::new(storage, config);
    let firmware = resolution.latest_firmware().await?;

    if firmware.is_empty() {
        println!("{}", "No firmware found".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Latest firmware ({}):", firmware.len())
            .bold()
            .green()
    );
    for resolved in &firmware {
        let fw = &resolved.firmware;
        println!(
            "  {} {} {} {}",
            fw.codename.cyan(),
            resolved.full_name,
            fw.version.green(),
            fw.github_link.blue().underline()
        );
    }
    Ok(())
}
