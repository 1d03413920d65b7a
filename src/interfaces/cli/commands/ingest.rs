//! Ingest and promote commands

use std::sync::Arc;

use colored::Colorize;
use tracing::debug;

use crate::interfaces::cli::CliError;
use crate::services::{IngestionService, PromotionService};
use crate::storage::{Method, PromotionOutcome, SeaOrmStorage};

pub async fn ingest_file(
    storage: Arc<SeaOrmStorage>,
    file_path: String,
    promote: bool,
) -> Result<(), CliError> {
    let content = std::fs::read_to_string(&file_path)
        .map_err(|e| CliError::CommandError(format!("Failed to read {}: {}", file_path, e)))?;
    let candidates = IngestionService::parse_candidates(&content)?;
    debug!("Parsed {} candidates from {}", candidates.len(), file_path);

    let ingestion = IngestionService::new(storage.clone());
    let report = ingestion.ingest_batch(&candidates).await?;

    println!(
        "{} Inserted {}, already present {}, failed {}",
        "✓".bold().green(),
        report.inserted.to_string().cyan(),
        report.already_present.to_string().yellow(),
        report.failed.len().to_string().red()
    );
    for failure in &report.failed {
        println!("  {} {}: {}", "✗".red(), failure.filename, failure.error.message());
    }

    if promote {
        let promotion = PromotionService::new(storage);
        for candidate in &candidates {
            if let Some(PromotionOutcome::Promoted) = promotion.observe(candidate).await? {
                println!(
                    "{} Promoted to Stable: {}",
                    "↑".bold().blue(),
                    candidate.filename().magenta()
                );
            }
        }
    }

    Ok(())
}

pub async fn promote_version(
    storage: Arc<SeaOrmStorage>,
    version: String,
    method: Method,
) -> Result<(), CliError> {
    let outcome = PromotionService::new(storage)
        .promote(&version, method)
        .await?;

    match outcome {
        PromotionOutcome::Promoted => println!(
            "{} {} ({}) promoted to Stable",
            "✓".bold().green(),
            version.cyan(),
            method
        ),
        PromotionOutcome::AlreadyStable => println!(
            "{} {} ({}) is already Stable",
            "ℹ".bold().blue(),
            version.cyan(),
            method
        ),
        PromotionOutcome::NotPromotable => {
            return Err(CliError::CommandError(format!(
                "{} ({}) is not on the Stable Beta branch",
                version, method
            )));
        }
        PromotionOutcome::NotFound => {
            return Err(CliError::CommandError(format!(
                "No Full {} release {}",
                method, version
            )));
        }
    }
    Ok(())
}
