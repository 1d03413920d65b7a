//! Ingestion engine
//!
//! Accepts scraped candidates, validates them and stores them exactly once.
//! Duplicates (same filename or same md5) are reported as `AlreadyPresent`
//! rather than as errors.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::errors::{Result, TrackerError};
use crate::storage::{Candidate, IngestOutcome, NewFirmwareUpdate, NewUpdate, SeaOrmStorage};

const MAX_CODENAME_LEN: usize = 30;
const MAX_VERSION_LEN: usize = 40;
const MAX_ANDROID_LEN: usize = 5;
const MAX_BRANCH_LEN: usize = 15;
const MAX_FILENAME_LEN: usize = 255;

/// Single candidate that could not be stored
#[derive(Debug, Clone)]
pub struct IngestFailure {
    pub filename: String,
    pub error: TrackerError,
}

/// Result of a batch ingestion
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub inserted: usize,
    pub already_present: usize,
    pub failed: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.inserted + self.already_present + self.failed.len()
    }
}

fn require(field: &str, value: &str, max_len: Option<usize>, filename: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TrackerError::validation(format!(
            "字段 '{}' 不能为空 (filename: {})",
            field, filename
        )));
    }
    if let Some(max) = max_len
        && value.chars().count() > max
    {
        return Err(TrackerError::validation(format!(
            "字段 '{}' 超过 {} 个字符 (filename: {})",
            field, max, filename
        )));
    }
    Ok(())
}

fn validate_md5(md5: Option<&str>, filename: &str) -> Result<()> {
    match md5 {
        Some(hash) if hash.len() != 32 || !hash.chars().all(|c| c.is_ascii_hexdigit()) => {
            Err(TrackerError::validation(format!(
                "无效的 md5 '{}' (filename: {})",
                hash, filename
            )))
        }
        _ => Ok(()),
    }
}

fn validate_common(
    codename: &str,
    version: &str,
    android: &str,
    branch: &str,
    filename: &str,
) -> Result<()> {
    require("filename", filename, Some(MAX_FILENAME_LEN), filename)?;
    require("codename", codename, Some(MAX_CODENAME_LEN), filename)?;
    require("version", version, Some(MAX_VERSION_LEN), filename)?;
    require("android", android, Some(MAX_ANDROID_LEN), filename)?;
    require("branch", branch, Some(MAX_BRANCH_LEN), filename)?;
    Ok(())
}

fn validate_update(candidate: &NewUpdate) -> Result<()> {
    validate_common(
        &candidate.codename,
        &candidate.version,
        &candidate.android,
        candidate.branch.as_str(),
        &candidate.filename,
    )?;
    require("link", &candidate.link, None, &candidate.filename)?;
    validate_md5(candidate.md5.as_deref(), &candidate.filename)
}

fn validate_firmware(candidate: &NewFirmwareUpdate) -> Result<()> {
    validate_common(
        &candidate.codename,
        &candidate.version,
        &candidate.android,
        candidate.branch.as_str(),
        &candidate.filename,
    )?;
    require("github_link", &candidate.github_link, None, &candidate.filename)?;
    validate_md5(candidate.md5.as_deref(), &candidate.filename)
}

/// Check required fields before anything reaches the backend.
pub fn validate_candidate(candidate: &Candidate) -> Result<()> {
    match candidate {
        Candidate::Update(update) => validate_update(update),
        Candidate::Firmware(firmware) => validate_firmware(firmware),
    }
}

/// Service for storing scraped releases
pub struct IngestionService {
    storage: Arc<SeaOrmStorage>,
}

impl IngestionService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Store one candidate.
    ///
    /// `ConstraintViolation` means the device is unknown (or, for firmware,
    /// not tracked); `Validation` means a required field is missing.
    pub async fn ingest(&self, candidate: &Candidate) -> Result<IngestOutcome> {
        validate_candidate(candidate)?;

        match candidate {
            Candidate::Update(update) => self.storage.insert_update(update).await,
            Candidate::Firmware(firmware) => self.storage.insert_firmware(firmware).await,
        }
    }

    /// Store candidates one after another.
    ///
    /// Candidate-local failures are recorded and skipped. Anything else
    /// (lost connection, unexpected backend error) aborts the batch.
    pub async fn ingest_batch(&self, candidates: &[Candidate]) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        for candidate in candidates {
            match self.ingest(candidate).await {
                Ok(IngestOutcome::Inserted) => report.inserted += 1,
                Ok(IngestOutcome::AlreadyPresent) => report.already_present += 1,
                Err(e) if e.is_candidate_local() => {
                    warn!("Skipping candidate {}: {}", candidate.filename(), e);
                    report.failed.push(IngestFailure {
                        filename: candidate.filename().to_string(),
                        error: e,
                    });
                }
                Err(e) => {
                    error!(
                        "Batch aborted at {} after {} candidates: {}",
                        candidate.filename(),
                        report.total(),
                        e
                    );
                    return Err(e);
                }
            }
        }

        info!(
            "IngestionService: {} inserted, {} already present, {} failed",
            report.inserted,
            report.already_present,
            report.failed.len()
        );
        Ok(report)
    }

    /// Parse a JSON document holding either one candidate or an array of them.
    pub fn parse_candidates(content: &str) -> Result<Vec<Candidate>> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        if value.is_array() {
            Ok(serde_json::from_value(value)?)
        } else {
            Ok(vec![serde_json::from_value(value)?])
        }
    }
}
