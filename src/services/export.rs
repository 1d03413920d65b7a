//! Export/snapshot builder
//!
//! Renders the resolved "latest everything" view and the device list as
//! JSON files for static consumers.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{Result, TrackerError};
use crate::services::ResolutionService;
use crate::storage::{Branch, Method, ResolvedUpdate, SeaOrmStorage};
use crate::utils::human_size;

/// One row of the latest-releases snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub codename: String,
    /// "name region"
    pub name: String,
    pub version: String,
    pub android: String,
    pub branch: Branch,
    pub method: Method,
    /// Human readable, e.g. "2.5 GB"
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    pub link: String,
    pub changelog: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl From<ResolvedUpdate> for SnapshotEntry {
    fn from(resolved: ResolvedUpdate) -> Self {
        let update = resolved.update;
        Self {
            codename: update.codename,
            name: resolved.full_name,
            version: update.version,
            android: update.android,
            branch: update.branch,
            method: update.method,
            size: human_size(update.size),
            md5: update.md5,
            link: update.link,
            changelog: update.changelog,
            date: update.date,
        }
    }
}

/// codename -> [display name, vendor name]
pub type DeviceExport = BTreeMap<String, [String; 2]>;

pub struct ExportService {
    storage: Arc<SeaOrmStorage>,
    resolution: ResolutionService,
}

impl ExportService {
    pub fn new(storage: Arc<SeaOrmStorage>, resolution: ResolutionService) -> Self {
        Self {
            storage,
            resolution,
        }
    }

    /// Latest release of every tracked branch, sorted by codename.
    ///
    /// The sort is stable, so entries of one codename keep branch order.
    pub async fn export_latest(&self) -> Result<Vec<SnapshotEntry>> {
        let resolved = self.resolution.all_latest_updates().await?;
        let mut entries: Vec<SnapshotEntry> = resolved.into_iter().map(Into::into).collect();
        entries.sort_by(|a, b| a.codename.cmp(&b.codename));
        Ok(entries)
    }

    /// Current devices keyed by codename.
    pub async fn export_devices(&self) -> Result<DeviceExport> {
        let devices = self.storage.current_devices().await?;
        Ok(devices
            .into_iter()
            .map(|d| {
                let display = d.display_name();
                (d.codename, [display, d.miui_name])
            })
            .collect())
    }

    /// Write the latest snapshot to `path`; returns the number of entries.
    pub async fn write_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let entries = self.export_latest().await?;
        write_json(path.as_ref(), &entries)?;
        info!(
            "ExportService: wrote {} entries to {}",
            entries.len(),
            path.as_ref().display()
        );
        Ok(entries.len())
    }

    /// Write the device list to `path`; returns the number of devices.
    pub async fn write_devices<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let devices = self.export_devices().await?;
        write_json(path.as_ref(), &devices)?;
        info!(
            "ExportService: wrote {} devices to {}",
            devices.len(),
            path.as_ref().display()
        );
        Ok(devices.len())
    }
}

/// Pretty JSON, written to a sibling temp file and renamed over `path`.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| {
            TrackerError::file_operation(format!("无效的输出路径: {}", path.display()))
        })?
        .to_string_lossy();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    std::fs::write(&tmp_path, content).map_err(|e| {
        TrackerError::file_operation(format!("写入 {} 失败: {}", tmp_path.display(), e))
    })?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        TrackerError::file_operation(format!("替换 {} 失败: {}", path.display(), e))
    })?;
    Ok(())
}
