//! Resolution engine
//!
//! Answers "what is the latest release" questions over the stored history.
//! Every latest-per-partition query follows the same shape: pull a bounded,
//! newest-first working set of `Full` releases, keep one record per partition
//! key, then join the survivors to their device through an eligibility
//! filter.

pub mod partition;

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

use crate::config::ResolutionConfig;
use crate::errors::Result;
use crate::storage::{
    Branch, BranchScope, Device, LatestVersion, Method, ReleaseFilter, ResolvedFirmware,
    ResolvedUpdate, SeaOrmStorage, Update,
};

pub use partition::{Dated, latest_per_partition, newest_first};

/// Which devices a resolved release may be reported for.
type Eligibility = fn(&Device) -> bool;

pub struct ResolutionService {
    storage: Arc<SeaOrmStorage>,
    working_set_limit: u64,
}

impl ResolutionService {
    pub fn new(storage: Arc<SeaOrmStorage>, config: &ResolutionConfig) -> Self {
        Self {
            storage,
            working_set_limit: config.working_set_limit,
        }
    }

    pub fn working_set_limit(&self) -> u64 {
        self.working_set_limit
    }

    // ============ Current-device queries ============

    /// Codenames of non-EOL devices with a valid vendor code.
    pub async fn current_devices(&self) -> Result<Vec<String>> {
        let devices = self.storage.current_devices().await?;
        Ok(devices.into_iter().map(|d| d.codename).collect())
    }

    /// Codenames of non-EOL devices with firmware tracking enabled.
    pub async fn firmware_devices(&self) -> Result<Vec<String>> {
        let devices = self.storage.firmware_devices().await?;
        Ok(devices.into_iter().map(|d| d.codename).collect())
    }

    /// `(codename, region)` of non-EOL devices listed on the vendor website.
    pub async fn fastboot_codenames(&self) -> Result<Vec<(String, String)>> {
        let devices = self.storage.website_devices().await?;
        Ok(devices
            .into_iter()
            .map(|d| (d.codename, d.region))
            .collect())
    }

    /// `(mi_website_id, region)`, one entry per website id, ordered by id.
    ///
    /// Devices sharing an id resolve to the first by codename.
    pub async fn mi_website_ids(&self) -> Result<Vec<(i32, String)>> {
        let devices = self.storage.website_devices().await?;

        let mut seen = HashSet::new();
        let mut ids: Vec<(i32, String)> = devices
            .into_iter()
            .filter_map(|d| d.mi_website_id.map(|id| (id, d.region)))
            .filter(|(id, _)| seen.insert(*id))
            .collect();
        ids.sort_by_key(|(id, _)| *id);
        Ok(ids)
    }

    // ============ Latest per partition ============

    /// Newest `(codename, version, android)` per current device on `branch`.
    pub async fn latest_versions(&self, branch: &Branch) -> Result<Vec<LatestVersion>> {
        let filter = ReleaseFilter::branch(branch.clone());
        let resolved = self
            .resolve(&filter, |u| u.codename.clone(), Device::is_current)
            .await?;

        Ok(resolved
            .into_iter()
            .map(|r| LatestVersion {
                codename: r.update.codename,
                version: r.update.version,
                android: r.update.android,
            })
            .collect())
    }

    /// Newest release per `(codename, method)` on `branch`.
    ///
    /// EOL devices keep reporting their final releases.
    pub async fn latest_updates(
        &self,
        branch: &Branch,
        method: Option<Method>,
    ) -> Result<Vec<ResolvedUpdate>> {
        let filter = ReleaseFilter {
            method,
            ..ReleaseFilter::branch(branch.clone())
        };
        self.resolve(
            &filter,
            |u| (u.codename.clone(), u.method),
            Device::is_supported,
        )
        .await
    }

    /// `latest_updates` for every tracked branch, concatenated in branch order.
    pub async fn all_latest_updates(&self) -> Result<Vec<ResolvedUpdate>> {
        let [stable, beta, weekly] = &Branch::TRACKED;
        let (stable, beta, weekly) = tokio::try_join!(
            self.latest_updates(stable, None),
            self.latest_updates(beta, None),
            self.latest_updates(weekly, None),
        )?;

        let mut all = Vec::with_capacity(stable.len() + beta.len() + weekly.len());
        all.extend(stable);
        all.extend(beta);
        all.extend(weekly);
        Ok(all)
    }

    /// Newest release per `(codename, method, branch)` for every regional
    /// variant whose codename starts with `codename`.
    pub async fn device_latest(&self, codename: &str) -> Result<Vec<ResolvedUpdate>> {
        let filter = ReleaseFilter {
            branch: BranchScope::StableOrWeekly,
            codename_prefix: Some(codename.to_string()),
            ..Default::default()
        };
        self.resolve(
            &filter,
            |u| (u.codename.clone(), u.method, u.branch.clone()),
            Device::is_supported,
        )
        .await
    }

    /// Newest `Stable` release of exactly `codename`.
    pub async fn device_latest_version(&self, codename: &str) -> Result<Option<Update>> {
        let filter = ReleaseFilter {
            codename: Some(codename.to_string()),
            ..ReleaseFilter::branch(Branch::Stable)
        };
        let releases = self
            .storage
            .load_full_releases(&filter, self.working_set_limit)
            .await?;
        Ok(latest_per_partition(releases, |u| u.codename.clone())
            .into_iter()
            .next())
    }

    /// Every `Full` release of the matching regional variants, newest first.
    pub async fn device_roms(&self, codename: &str) -> Result<Vec<ResolvedUpdate>> {
        let filter = ReleaseFilter {
            branch: BranchScope::StableOrWeekly,
            codename_prefix: Some(codename.to_string()),
            ..Default::default()
        };
        let releases = self
            .storage
            .load_full_releases(&filter, self.working_set_limit)
            .await?;
        let devices = self.device_index().await?;
        Ok(join_devices(releases, &devices, Device::is_supported))
    }

    /// One firmware row per distinct md5, newest first.
    ///
    /// Rows without an md5 are never merged with each other.
    pub async fn latest_firmware(&self) -> Result<Vec<ResolvedFirmware>> {
        let firmware = self.storage.load_firmware(self.working_set_limit).await?;
        let latest = latest_per_partition(firmware, |f| match &f.md5 {
            Some(md5) => (true, md5.clone()),
            None => (false, f.filename.clone()),
        });

        let devices = self.device_index().await?;
        Ok(latest
            .into_iter()
            .filter_map(|firmware| {
                devices.get(&firmware.codename).map(|d| ResolvedFirmware {
                    full_name: d.display_name(),
                    firmware,
                })
            })
            .collect())
    }

    // ============ Point lookups ============

    pub async fn update_by_version(&self, version: &str, method: Method) -> Result<Option<Update>> {
        self.storage.update_by_version(version, method).await
    }

    pub async fn incremental(&self, version: &str) -> Result<Option<Update>> {
        self.storage.incremental(version).await
    }

    pub async fn update_by_filename(&self, filename: &str) -> Result<Option<Update>> {
        self.storage.update_by_filename(filename).await
    }

    pub async fn version_for(&self, codename: &str, branch: &Branch) -> Result<Option<String>> {
        self.storage.version_for(codename, branch).await
    }

    /// Marketing name, e.g. "Redmi Note 5"
    pub async fn device_name(&self, codename: &str) -> Result<Option<String>> {
        Ok(self.storage.get_device(codename).await?.map(|d| d.name))
    }

    /// "name region", e.g. "Redmi Note 5 Global"
    pub async fn full_name(&self, codename: &str) -> Result<Option<String>> {
        Ok(self
            .storage
            .get_device(codename)
            .await?
            .map(|d| d.display_name()))
    }

    pub async fn codename_by_miui_name(&self, miui_name: &str) -> Result<Option<String>> {
        self.storage.codename_by_miui_name(miui_name).await
    }

    // ============ internals ============

    async fn resolve<K, F>(
        &self,
        filter: &ReleaseFilter,
        key: F,
        eligible: Eligibility,
    ) -> Result<Vec<ResolvedUpdate>>
    where
        K: Eq + Hash,
        F: Fn(&Update) -> K,
    {
        let releases = self
            .storage
            .load_full_releases(filter, self.working_set_limit)
            .await?;
        let scanned = releases.len();
        let latest = latest_per_partition(releases, key);

        let devices = self.device_index().await?;
        let resolved = join_devices(latest, &devices, eligible);
        debug!(
            "Resolved {} of {} releases for {:?}",
            resolved.len(),
            scanned,
            filter
        );
        Ok(resolved)
    }

    async fn device_index(&self) -> Result<HashMap<String, Device>> {
        let devices = self.storage.load_devices().await?;
        Ok(devices
            .into_iter()
            .map(|d| (d.codename.clone(), d))
            .collect())
    }
}

/// Attach device names, dropping releases whose device is missing or not
/// eligible. Input order is preserved.
fn join_devices(
    releases: Vec<Update>,
    devices: &HashMap<String, Device>,
    eligible: Eligibility,
) -> Vec<ResolvedUpdate> {
    releases
        .into_iter()
        .filter_map(|update| {
            let device = devices.get(&update.codename).filter(|d| eligible(d))?;
            Some(ResolvedUpdate {
                device_name: device.name.clone(),
                full_name: device.display_name(),
                update,
            })
        })
        .collect()
}
