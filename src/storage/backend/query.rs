//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations. Lookups return
//! `Ok(None)` / empty collections when nothing matches; only backend failures
//! become errors.

use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{NullOrdering, Order},
};
use tracing::debug;

use super::converters::{model_to_device, model_to_firmware, model_to_update};
use super::{BranchScope, ReleaseFilter, SeaOrmStorage, retry};
use crate::errors::Result;
use crate::storage::models::{Branch, Device, FirmwareUpdate, Method, Update, UpdateType};

use migration::entities::{device, firmware_update, update};

impl SeaOrmStorage {
    // ------------------------------------------------------------------
    // devices
    // ------------------------------------------------------------------

    pub async fn get_device(&self, codename: &str) -> Result<Option<Device>> {
        let db = &self.db;
        let model = retry::with_retry(&format!("get_device({})", codename), self.retry_config, || async {
            device::Entity::find()
                .filter(device::Column::Codename.eq(codename))
                .one(db)
                .await
        })
        .await?;

        Ok(model.map(model_to_device))
    }

    pub async fn device_exists(&self, codename: &str) -> Result<bool> {
        let db = &self.db;
        let count = retry::with_retry(&format!("device_exists({})", codename), self.retry_config, || async {
            device::Entity::find()
                .filter(device::Column::Codename.eq(codename))
                .count(db)
                .await
        })
        .await?;
        Ok(count > 0)
    }

    /// 加载所有设备（按 codename 排序）
    pub async fn load_devices(&self) -> Result<Vec<Device>> {
        let db = &self.db;
        let models = retry::with_retry("load_devices", self.retry_config, || async {
            device::Entity::find()
                .order_by_asc(device::Column::Codename)
                .all(db)
                .await
        })
        .await?;

        debug!("Loaded {} devices", models.len());
        Ok(models.into_iter().map(model_to_device).collect())
    }

    /// 非 EOL 设备（按 codename 排序）
    ///
    /// 4 字符代码的长度判断在 Rust 侧完成，避免各数据库 LENGTH 语义差异。
    async fn load_live_devices(&self, extra: Condition) -> Result<Vec<Device>> {
        let db = &self.db;
        let models = retry::with_retry("load_live_devices", self.retry_config, || async {
            device::Entity::find()
                .filter(device::Column::Eol.eq(false))
                .filter(extra.clone())
                .order_by_asc(device::Column::Codename)
                .all(db)
                .await
        })
        .await?;

        Ok(models.into_iter().map(model_to_device).collect())
    }

    /// Non-EOL devices with a valid 4-character vendor code.
    pub async fn current_devices(&self) -> Result<Vec<Device>> {
        let devices = self
            .load_live_devices(Condition::all().add(device::Column::MiuiCode.ne("")))
            .await?;
        Ok(devices.into_iter().filter(Device::is_current).collect())
    }

    /// Non-EOL devices opted into firmware tracking.
    pub async fn firmware_devices(&self) -> Result<Vec<Device>> {
        let devices = self
            .load_live_devices(Condition::all().add(device::Column::FirmwareUpdater.eq(true)))
            .await?;
        Ok(devices.into_iter().filter(Device::tracks_firmware).collect())
    }

    /// Non-EOL devices listed on the vendor website.
    pub async fn website_devices(&self) -> Result<Vec<Device>> {
        self.load_live_devices(Condition::all().add(device::Column::MiWebsiteId.is_not_null()))
            .await
    }

    pub async fn codename_by_miui_name(&self, miui_name: &str) -> Result<Option<String>> {
        let db = &self.db;
        let codename = retry::with_retry("codename_by_miui_name", self.retry_config, || async {
            device::Entity::find()
                .select_only()
                .column(device::Column::Codename)
                .filter(device::Column::MiuiName.eq(miui_name))
                .order_by_asc(device::Column::Id)
                .into_tuple::<String>()
                .one(db)
                .await
        })
        .await?;
        Ok(codename)
    }

    // ------------------------------------------------------------------
    // updates
    // ------------------------------------------------------------------

    pub async fn update_by_filename(&self, filename: &str) -> Result<Option<Update>> {
        let db = &self.db;
        let model = retry::with_retry(&format!("update_by_filename({})", filename), self.retry_config, || async {
            update::Entity::find()
                .filter(update::Column::Filename.eq(filename))
                .one(db)
                .await
        })
        .await?;
        model.map(model_to_update).transpose()
    }

    pub async fn update_exists(&self, filename: &str) -> Result<bool> {
        let db = &self.db;
        let count = retry::with_retry(&format!("update_exists({})", filename), self.retry_config, || async {
            update::Entity::find()
                .filter(update::Column::Filename.eq(filename))
                .count(db)
                .await
        })
        .await?;
        Ok(count > 0)
    }

    /// First `Full` release with this exact version and method.
    pub async fn update_by_version(&self, version: &str, method: Method) -> Result<Option<Update>> {
        let db = &self.db;
        let model = retry::with_retry(&format!("update_by_version({})", version), self.retry_config, || async {
            update::Entity::find()
                .filter(update::Column::Version.eq(version))
                .filter(update::Column::Method.eq(method.as_ref()))
                .filter(update::Column::UpdateType.eq(UpdateType::Full.as_ref()))
                .order_by_asc(update::Column::Id)
                .one(db)
                .await
        })
        .await?;
        model.map(model_to_update).transpose()
    }

    /// First `Incremental` release with this version.
    pub async fn incremental(&self, version: &str) -> Result<Option<Update>> {
        let db = &self.db;
        let model = retry::with_retry(&format!("incremental({})", version), self.retry_config, || async {
            update::Entity::find()
                .filter(update::Column::Version.eq(version))
                .filter(update::Column::UpdateType.eq(UpdateType::Incremental.as_ref()))
                .order_by_asc(update::Column::Id)
                .one(db)
                .await
        })
        .await?;
        model.map(model_to_update).transpose()
    }

    /// Version of the first stored release for `(codename, branch)`.
    pub async fn version_for(&self, codename: &str, branch: &Branch) -> Result<Option<String>> {
        let db = &self.db;
        let version = retry::with_retry("version_for", self.retry_config, || async {
            update::Entity::find()
                .select_only()
                .column(update::Column::Version)
                .filter(update::Column::Codename.eq(codename))
                .filter(update::Column::Branch.eq(branch.as_str()))
                .order_by_asc(update::Column::Id)
                .into_tuple::<String>()
                .one(db)
                .await
        })
        .await?;
        Ok(version)
    }

    pub async fn count_updates(&self) -> Result<u64> {
        let db = &self.db;
        Ok(retry::with_retry("count_updates", self.retry_config, || update::Entity::find().count(db)).await?)
    }

    /// `Full` releases matching `filter`, newest first, at most `limit` rows.
    ///
    /// 排序：date DESC（NULL 在最后），id DESC。
    pub async fn load_full_releases(&self, filter: &ReleaseFilter, limit: u64) -> Result<Vec<Update>> {
        let mut condition =
            Condition::all().add(update::Column::UpdateType.eq(UpdateType::Full.as_ref()));

        condition = match &filter.branch {
            BranchScope::Exact(branch) => condition.add(update::Column::Branch.eq(branch.as_str())),
            BranchScope::StableOrWeekly => condition.add(
                Condition::any()
                    .add(update::Column::Branch.starts_with("Stable"))
                    .add(update::Column::Branch.eq(Branch::Weekly.as_str())),
            ),
        };

        if let Some(method) = filter.method {
            condition = condition.add(update::Column::Method.eq(method.as_ref()));
        }
        if let Some(ref codename) = filter.codename {
            condition = condition.add(update::Column::Codename.eq(codename.as_str()));
        }
        if let Some(ref prefix) = filter.codename_prefix {
            condition = condition.add(update::Column::Codename.starts_with(prefix.as_str()));
        }

        let db = &self.db;
        let models = retry::with_retry("load_full_releases", self.retry_config, || async {
            update::Entity::find()
                .filter(condition.clone())
                .order_by_with_nulls(update::Column::Date, Order::Desc, NullOrdering::Last)
                .order_by_desc(update::Column::Id)
                .limit(limit)
                .all(db)
                .await
        })
        .await?;

        debug!("Loaded {} full releases for {:?}", models.len(), filter);
        models.into_iter().map(model_to_update).collect()
    }

    // ------------------------------------------------------------------
    // firmware
    // ------------------------------------------------------------------

    pub async fn firmware_exists(&self, codename: &str, version: &str) -> Result<bool> {
        let db = &self.db;
        let count = retry::with_retry("firmware_exists", self.retry_config, || async {
            firmware_update::Entity::find()
                .filter(firmware_update::Column::Codename.eq(codename))
                .filter(firmware_update::Column::Version.eq(version))
                .count(db)
                .await
        })
        .await?;
        Ok(count > 0)
    }

    pub async fn count_firmware(&self) -> Result<u64> {
        let db = &self.db;
        Ok(retry::with_retry("count_firmware", self.retry_config, || firmware_update::Entity::find().count(db)).await?)
    }

    /// All firmware rows, newest first, at most `limit` rows.
    pub async fn load_firmware(&self, limit: u64) -> Result<Vec<FirmwareUpdate>> {
        let db = &self.db;
        let models = retry::with_retry("load_firmware", self.retry_config, || async {
            firmware_update::Entity::find()
                .order_by_with_nulls(firmware_update::Column::Date, Order::Desc, NullOrdering::Last)
                .order_by_desc(firmware_update::Column::Id)
                .limit(limit)
                .all(db)
                .await
        })
        .await?;

        Ok(models.into_iter().map(model_to_firmware).collect())
    }
}
