//! Mutation operations for SeaOrmStorage
//!
//! Release rows are append-only. The only in-place write on an ingested
//! release is `promote_stable_beta`.

use sea_orm::{
    ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, SqlErr, TransactionTrait,
    sea_query::Expr,
};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{
    device_to_active_model, new_firmware_to_active_model, new_update_to_active_model,
    normalize_md5,
};
use super::retry;
use crate::errors::{Result, TrackerError};
use crate::storage::models::{Branch, Device, IngestOutcome, NewFirmwareUpdate, NewUpdate};

use migration::entities::{device, firmware_update, update};

/// One check-then-insert transaction. The outer error is a backend failure
/// (retried on lock contention), the inner result is the ingestion verdict.
type InsertAttempt = std::result::Result<Result<IngestOutcome>, DbErr>;

/// Classify an insert/commit failure. A unique-key rejection means another
/// writer got there first and is reported as `AlreadyPresent`; a dangling
/// device reference is a `ConstraintViolation`. Anything else stays a backend
/// error.
fn classify_insert_error(err: DbErr, filename: &str) -> InsertAttempt {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            debug!("Duplicate rejected by backend for {}: {}", filename, detail);
            Ok(Ok(IngestOutcome::AlreadyPresent))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => Ok(Err(
            TrackerError::constraint_violation(format!("外键约束失败 ({}): {}", filename, detail)),
        )),
        _ => Err(err),
    }
}

impl SeaOrmStorage {
    /// 注册设备（已存在时不做任何修改）
    ///
    /// Returns `true` when a new row was written.
    pub async fn register_device(&self, device: &Device) -> Result<bool> {
        if self.device_exists(&device.codename).await? {
            return Ok(false);
        }

        match device::Entity::insert(device_to_active_model(device))
            .exec(&self.db)
            .await
        {
            Ok(_) => {
                info!("Device registered: {}", device.codename);
                Ok(true)
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(TrackerError::database_operation(format!(
                "注册设备 '{}' 失败: {}",
                device.codename, e
            ))),
        }
    }

    /// 标记设备 EOL 状态，返回是否找到该设备
    pub async fn set_device_eol(&self, codename: &str, eol: bool) -> Result<bool> {
        let db = &self.db;
        let result = retry::with_retry(
            &format!("set_device_eol({})", codename),
            self.retry_config,
            || async {
                device::Entity::update_many()
                    .col_expr(device::Column::Eol, Expr::value(eol))
                    .filter(device::Column::Codename.eq(codename))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| TrackerError::database_operation(format!("更新 EOL 失败: {}", e)))?;

        Ok(result.rows_affected > 0)
    }

    /// 插入 OS 更新（按 filename / md5 去重）
    ///
    /// The existence checks and the insert share one transaction; the unique
    /// indexes on `filename` and `md5` catch whatever slips between them. The
    /// whole transaction is re-run on lock contention, so a writer that lost
    /// the race sees the committed row and reports `AlreadyPresent`.
    pub async fn insert_update(&self, candidate: &NewUpdate) -> Result<IngestOutcome> {
        let outcome = retry::with_retry(
            &format!("insert_update({})", candidate.filename),
            self.retry_config,
            || self.try_insert_update(candidate),
        )
        .await??;

        if outcome == IngestOutcome::Inserted {
            info!(
                "Update inserted: {} {} {} ({})",
                candidate.codename, candidate.version, candidate.branch, candidate.filename
            );
        }
        Ok(outcome)
    }

    async fn try_insert_update(&self, candidate: &NewUpdate) -> InsertAttempt {
        let txn = self.db.begin().await?;

        let by_filename = update::Entity::find()
            .filter(update::Column::Filename.eq(&candidate.filename))
            .count(&txn)
            .await?;
        if by_filename > 0 {
            debug!("Update already present: {}", candidate.filename);
            return Ok(Ok(IngestOutcome::AlreadyPresent));
        }

        if let Some(md5) = normalize_md5(candidate.md5.as_deref()) {
            let by_md5 = update::Entity::find()
                .filter(update::Column::Md5.eq(&md5))
                .count(&txn)
                .await?;
            if by_md5 > 0 {
                debug!(
                    "Update content already present (md5 {}): {}",
                    md5, candidate.filename
                );
                return Ok(Ok(IngestOutcome::AlreadyPresent));
            }
        }

        let owner = device::Entity::find()
            .filter(device::Column::Codename.eq(&candidate.codename))
            .one(&txn)
            .await?;
        if owner.is_none() {
            return Ok(Err(TrackerError::constraint_violation(format!(
                "设备不存在: {} (filename: {})",
                candidate.codename, candidate.filename
            ))));
        }

        if let Err(e) = update::Entity::insert(new_update_to_active_model(candidate))
            .exec(&txn)
            .await
        {
            return classify_insert_error(e, &candidate.filename);
        }
        if let Err(e) = txn.commit().await {
            return classify_insert_error(e, &candidate.filename);
        }
        Ok(Ok(IngestOutcome::Inserted))
    }

    /// 插入固件更新，设备必须开启 firmware_updater
    pub async fn insert_firmware(&self, candidate: &NewFirmwareUpdate) -> Result<IngestOutcome> {
        let outcome = retry::with_retry(
            &format!("insert_firmware({})", candidate.filename),
            self.retry_config,
            || self.try_insert_firmware(candidate),
        )
        .await??;

        if outcome == IngestOutcome::Inserted {
            info!(
                "Firmware inserted: {} {} ({})",
                candidate.codename, candidate.version, candidate.filename
            );
        }
        Ok(outcome)
    }

    async fn try_insert_firmware(&self, candidate: &NewFirmwareUpdate) -> InsertAttempt {
        let txn = self.db.begin().await?;

        let by_filename = firmware_update::Entity::find()
            .filter(firmware_update::Column::Filename.eq(&candidate.filename))
            .count(&txn)
            .await?;
        if by_filename > 0 {
            debug!("Firmware already present: {}", candidate.filename);
            return Ok(Ok(IngestOutcome::AlreadyPresent));
        }

        if let Some(md5) = normalize_md5(candidate.md5.as_deref()) {
            let by_md5 = firmware_update::Entity::find()
                .filter(firmware_update::Column::Md5.eq(&md5))
                .count(&txn)
                .await?;
            if by_md5 > 0 {
                debug!(
                    "Firmware content already present (md5 {}): {}",
                    md5, candidate.filename
                );
                return Ok(Ok(IngestOutcome::AlreadyPresent));
            }
        }

        let owner = device::Entity::find()
            .filter(device::Column::Codename.eq(&candidate.codename))
            .one(&txn)
            .await?;
        match owner {
            None => {
                return Ok(Err(TrackerError::constraint_violation(format!(
                    "设备不存在: {} (filename: {})",
                    candidate.codename, candidate.filename
                ))));
            }
            Some(owner) if !owner.firmware_updater => {
                return Ok(Err(TrackerError::constraint_violation(format!(
                    "设备未开启固件追踪: {} (filename: {})",
                    candidate.codename, candidate.filename
                ))));
            }
            Some(_) => {}
        }

        if let Err(e) = firmware_update::Entity::insert(new_firmware_to_active_model(candidate))
            .exec(&txn)
            .await
        {
            return classify_insert_error(e, &candidate.filename);
        }
        if let Err(e) = txn.commit().await {
            return classify_insert_error(e, &candidate.filename);
        }
        Ok(Ok(IngestOutcome::Inserted))
    }

    /// `Stable Beta` -> `Stable` for one release row.
    ///
    /// The branch condition is part of the UPDATE, so a concurrent or repeated
    /// promotion touches nothing. Returns whether this call changed the row.
    pub async fn promote_stable_beta(&self, id: i32) -> Result<bool> {
        let db = &self.db;
        let result = retry::with_retry(
            &format!("promote_stable_beta({})", id),
            self.retry_config,
            || async {
                update::Entity::update_many()
                    .col_expr(
                        update::Column::Branch,
                        Expr::value(Branch::Stable.as_str()),
                    )
                    .filter(update::Column::Id.eq(id))
                    .filter(update::Column::Branch.eq(Branch::StableBeta.as_str()))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| TrackerError::database_operation(format!("分支晋升失败: {}", e)))?;

        Ok(result.rows_affected == 1)
    }
}
