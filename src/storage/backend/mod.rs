//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, TrackerError};
use crate::storage::models::{Branch, Method};

pub use connection::{connect_generic, connect_sqlite, ensure_schema};
pub use converters::{
    device_to_active_model, model_to_device, model_to_firmware, model_to_update,
    new_firmware_to_active_model, new_update_to_active_model,
};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(TrackerError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 分支范围
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BranchScope {
    Exact(Branch),
    /// Any `Stable*` branch plus `Weekly`
    StableOrWeekly,
}

impl Default for BranchScope {
    fn default() -> Self {
        BranchScope::Exact(Branch::Stable)
    }
}

/// Filter for the `Full` release scans feeding the resolution engine.
#[derive(Default, Clone, Debug)]
pub struct ReleaseFilter {
    pub branch: BranchScope,
    pub method: Option<Method>,
    /// 精确匹配 codename
    pub codename: Option<String>,
    /// codename 前缀匹配（区域变体，如 `whyred` 匹配 `whyred_global`）
    pub codename_prefix: Option<String>,
}

impl ReleaseFilter {
    pub fn branch(branch: Branch) -> Self {
        Self {
            branch: BranchScope::Exact(branch),
            ..Default::default()
        }
    }
}

/// SeaORM-based storage client
///
/// Constructed once by the caller and shared (`Arc`) between the services.
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    /// Connect and make sure the schema exists.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.connection_url()?;
        if database_url.is_empty() {
            return Err(TrackerError::database_config("DATABASE_URL 未设置"));
        }

        let backend_name = infer_backend_from_url(&database_url)?;

        let db = if backend_name == "sqlite" {
            connect_sqlite(&database_url).await?
        } else {
            connect_generic(&database_url, &backend_name, config).await?
        };

        let storage = Self::from_connection(db, &backend_name, retry::RetryConfig::from(config));
        ensure_schema(&storage.db).await?;

        info!(
            "{} storage initialized",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    /// Wrap an already open connection. The schema is not touched.
    pub fn from_connection(
        db: DatabaseConnection,
        backend_name: &str,
        retry_config: retry::RetryConfig,
    ) -> Self {
        SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry_config,
        }
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}
