use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::{BranchScope, ReleaseFilter, SeaOrmStorage};
pub use models::{
    Branch, Candidate, DEFAULT_CHANGELOG, Device, FirmwareUpdate, IngestOutcome, LatestVersion,
    Method, NewFirmwareUpdate, NewUpdate, PromotionOutcome, ResolvedFirmware, ResolvedUpdate,
    Update, UpdateType,
};

pub struct StorageFactory;

impl StorageFactory {
    /// Open the storage client described by `[database]` and ensure the schema.
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStorage>> {
        let storage = SeaOrmStorage::new(config).await?;
        Ok(Arc::new(storage))
    }
}
