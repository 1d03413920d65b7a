//! Release tracking services
//!
//! Each service holds an `Arc<SeaOrmStorage>` handed in by the caller.

pub mod export;
pub mod ingestion;
pub mod promotion;
pub mod resolution;

pub use export::{DeviceExport, ExportService, SnapshotEntry, write_json};
pub use ingestion::{IngestFailure, IngestReport, IngestionService, validate_candidate};
pub use promotion::PromotionService;
pub use resolution::ResolutionService;
