//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

mod config_gen;
mod export;
mod ingest;
mod init;
mod query;

pub use config_gen::*;
pub use export::*;
pub use ingest::*;
pub use init::*;
pub use query::*;
