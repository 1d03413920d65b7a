//! Release tracker - OS and firmware release history per device
//!
//! This library stores scraped release records exactly once, resolves the
//! latest release per device/branch/method and renders JSON snapshots.
//!
//! # Architecture
//! - `storage`: SeaORM backend (SQLite, MySQL/MariaDB, PostgreSQL) and models
//! - `services`: ingestion, resolution, branch promotion and export
//! - `interfaces`: command-line interface
//! - `config`: Configuration management
//! - `system`: Logging setup
//! - `utils`: Formatting helpers

pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
