//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use release_tracker::config::DatabaseConfig;
use release_tracker::storage::{
    Branch, Candidate, Device, Method, NewFirmwareUpdate, NewUpdate, SeaOrmStorage,
    StorageFactory, UpdateType,
};
use tempfile::TempDir;

/// 创建临时 SQLite 数据库的存储实例
pub async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = open_storage(&temp_dir).await;
    (storage, temp_dir)
}

/// 打开（或重新打开）临时目录中的数据库
pub async fn open_storage(temp_dir: &TempDir) -> Arc<SeaOrmStorage> {
    let db_path = temp_dir.path().join("updates.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };
    StorageFactory::create(&config)
        .await
        .expect("Failed to create storage")
}

pub fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

pub fn device(codename: &str, miui_code: &str) -> Device {
    Device {
        codename: codename.to_string(),
        name: format!("Phone {}", codename),
        region: "Global".to_string(),
        miui_name: format!("{}_global", codename),
        miui_code: miui_code.to_string(),
        mi_website_id: None,
        picture: None,
        eol: false,
        firmware_updater: false,
    }
}

pub async fn register(storage: &SeaOrmStorage, device: Device) {
    assert!(storage.register_device(&device).await.unwrap());
}

/// Full / Stable / Recovery release; filename derived from the fields.
pub fn release(codename: &str, version: &str, date: Option<NaiveDate>) -> NewUpdate {
    NewUpdate {
        codename: codename.to_string(),
        version: version.to_string(),
        android: "13".to_string(),
        branch: Branch::Stable,
        update_type: UpdateType::Full,
        method: Method::Recovery,
        size: Some(4_500_000_000),
        md5: None,
        filename: format!("{}_{}.zip", codename, version),
        link: format!("https://example.com/{}/{}.zip", codename, version),
        changelog: None,
        date,
    }
}

pub fn on(mut update: NewUpdate, branch: Branch, method: Method) -> NewUpdate {
    update.filename = format!(
        "{}_{}_{}_{}.zip",
        update.codename,
        update.version,
        branch.as_str().replace(' ', "_"),
        method
    );
    update.branch = branch;
    update.method = method;
    update
}

pub fn firmware(codename: &str, version: &str, md5: Option<&str>) -> NewFirmwareUpdate {
    NewFirmwareUpdate {
        codename: codename.to_string(),
        version: version.to_string(),
        android: "13".to_string(),
        branch: Branch::Stable,
        size: Some(150_000_000),
        md5: md5.map(str::to_string),
        filename: format!("fw_{}_{}.zip", codename, version),
        github_link: format!("https://github.com/fw/{}/{}.zip", codename, version),
        osdn_link: None,
        date: date(2023, 5, 1),
    }
}

pub fn md5(seed: char) -> String {
    std::iter::repeat_n(seed, 32).collect()
}

pub async fn ingest(storage: &SeaOrmStorage, update: NewUpdate) {
    storage.insert_update(&update).await.unwrap();
}

pub fn as_candidate(update: NewUpdate) -> Candidate {
    Candidate::Update(update)
}
