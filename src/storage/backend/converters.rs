use chrono::Utc;

use crate::errors::{Result, TrackerError};
use crate::storage::models::{
    DEFAULT_CHANGELOG, Device, FirmwareUpdate, NewFirmwareUpdate, NewUpdate, Update,
};
use migration::entities::{device, firmware_update, update};

/// 将 Sea-ORM Model 转换为 Device
pub fn model_to_device(model: device::Model) -> Device {
    Device {
        codename: model.codename,
        name: model.name,
        region: model.region,
        miui_name: model.miui_name,
        miui_code: model.miui_code,
        mi_website_id: model.mi_website_id,
        picture: model.picture,
        eol: model.eol,
        firmware_updater: model.firmware_updater,
    }
}

/// 将 Device 转换为 ActiveModel（id 由数据库分配）
pub fn device_to_active_model(device: &Device) -> device::ActiveModel {
    use sea_orm::ActiveValue::*;

    device::ActiveModel {
        id: NotSet,
        name: Set(device.name.clone()),
        codename: Set(device.codename.clone()),
        region: Set(device.region.clone()),
        miui_name: Set(device.miui_name.clone()),
        miui_code: Set(device.miui_code.clone()),
        mi_website_id: Set(device.mi_website_id),
        picture: Set(device.picture.clone()),
        eol: Set(device.eol),
        firmware_updater: Set(device.firmware_updater),
    }
}

/// 将 Sea-ORM Model 转换为 Update
///
/// `type`/`method` 列只会写入已知值，读到未知值说明数据被外部改动过。
pub fn model_to_update(model: update::Model) -> Result<Update> {
    let update_type = model.update_type.parse().map_err(|_| {
        TrackerError::serialization(format!(
            "未知的更新类型 '{}' (filename: {})",
            model.update_type, model.filename
        ))
    })?;
    let method = model.method.parse().map_err(|_| {
        TrackerError::serialization(format!(
            "未知的刷机方式 '{}' (filename: {})",
            model.method, model.filename
        ))
    })?;

    Ok(Update {
        id: model.id,
        codename: model.codename,
        version: model.version,
        android: model.android,
        branch: model.branch.into(),
        update_type,
        method,
        size: model.size,
        md5: model.md5,
        filename: model.filename,
        link: model.link,
        changelog: model
            .changelog
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CHANGELOG.to_string()),
        date: model.date,
        inserted_on: model.inserted_on,
    })
}

/// md5 is stored lower-case so hex case never splits one file into two rows.
pub fn normalize_md5(md5: Option<&str>) -> Option<String> {
    md5.map(str::to_ascii_lowercase)
}

/// 将候选 Update 转换为 ActiveModel（用于插入）
pub fn new_update_to_active_model(candidate: &NewUpdate) -> update::ActiveModel {
    use sea_orm::ActiveValue::*;

    update::ActiveModel {
        id: NotSet,
        codename: Set(candidate.codename.clone()),
        version: Set(candidate.version.clone()),
        android: Set(candidate.android.clone()),
        branch: Set(candidate.branch.to_string()),
        update_type: Set(candidate.update_type.as_ref().to_string()),
        method: Set(candidate.method.as_ref().to_string()),
        size: Set(candidate.size),
        md5: Set(normalize_md5(candidate.md5.as_deref())),
        filename: Set(candidate.filename.clone()),
        link: Set(candidate.link.clone()),
        changelog: Set(Some(
            candidate
                .changelog
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CHANGELOG.to_string()),
        )),
        date: Set(candidate.date),
        inserted_on: Set(Utc::now()),
    }
}

pub fn model_to_firmware(model: firmware_update::Model) -> FirmwareUpdate {
    FirmwareUpdate {
        id: model.id,
        codename: model.codename,
        version: model.version,
        android: model.android,
        branch: model.branch.into(),
        size: model.size,
        md5: model.md5,
        filename: model.filename,
        github_link: model.github_link,
        osdn_link: model.osdn_link,
        date: model.date,
        inserted_on: model.inserted_on,
    }
}

pub fn new_firmware_to_active_model(candidate: &NewFirmwareUpdate) -> firmware_update::ActiveModel {
    use sea_orm::ActiveValue::*;

    firmware_update::ActiveModel {
        id: NotSet,
        codename: Set(candidate.codename.clone()),
        version: Set(candidate.version.clone()),
        android: Set(candidate.android.clone()),
        branch: Set(candidate.branch.to_string()),
        size: Set(candidate.size),
        md5: Set(normalize_md5(candidate.md5.as_deref())),
        filename: Set(candidate.filename.clone()),
        github_link: Set(candidate.github_link.clone()),
        osdn_link: Set(candidate.osdn_link.clone()),
        date: Set(candidate.date),
        inserted_on: Set(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{Branch, Method, UpdateType};
    use chrono::NaiveDate;
    use sea_orm::ActiveValue;

    fn create_test_model() -> update::Model {
        update::Model {
            id: 7,
            codename: "alpha".to_string(),
            version: "V14.0.3.0.TKHMIXM".to_string(),
            android: "13".to_string(),
            branch: "Stable Beta".to_string(),
            update_type: "Full".to_string(),
            method: "Fastboot".to_string(),
            size: Some(3_221_225_472),
            md5: Some("0123456789abcdef0123456789abcdef".to_string()),
            filename: "alpha_global_images_V14.0.3.0.tgz".to_string(),
            link: "https://example.com/alpha.tgz".to_string(),
            changelog: None,
            date: NaiveDate::from_ymd_opt(2023, 3, 1),
            inserted_on: Utc::now(),
        }
    }

    fn create_test_candidate() -> NewUpdate {
        NewUpdate {
            codename: "alpha".to_string(),
            version: "V14.0.3.0.TKHMIXM".to_string(),
            android: "13".to_string(),
            branch: Branch::Stable,
            update_type: UpdateType::Full,
            method: Method::Recovery,
            size: None,
            md5: None,
            filename: "alpha.zip".to_string(),
            link: "https://example.com/alpha.zip".to_string(),
            changelog: Some("   ".to_string()),
            date: None,
        }
    }

    #[test]
    fn test_model_to_update_parses_enums() {
        let update = model_to_update(create_test_model()).unwrap();
        assert_eq!(update.id, 7);
        assert_eq!(update.branch, Branch::StableBeta);
        assert_eq!(update.update_type, UpdateType::Full);
        assert_eq!(update.method, Method::Fastboot);
    }

    #[test]
    fn test_model_to_update_fills_default_changelog() {
        let update = model_to_update(create_test_model()).unwrap();
        assert_eq!(update.changelog, DEFAULT_CHANGELOG);
    }

    #[test]
    fn test_model_to_update_rejects_unknown_method() {
        let mut model = create_test_model();
        model.method = "Sideload".to_string();
        assert!(matches!(
            model_to_update(model),
            Err(TrackerError::Serialization(_))
        ));
    }

    #[test]
    fn test_new_update_to_active_model() {
        let active_model = new_update_to_active_model(&create_test_candidate());

        assert!(matches!(active_model.id, ActiveValue::NotSet));
        assert!(matches!(active_model.inserted_on, ActiveValue::Set(_)));
        if let ActiveValue::Set(branch) = active_model.branch {
            assert_eq!(branch, "Stable");
        }
        if let ActiveValue::Set(method) = active_model.method {
            assert_eq!(method, "Recovery");
        }
        // 空白 changelog 使用默认文案
        if let ActiveValue::Set(changelog) = active_model.changelog {
            assert_eq!(changelog.as_deref(), Some(DEFAULT_CHANGELOG));
        }
    }

    #[test]
    fn test_new_update_md5_stored_lower_case() {
        let mut candidate = create_test_candidate();
        candidate.md5 = Some("0123456789ABCDEF0123456789abcdef".to_string());
        let active_model = new_update_to_active_model(&candidate);
        if let ActiveValue::Set(md5) = active_model.md5 {
            assert_eq!(md5.as_deref(), Some("0123456789abcdef0123456789abcdef"));
        } else {
            panic!("md5 not set");
        }
        assert_eq!(normalize_md5(None), None);
    }

    #[test]
    fn test_device_to_active_model_leaves_id_unset() {
        let device = Device {
            codename: "beta".to_string(),
            name: "Beta".to_string(),
            region: "EEA".to_string(),
            miui_name: "beta_eea".to_string(),
            miui_code: "WXYZ".to_string(),
            mi_website_id: Some(42),
            picture: None,
            eol: false,
            firmware_updater: true,
        };
        let active_model = device_to_active_model(&device);
        assert!(matches!(active_model.id, ActiveValue::NotSet));
        if let ActiveValue::Set(flag) = active_model.firmware_updater {
            assert!(flag);
        }
    }
}
