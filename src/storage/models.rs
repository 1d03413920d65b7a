use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Changelog stored when the vendor did not publish one.
pub const DEFAULT_CHANGELOG: &str = "Bug fixes and system optimizations.";

/// Release channel of a build.
///
/// Vendors occasionally add channels; anything unknown is kept verbatim in
/// `Other` so ingestion never rejects a record because of its branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Branch {
    Stable,
    StableBeta,
    Weekly,
    Other(String),
}

impl Branch {
    /// Branches aggregated by the "all latest" export, in output order.
    pub const TRACKED: [Branch; 3] = [Branch::Stable, Branch::StableBeta, Branch::Weekly];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Stable => "Stable",
            Self::StableBeta => "Stable Beta",
            Self::Weekly => "Weekly",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Branch {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl From<String> for Branch {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Stable" => Self::Stable,
            "Stable Beta" => Self::StableBeta,
            "Weekly" => Self::Weekly,
            _ => Self::Other(s),
        }
    }
}

impl From<Branch> for String {
    fn from(branch: Branch) -> Self {
        match branch {
            Branch::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Complete image or delta from a prior version
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum UpdateType {
    Full,
    Incremental,
}

/// Installation mechanism
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Method {
    #[default]
    Recovery,
    Fastboot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub codename: String,
    pub name: String,
    pub region: String,
    pub miui_name: String,
    pub miui_code: String,
    #[serde(default)]
    pub mi_website_id: Option<i32>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub eol: bool,
    #[serde(default)]
    pub firmware_updater: bool,
}

impl Device {
    /// The vendor code is present and exactly four characters long.
    pub fn is_supported(&self) -> bool {
        self.miui_code.chars().count() == 4
    }

    /// Supported and not end-of-life.
    pub fn is_current(&self) -> bool {
        !self.eol && self.is_supported()
    }

    /// Firmware tracking opted in and not end-of-life.
    pub fn tracks_firmware(&self) -> bool {
        !self.eol && self.firmware_updater
    }

    /// "name region", e.g. "Redmi Note 5 Global"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.region)
    }
}

/// Stored OS release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub id: i32,
    pub codename: String,
    pub version: String,
    pub android: String,
    pub branch: Branch,
    #[serde(rename = "type")]
    pub update_type: UpdateType,
    pub method: Method,
    pub size: Option<i64>,
    pub md5: Option<String>,
    pub filename: String,
    pub link: String,
    pub changelog: String,
    pub date: Option<NaiveDate>,
    pub inserted_on: DateTime<Utc>,
}

/// OS release candidate as produced by a scraper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUpdate {
    pub codename: String,
    pub version: String,
    pub android: String,
    pub branch: Branch,
    #[serde(rename = "type")]
    pub update_type: UpdateType,
    pub method: Method,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub md5: Option<String>,
    pub filename: String,
    pub link: String,
    #[serde(default)]
    pub changelog: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Stored firmware package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareUpdate {
    pub id: i32,
    pub codename: String,
    pub version: String,
    pub android: String,
    pub branch: Branch,
    pub size: Option<i64>,
    pub md5: Option<String>,
    pub filename: String,
    pub github_link: String,
    pub osdn_link: Option<String>,
    pub date: Option<NaiveDate>,
    pub inserted_on: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFirmwareUpdate {
    pub codename: String,
    pub version: String,
    pub android: String,
    pub branch: Branch,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub md5: Option<String>,
    pub filename: String,
    pub github_link: String,
    #[serde(default)]
    pub osdn_link: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Anything the ingestion engine accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Candidate {
    Update(NewUpdate),
    Firmware(NewFirmwareUpdate),
}

impl Candidate {
    pub fn filename(&self) -> &str {
        match self {
            Candidate::Update(u) => &u.filename,
            Candidate::Firmware(f) => &f.filename,
        }
    }

    pub fn codename(&self) -> &str {
        match self {
            Candidate::Update(u) => &u.codename,
            Candidate::Firmware(f) => &f.codename,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IngestOutcome {
    Inserted,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PromotionOutcome {
    /// `Stable Beta` record rewritten to `Stable`
    Promoted,
    AlreadyStable,
    /// Record is on a terminal branch (`Weekly`, ...)
    NotPromotable,
    NotFound,
}

/// `(codename, version, android)` row of the per-device latest query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestVersion {
    pub codename: String,
    pub version: String,
    pub android: String,
}

/// Resolved release joined with its device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedUpdate {
    /// Device marketing name
    pub device_name: String,
    /// "name region"
    pub full_name: String,
    pub update: Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFirmware {
    pub full_name: String,
    pub firmware: FirmwareUpdate,
}
