use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrackerError};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - database: 数据库连接与隧道参数
/// - resolution: 最新版本解析的工作集上限
/// - export: 快照输出路径
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：TRACKER，分隔符：__
    /// 示例：TRACKER__DATABASE__DATABASE_URL=sqlite://updates.db
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("TRACKER")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let mut sample_config = Self::default();
        sample_config.database.tunnel = Some(TunnelConfig::default());
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TrackerError::serialization(format!("配置序列化失败: {}", e)))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Connect straight to `database_url`. When false, the connection goes
    /// through the local end of an externally managed tunnel.
    #[serde(default = "default_local_db")]
    pub local_db: bool,
    #[serde(default)]
    pub tunnel: Option<TunnelConfig>,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl DatabaseConfig {
    /// The URL the storage layer should actually dial.
    ///
    /// With `local_db = false` the host and port of `database_url` are replaced
    /// by `127.0.0.1:<tunnel.local_port>`. Opening the tunnel is the caller's
    /// business.
    pub fn connection_url(&self) -> Result<String> {
        if self.local_db {
            return Ok(self.database_url.clone());
        }

        let tunnel = self.tunnel.as_ref().ok_or_else(|| {
            TrackerError::database_config("local_db = false 但未配置 [database.tunnel]")
        })?;

        let mut url = url::Url::parse(&self.database_url).map_err(|e| {
            TrackerError::database_config(format!("数据库 URL 解析失败: {}", e))
        })?;

        if url.scheme() == "sqlite" {
            return Err(TrackerError::database_config(
                "SQLite 数据库不能通过隧道连接",
            ));
        }

        url.set_host(Some("127.0.0.1"))
            .map_err(|e| TrackerError::database_config(format!("无法改写主机: {}", e)))?;
        url.set_port(Some(tunnel.local_port))
            .map_err(|_| TrackerError::database_config("无法改写端口"))?;

        Ok(url.to_string())
    }
}

/// 隧道参数（隧道本身由外部组件建立）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunnelConfig {
    pub ssh_host: String,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    pub ssh_user: String,
    #[serde(default = "default_tunnel_local_port")]
    pub local_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Upper bound on rows pulled into a single latest-release scan.
    #[serde(default = "default_working_set_limit")]
    pub working_set_limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_latest_path")]
    pub latest_path: String,
    #[serde(default = "default_devices_path")]
    pub devices_path: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_database_url() -> String {
    "sqlite://updates.db?mode=rwc".to_string()
}

fn default_local_db() -> bool {
    true
}

fn default_database_pool_size() -> u32 {
    5
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_ssh_port() -> u16 {
    22
}

fn default_tunnel_local_port() -> u16 {
    3307
}

fn default_working_set_limit() -> u64 {
    99999
}

fn default_latest_path() -> String {
    "data/latest.json".to_string()
}

fn default_devices_path() -> String {
    "data/devices.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            local_db: default_local_db(),
            tunnel: None,
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            ssh_host: "db.example.com".to_string(),
            ssh_port: default_ssh_port(),
            ssh_user: "tracker".to_string(),
            local_port: default_tunnel_local_port(),
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            working_set_limit: default_working_set_limit(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            latest_path: default_latest_path(),
            devices_path: default_devices_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.resolution.working_set_limit, 99999);
        assert!(config.database.local_db);
        assert!(config.database.tunnel.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_local_db_uses_url_verbatim() {
        let config = DatabaseConfig {
            database_url: "mysql://user:pw@db.internal:3306/updates".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.connection_url().unwrap(),
            "mysql://user:pw@db.internal:3306/updates"
        );
    }

    #[test]
    fn test_tunnel_rewrites_host_and_port() {
        let config = DatabaseConfig {
            database_url: "mysql://user:pw@db.internal:3306/updates".to_string(),
            local_db: false,
            tunnel: Some(TunnelConfig {
                local_port: 4406,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            config.connection_url().unwrap(),
            "mysql://user:pw@127.0.0.1:4406/updates"
        );
    }

    #[test]
    fn test_tunnel_missing_is_config_error() {
        let config = DatabaseConfig {
            database_url: "mysql://user:pw@db.internal:3306/updates".to_string(),
            local_db: false,
            ..Default::default()
        };
        assert!(matches!(
            config.connection_url(),
            Err(TrackerError::DatabaseConfig(_))
        ));
    }

    #[test]
    fn test_sample_config_roundtrips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.resolution.working_set_limit, 99999);
        assert_eq!(parsed.database.tunnel.unwrap().ssh_port, 22);
    }
}
