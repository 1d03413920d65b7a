use std::sync::{Arc, OnceLock};

use super::StaticConfig;

static CONFIG: OnceLock<Arc<StaticConfig>> = OnceLock::new();

/// Initialize the global configuration
///
/// Loads configuration from `path` (default "config.toml"), overlaid by
/// `TRACKER__*` environment variables. Later calls are no-ops.
///
/// # Examples
/// ```no_run
/// use release_tracker::config::init_config;
/// init_config(None);
/// ```
pub fn init_config(path: Option<&str>) -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| Arc::new(StaticConfig::load(path.unwrap_or("config.toml"))))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_is_set_once() {
        let first = init_config(Some("does-not-exist.toml"));
        let second = init_config(Some("also-missing.toml"));
        assert!(Arc::ptr_eq(&first, &second));
        assert!(CONFIG.get().is_some_and(|c| Arc::ptr_eq(c, &first)));
    }
}
