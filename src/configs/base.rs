use serde::{Deserialize, Serialize};

use crate::{common::types::AnyResult, configs::*};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub domains: DomainsConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub muting: MutingConfig,
}

impl Config {
    /// Loads `config.toml`, falling back to `config.default.toml`, then to
    /// built-in defaults when neither file exists.
    pub fn load() -> AnyResult<Self> {
        let config_path = if std::path::Path::new("config.toml").exists() {
            "config.toml"
        } else if std::path::Path::new("config.default.toml").exists() {
            "config.default.toml"
        } else {
            crate::log_println!("No config file found, using defaults");
            return Ok(Self::default());
        };

        crate::log_println!("Loading configuration from: {}", config_path);

        let config_str = std::fs::read_to_string(config_path)?;
        if config_str.trim().is_empty() {
            return Err(format!("{} is empty", config_path).into());
        }

        Self::from_toml(&config_str)
    }

    pub fn from_toml(source: &str) -> AnyResult<Self> {
        let config: Config = toml::from_str(source)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sections_fall_back_to_defaults() {
        let config = Config::from_toml("[detection]\nauto_skip = false\n").unwrap();
        assert!(!config.detection.auto_skip);
        assert_eq!(config.detection.scan_throttle_ms, 300);
        assert_eq!(config.detection.fallback_scan_ms, 3000);
        assert_eq!(config.domains.storage_key, "adServers");
        assert!(config.muting.gesture_gated_tab_unmute);
        assert!(config.logging.is_none());
    }

    #[test]
    fn parses_full_file() {
        let source = r#"
[logging]
level = "debug"

[logging.file]
path = "logs/admute.log"
max_lines = 500

[domains]
list_url = "https://lists.example/hosts.txt"
storage_key = "hosts"
cache_path = "cache/hosts.json"
extra = ["ads.example.net"]
fetch_timeout_secs = 4

[muting]
fallback_volume = 0.8
"#;
        let config = Config::from_toml(source).unwrap();
        let logging = config.logging.unwrap();
        assert_eq!(logging.level.as_deref(), Some("debug"));
        assert_eq!(logging.file.unwrap().max_lines, 500);
        assert_eq!(config.domains.list_url, "https://lists.example/hosts.txt");
        assert_eq!(config.domains.extra, vec!["ads.example.net".to_string()]);
        assert_eq!(config.domains.fetch_timeout_secs, 4);
        assert_eq!(config.muting.fallback_volume, 0.8);
        assert!(config.muting.notify_background);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(Config::from_toml("[detection\n").is_err());
    }
}
