use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DomainsConfig {
    /// Plaintext host list, one hostname per line.
    #[serde(default = "default_list_url")]
    pub list_url: String,
    /// Key under which the fetched list is persisted.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// JSON file backing the persisted cache.
    #[serde(default = "default_cache_path")]
    pub cache_path: String,
    /// Hostnames added to the built-in list.
    #[serde(default)]
    pub extra: Vec<String>,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for DomainsConfig {
    fn default() -> Self {
        Self {
            list_url: default_list_url(),
            storage_key: default_storage_key(),
            cache_path: default_cache_path(),
            extra: Vec::new(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_list_url() -> String {
    "https://raw.githubusercontent.com/anudeepND/blacklist/master/adservers.txt".to_string()
}

fn default_storage_key() -> String {
    "adServers".to_string()
}

fn default_cache_path() -> String {
    "cache/storage.json".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}
