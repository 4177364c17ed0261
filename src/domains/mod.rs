//! Ad-domain classification.
//!
//! Lookups are synchronous and never touch the network. The larger list is
//! loaded by [`AdDomains::refresh`]: memory first, then the persisted cache,
//! then the remote host list. A failed fetch leaves the built-in list in
//! charge.

pub mod builtin;
pub mod list;
pub mod source;
pub mod store;

use std::collections::HashSet;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

pub use builtin::BUILTIN_AD_DOMAINS;
pub use list::parse_host_list;
pub use source::{HostListSource, HttpHostListSource};
pub use store::{DomainStore, JsonFileStore, MemoryStore};

use crate::configs::DomainsConfig;

/// Where the cached set came from on a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Already populated in memory; nothing was read.
    AlreadyLoaded(usize),
    Persisted(usize),
    Fetched(usize),
    /// Neither storage nor the network produced a list.
    BuiltinOnly,
}

/// Process-lifetime set of known ad hostnames.
pub struct AdDomains {
    builtin: Vec<String>,
    cached: RwLock<HashSet<String>>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl Default for AdDomains {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl AdDomains {
    /// Built-in list plus any configured extras.
    pub fn new(extra: &[String]) -> Self {
        let builtin = BUILTIN_AD_DOMAINS
            .iter()
            .map(|d| d.to_string())
            .chain(extra.iter().map(|d| d.trim().to_ascii_lowercase()))
            .filter(|d| !d.is_empty())
            .collect();

        Self {
            builtin,
            cached: RwLock::new(HashSet::new()),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Whether `hostname` belongs to a known ad network.
    ///
    /// `hostname` must already be a bare host (no scheme, port or path).
    /// Built-in entries match as substrings; cached entries match the host or
    /// any of its parent domains.
    pub fn is_ad_domain(&self, hostname: &str) -> bool {
        let host = hostname.trim().trim_end_matches('.').to_ascii_lowercase();
        if host.is_empty() {
            return false;
        }

        if self.builtin.iter().any(|entry| host.contains(entry.as_str())) {
            return true;
        }

        let cached = self.cached.read();
        if cached.is_empty() {
            return false;
        }
        if cached.contains(&host) {
            return true;
        }
        host.match_indices('.')
            .any(|(idx, _)| cached.contains(&host[idx + 1..]))
    }

    pub fn cached_len(&self) -> usize {
        self.cached.read().len()
    }

    pub fn is_populated(&self) -> bool {
        !self.cached.read().is_empty()
    }

    /// Replaces the cached set.
    pub fn load<I, S>(&self, hosts: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: HashSet<String> = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| h.contains('.'))
            .collect();
        let len = set.len();
        *self.cached.write() = set;
        len
    }

    /// Populates the cached set. Idempotent: once populated, later calls
    /// return immediately. Never fails; errors are logged and the built-in
    /// list keeps working.
    pub async fn refresh(
        &self,
        config: &DomainsConfig,
        store: &dyn DomainStore,
        source: &dyn HostListSource,
    ) -> RefreshOutcome {
        let _guard = self.refresh_lock.lock().await;

        let len = self.cached_len();
        if len > 0 {
            debug!("Ad domain list already cached ({} entries)", len);
            return RefreshOutcome::AlreadyLoaded(len);
        }

        match store.get(&config.storage_key).await {
            Ok(Some(hosts)) if !hosts.is_empty() => {
                let len = self.load(&hosts);
                info!("Loaded {} ad domains from local storage", len);
                return RefreshOutcome::Persisted(len);
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to read cached ad domains: {}", e),
        }

        let text = match source.fetch_text(&config.list_url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Failed to fetch ad domain list from {}: {}; using built-in list",
                    config.list_url, e
                );
                return RefreshOutcome::BuiltinOnly;
            }
        };

        let hosts = parse_host_list(&text);
        if hosts.is_empty() {
            warn!("Ad domain list from {} was empty", config.list_url);
            return RefreshOutcome::BuiltinOnly;
        }

        let len = self.load(&hosts);
        let persisted: Vec<String> = {
            let mut all: Vec<String> = self.cached.read().iter().cloned().collect();
            all.sort();
            all
        };
        match store.set(&config.storage_key, &persisted).await {
            Ok(()) => info!("Fetched {} ad domains (cached locally)", len),
            Err(e) => warn!("Fetched {} ad domains but failed to cache them: {}", len, e),
        }
        RefreshOutcome::Fetched(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::FetchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedSource {
        body: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn ok(body: &'static str) -> Self {
            Self {
                body: Some(body),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                body: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HostListSource for ScriptedSource {
        async fn fetch_text(&self, _url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body
                .map(str::to_string)
                .ok_or_else(|| FetchError::Other("offline".into()))
        }
    }

    #[test]
    fn builtin_entries_are_ad_domains() {
        let domains = AdDomains::default();
        for host in BUILTIN_AD_DOMAINS {
            assert!(domains.is_ad_domain(host), "{} should match", host);
        }
        assert!(domains.is_ad_domain("STATIC.DoubleClick.net"));
        assert!(!domains.is_ad_domain("example.com"));
        assert!(!domains.is_ad_domain(""));
    }

    #[test]
    fn extras_join_the_builtin_list() {
        let domains = AdDomains::new(&["Ads.Example.NET".to_string()]);
        assert!(domains.is_ad_domain("cdn.ads.example.net"));
    }

    #[test]
    fn cached_entries_match_host_and_subdomains() {
        let domains = AdDomains::default();
        domains.load(["tracker.example.org"]);
        assert!(domains.is_ad_domain("tracker.example.org"));
        assert!(domains.is_ad_domain("eu.tracker.example.org"));
        assert!(domains.is_ad_domain("tracker.example.org."));
        assert!(!domains.is_ad_domain("example.org"));
        assert!(!domains.is_ad_domain("nottracker.example.org"));
    }

    #[tokio::test]
    async fn refresh_fetches_then_persists() {
        let domains = AdDomains::default();
        let store = MemoryStore::new();
        let source = ScriptedSource::ok("# list\n0.0.0.0 ads.example.com\n0.0.0.0 b.example.com\n");
        let config = DomainsConfig::default();

        let outcome = domains.refresh(&config, &store, &source).await;
        assert_eq!(outcome, RefreshOutcome::Fetched(2));
        assert!(domains.is_ad_domain("ads.example.com"));
        assert_eq!(
            store.get(&config.storage_key).await.unwrap(),
            Some(vec!["ads.example.com".to_string(), "b.example.com".to_string()])
        );

        let again = domains.refresh(&config, &store, &source).await;
        assert_eq!(again, RefreshOutcome::AlreadyLoaded(2));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_prefers_persisted_cache() {
        let domains = AdDomains::default();
        let store = MemoryStore::new();
        let config = DomainsConfig::default();
        store
            .set(&config.storage_key, &["cached.example.com".to_string()])
            .await
            .unwrap();
        let source = ScriptedSource::ok("0.0.0.0 remote.example.com\n");

        let outcome = domains.refresh(&config, &store, &source).await;
        assert_eq!(outcome, RefreshOutcome::Persisted(1));
        assert!(domains.is_ad_domain("cached.example.com"));
        assert!(!domains.is_ad_domain("remote.example.com"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_failure_keeps_builtin_list() {
        let domains = AdDomains::default();
        let store = MemoryStore::new();
        let source = ScriptedSource::failing();

        let outcome = domains
            .refresh(&DomainsConfig::default(), &store, &source)
            .await;
        assert_eq!(outcome, RefreshOutcome::BuiltinOnly);
        assert!(domains.is_ad_domain("doubleclick.net"));
        assert!(!domains.is_populated());
    }
}
