//! Memoized resolution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use tracing::debug;

use crate::address::ResourceAddress;
use crate::config::FactoryConfig;
use crate::error::ResolveError;
use crate::factory::ResourceAddressFactory;
use crate::raw::RawOptions;
use crate::resource_uri::ResourceUri;

/// Statistics about a [`ResolutionCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Cached addresses.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that ran a resolution.
    pub misses: u64,
}

type CacheKey = (ResourceUri, RawOptions);

/// Per-key cell; empty until the first successful resolution.
type Slot = Arc<Mutex<Option<Arc<ResourceAddress>>>>;

/// A [`ResourceAddressFactory`] that resolves each distinct (URI, options)
/// pair at most once and hands out one shared address per pair.
///
/// Check-then-insert is atomic per key: concurrent callers asking for the
/// same pair wait for the first resolution instead of repeating it. The map
/// itself is only locked long enough to find or create the key's slot, so
/// resolutions of other keys proceed in parallel. Failed resolutions are not
/// cached.
///
/// Entries live until [`remove`](Self::remove) or [`clear`](Self::clear).
/// The cache suits a bounded set of configured accept and connect addresses;
/// per-connection URIs should go through the factory directly.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use resource_address::{RawOptions, ResolutionCache, ResourceAddressFactory};
///
/// let cache = ResolutionCache::new(ResourceAddressFactory::new());
/// let options = RawOptions::new().with("ws.lightweight", true);
///
/// let a = cache.get_or_resolve("wsn://localhost:2020/", &options).unwrap();
/// let b = cache.get_or_resolve("wsn://localhost:2020/", &options).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(cache.stats().hits, 1);
/// ```
#[derive(Debug)]
pub struct ResolutionCache {
    factory: ResourceAddressFactory,
    entries: DashMap<CacheKey, Slot>,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    /// Creates an enabled cache in front of `factory`.
    #[must_use]
    pub fn new(factory: ResourceAddressFactory) -> Self {
        Self {
            factory,
            entries: DashMap::new(),
            enabled: true,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a cache over a factory built from `config`, honoring
    /// `config.cache_enabled`.
    #[must_use]
    pub fn from_config(config: &FactoryConfig) -> Self {
        let mut cache = Self::new(ResourceAddressFactory::from_config(config));
        cache.enabled = config.cache_enabled;
        cache
    }

    /// Returns the underlying factory.
    #[must_use]
    pub const fn factory(&self) -> &ResourceAddressFactory {
        &self.factory
    }

    /// Returns true if results are stored.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the shared address for `uri` and `options`, resolving it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if `uri` is malformed or resolution fails.
    pub fn get_or_resolve(&self, uri: &str, options: &RawOptions) -> Result<Arc<ResourceAddress>, ResolveError> {
        let uri = ResourceUri::parse(uri)?;
        self.get_or_resolve_uri(uri, options)
    }

    /// Like [`get_or_resolve`](Self::get_or_resolve) for a parsed URI.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if resolution fails.
    pub fn get_or_resolve_uri(
        &self,
        uri: ResourceUri,
        options: &RawOptions,
    ) -> Result<Arc<ResourceAddress>, ResolveError> {
        if !self.enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return self.factory.resolve(&uri, options).map(Arc::new);
        }

        let key = (uri, options.clone());
        let slot = Arc::clone(self.entries.entry(key.clone()).or_default().value());

        let mut cell = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(address) = cell.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(uri = %key.0, "resolution cache hit");
            return Ok(Arc::clone(address));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(uri = %key.0, "resolution cache miss");
        match self.factory.resolve(&key.0, options) {
            Ok(address) => {
                let address = Arc::new(address);
                *cell = Some(Arc::clone(&address));
                Ok(address)
            }
            Err(err) => {
                drop(cell);
                self.entries
                    .remove_if(&key, |_, current| Arc::ptr_eq(current, &slot) && is_vacant(current));
                Err(err)
            }
        }
    }

    /// Drops the cached address for `uri` and `options`, returning it.
    pub fn remove(&self, uri: &ResourceUri, options: &RawOptions) -> Option<Arc<ResourceAddress>> {
        let (_, slot) = self.entries.remove(&(uri.clone(), options.clone()))?;
        let cell = slot.lock().unwrap_or_else(PoisonError::into_inner);
        cell.clone()
    }

    /// Returns the number of keys held, including resolutions in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached address.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns statistics about the cache.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// True if nobody holds the slot and it never received an address.
fn is_vacant(slot: &Slot) -> bool {
    slot.try_lock().is_ok_and(|cell| cell.is_none())
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;
    use std::thread;

    use super::*;
    use crate::constants::TCP_SCHEME;
    use crate::error::ConfigurationError;
    use crate::option::OptionTable;
    use crate::registry::SchemeRegistry;
    use crate::resolver::{Level, PathRule, SchemeDescriptor, SchemeResolver};

    #[test]
    fn same_key_shares_address() {
        let cache = ResolutionCache::new(ResourceAddressFactory::new());
        let a = cache.get_or_resolve("wsn://localhost/", &RawOptions::new()).unwrap();
        let b = cache.get_or_resolve("WSN://LOCALHOST/", &RawOptions::new()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn different_options_are_different_keys() {
        let cache = ResolutionCache::new(ResourceAddressFactory::new());
        let a = cache.get_or_resolve("wsn://localhost/", &RawOptions::new()).unwrap();
        let b = cache
            .get_or_resolve("wsn://localhost/", &RawOptions::new().with("ws.lightweight", true))
            .unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.resource_id(), b.resource_id());
        assert_eq!(cache.stats(), CacheStats { entries: 2, hits: 0, misses: 2 });
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = ResolutionCache::new(ResourceAddressFactory::new());
        assert!(cache.get_or_resolve("wsn://localhost", &RawOptions::new()).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn disabled_cache_resolves_every_time() {
        let cache = ResolutionCache::from_config(&FactoryConfig::new().with_cache_enabled(false));
        let a = cache.get_or_resolve("tcp://localhost:1", &RawOptions::new()).unwrap();
        let b = cache.get_or_resolve("tcp://localhost:1", &RawOptions::new()).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_callers_share_one_resolution() {
        let cache = Arc::new(ResolutionCache::new(ResourceAddressFactory::new()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get_or_resolve("wss://example.com/feed", &RawOptions::new()).unwrap())
            })
            .collect();
        let addresses: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addresses.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 7);
    }

    #[test]
    fn remove_evicts_one_key() {
        let cache = ResolutionCache::new(ResourceAddressFactory::new());
        let first = cache.get_or_resolve("tcp://localhost:1", &RawOptions::new()).unwrap();
        cache.get_or_resolve("tcp://localhost:2", &RawOptions::new()).unwrap();

        let uri = ResourceUri::parse("tcp://localhost:1").unwrap();
        let removed = cache.remove(&uri, &RawOptions::new()).unwrap();
        assert!(Arc::ptr_eq(&removed, &first));
        assert_eq!(cache.len(), 1);
        assert!(cache.remove(&uri, &RawOptions::new()).is_none());

        let again = cache.get_or_resolve("tcp://localhost:1", &RawOptions::new()).unwrap();
        assert!(!Arc::ptr_eq(&again, &first));
    }

    /// Application scheme whose validation resolves other keys through the
    /// shared cache while its own resolution is in progress.
    #[derive(Debug)]
    struct Nested(SchemeDescriptor);

    static NESTED_CACHE: OnceLock<ResolutionCache> = OnceLock::new();

    impl SchemeResolver for Nested {
        fn descriptor(&self) -> &SchemeDescriptor {
            &self.0
        }

        fn validate(&self, _: &OptionTable) -> Result<(), ConfigurationError> {
            if let Some(cache) = NESTED_CACHE.get() {
                for port in 1..=64 {
                    let uri = format!("tcp://localhost:{port}");
                    cache
                        .get_or_resolve(&uri, &RawOptions::new())
                        .map_err(|err| ConfigurationError::new("nested", "port", err.to_string()))?;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn resolution_runs_outside_the_map_lock() {
        let mut registry = SchemeRegistry::builtin();
        registry
            .register(Nested(
                SchemeDescriptor::new("nested", "nested", Level::Application)
                    .with_default_port(7000)
                    .with_default_transport(TCP_SCHEME)
                    .with_path_rule(PathRule::DefaultRoot),
            ))
            .unwrap();
        let cache = NESTED_CACHE.get_or_init(|| ResolutionCache::new(ResourceAddressFactory::with_registry(registry)));

        let address = cache.get_or_resolve("nested://localhost", &RawOptions::new()).unwrap();
        assert_eq!(address.terminus().resource().as_str(), "tcp://127.0.0.1:7000");
        assert_eq!(cache.len(), 65);
        assert_eq!(cache.stats().misses, 65);
    }

    #[test]
    fn clear_empties_cache() {
        let cache = ResolutionCache::new(ResourceAddressFactory::new());
        cache.get_or_resolve("tcp://localhost:1", &RawOptions::new()).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
