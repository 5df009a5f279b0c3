//! Scheme name to resolver mapping.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::config::FactoryConfig;
use crate::error::ResolveError;
use crate::name_resolver::StaticNameResolver;
use crate::resolver::SchemeResolver;
use crate::scheme::{HttpResolver, SslResolver, TcpResolver, WsResolver};

/// The set of resolvers available to a resolution.
///
/// Populated during initialization, then shared read-only; every chain
/// looks up its transport layers here.
///
/// # Examples
///
/// ```
/// use resource_address::{ResolveError, SchemeRegistry, scheme::WsResolver};
///
/// let mut registry = SchemeRegistry::builtin();
/// assert!(registry.lookup("wsn").is_ok());
/// assert!(matches!(registry.lookup("sse"), Err(ResolveError::UnsupportedScheme { .. })));
///
/// // Each scheme can be registered once
/// assert!(matches!(
///     registry.register(WsResolver::wsn()),
///     Err(ResolveError::DuplicateScheme { .. })
/// ));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemeRegistry {
    resolvers: BTreeMap<String, Arc<dyn SchemeResolver>>,
}

impl SchemeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in scheme with default settings.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_config(&FactoryConfig::default())
    }

    /// Creates a registry holding every built-in scheme, with default ports
    /// and the host table taken from `config`.
    #[must_use]
    pub fn from_config(config: &FactoryConfig) -> Self {
        let names = Arc::new(StaticNameResolver::from_hosts(&config.hosts));
        let resolvers: [Arc<dyn SchemeResolver>; 7] = [
            configured(WsResolver::ws(), config, WsResolver::with_default_port),
            configured(WsResolver::wss(), config, WsResolver::with_default_port),
            configured(WsResolver::wsn(), config, WsResolver::with_default_port),
            configured(HttpResolver::http(), config, HttpResolver::with_default_port),
            configured(HttpResolver::https(), config, HttpResolver::with_default_port),
            configured(SslResolver::new(), config, SslResolver::with_default_port),
            configured(
                TcpResolver::with_name_resolver(names),
                config,
                TcpResolver::with_default_port,
            ),
        ];

        let mut registry = Self::new();
        for resolver in resolvers {
            let scheme = resolver.descriptor().name().to_string();
            registry.resolvers.insert(scheme, resolver);
        }
        for scheme in config.default_ports.keys() {
            if !registry.contains(scheme) {
                warn!(scheme = %scheme, "default port configured for unknown scheme");
            }
        }
        registry
    }

    /// Registers a resolver under its descriptor's scheme name.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::DuplicateScheme` if the scheme is taken.
    pub fn register<R: SchemeResolver + 'static>(&mut self, resolver: R) -> Result<(), ResolveError> {
        self.register_shared(Arc::new(resolver))
    }

    /// Registers an already shared resolver.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::DuplicateScheme` if the scheme is taken.
    pub fn register_shared(&mut self, resolver: Arc<dyn SchemeResolver>) -> Result<(), ResolveError> {
        let scheme = resolver.descriptor().name().to_ascii_lowercase();
        if self.resolvers.contains_key(&scheme) {
            return Err(ResolveError::DuplicateScheme { scheme });
        }
        self.resolvers.insert(scheme, resolver);
        Ok(())
    }

    /// Returns the resolver for `scheme`, matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::UnsupportedScheme` if none is registered.
    pub fn lookup(&self, scheme: &str) -> Result<&Arc<dyn SchemeResolver>, ResolveError> {
        self.resolvers
            .get(&scheme.to_ascii_lowercase())
            .ok_or_else(|| ResolveError::UnsupportedScheme {
                scheme: scheme.to_string(),
            })
    }

    /// Returns true if a resolver is registered for `scheme`.
    #[must_use]
    pub fn contains(&self, scheme: &str) -> bool {
        self.resolvers.contains_key(&scheme.to_ascii_lowercase())
    }

    /// Returns the registered scheme names, sorted.
    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.resolvers.keys().map(String::as_str)
    }

    /// Returns the number of registered schemes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Returns true if no scheme is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

fn configured<R: SchemeResolver + 'static>(
    resolver: R,
    config: &FactoryConfig,
    with_default_port: fn(R, u16) -> R,
) -> Arc<dyn SchemeResolver> {
    let resolver = match config.default_port(resolver.descriptor().name()) {
        Some(port) => with_default_port(resolver, port),
        None => resolver,
    };
    Arc::new(resolver)
}
