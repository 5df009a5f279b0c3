//! The single entry point for turning URIs into resource addresses.

use std::sync::Arc;

use tracing::debug;

use crate::address::ResourceAddress;
use crate::config::FactoryConfig;
use crate::error::ResolveError;
use crate::raw::RawOptions;
use crate::registry::SchemeRegistry;
use crate::resolver::SchemeResolver;
use crate::resource_uri::ResourceUri;

/// Resolves URIs into [`ResourceAddress`] chains.
///
/// Cheap to clone; clones share the read-only registry. Resolution has no
/// side effects, so a factory can serve any number of threads.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use resource_address::{RawOptions, ResourceAddressFactory, scheme::http};
///
/// let factory = ResourceAddressFactory::new();
/// let options = RawOptions::new().with("ws.keepAliveTimeout", 25);
/// let address = factory
///     .new_resource_address_with_options("wsn://localhost:4949/path", &options)
///     .unwrap();
///
/// let http = address.transport().unwrap();
/// assert_eq!(http.resource().as_str(), "http://localhost:4949/path");
/// assert_eq!(http.option(&http::KEEP_ALIVE_TIMEOUT), &Duration::from_secs(25));
/// assert_eq!(http.transport().unwrap().resource().as_str(), "tcp://127.0.0.1:4949");
/// ```
#[derive(Debug, Clone)]
pub struct ResourceAddressFactory {
    registry: Arc<SchemeRegistry>,
}

impl ResourceAddressFactory {
    /// Creates a factory over the built-in schemes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(SchemeRegistry::builtin())
    }

    /// Creates a factory over the built-in schemes configured by `config`.
    #[must_use]
    pub fn from_config(config: &FactoryConfig) -> Self {
        Self::with_registry(SchemeRegistry::from_config(config))
    }

    /// Creates a factory over a custom registry.
    #[must_use]
    pub fn with_registry(registry: SchemeRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &SchemeRegistry {
        &self.registry
    }

    /// Returns the resolver registered for `scheme`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::UnsupportedScheme` if none is registered.
    pub fn resolver(&self, scheme: &str) -> Result<&Arc<dyn SchemeResolver>, ResolveError> {
        self.registry.lookup(scheme)
    }

    /// Resolves `uri` with no options.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if `uri` is malformed or any layer fails to
    /// resolve.
    pub fn new_resource_address(&self, uri: &str) -> Result<ResourceAddress, ResolveError> {
        self.new_resource_address_with_options(uri, &RawOptions::new())
    }

    /// Resolves `uri` with `options`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if `uri` is malformed or any layer fails to
    /// resolve.
    pub fn new_resource_address_with_options(
        &self,
        uri: &str,
        options: &RawOptions,
    ) -> Result<ResourceAddress, ResolveError> {
        let uri = ResourceUri::parse(uri)?;
        self.resolve(&uri, options)
    }

    /// Resolves an already parsed URI.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if any layer fails to resolve.
    pub fn resolve(&self, uri: &ResourceUri, options: &RawOptions) -> Result<ResourceAddress, ResolveError> {
        let resolver = self.registry.lookup(uri.scheme())?;
        let address = resolver.new_resource_address(uri, options, &self.registry)?;
        debug!(uri = %uri, depth = address.depth(), "resolved resource address");
        Ok(address)
    }
}

impl Default for ResourceAddressFactory {
    fn default() -> Self {
        Self::new()
    }
}
