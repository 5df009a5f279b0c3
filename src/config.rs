//! Configuration for the resolution engine.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};

/// Configuration for [`ResourceAddressFactory`](crate::ResourceAddressFactory)
/// and [`ResolutionCache`](crate::ResolutionCache).
///
/// Fixed at initialization; the registry built from it is read-only.
///
/// # Examples
///
/// ```
/// use std::net::{IpAddr, Ipv4Addr};
/// use resource_address::{FactoryConfig, ResourceAddressFactory};
///
/// let config = FactoryConfig::new()
///     .with_default_port("ws", 8000)
///     .with_host("gateway", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
///
/// let factory = ResourceAddressFactory::from_config(&config);
/// let address = factory.new_resource_address("ws://gateway/").unwrap();
/// assert_eq!(address.resource().as_str(), "ws://gateway:8000/");
/// assert_eq!(address.terminus().resource().as_str(), "tcp://10.0.0.1:8000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct FactoryConfig {
    /// Default port overrides, by scheme.
    ///
    /// Default: empty (built-in defaults apply)
    pub default_ports: BTreeMap<String, u16>,

    /// Host table used by the `tcp` layer to canonicalize host names.
    ///
    /// Default: `localhost` -> `127.0.0.1`
    pub hosts: BTreeMap<String, IpAddr>,

    /// Whether [`ResolutionCache`](crate::ResolutionCache) stores results.
    ///
    /// Default: true
    pub cache_enabled: bool,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            default_ports: BTreeMap::new(),
            hosts: BTreeMap::from([("localhost".to_string(), IpAddr::V4(Ipv4Addr::LOCALHOST))]),
            cache_enabled: true,
        }
    }
}

impl FactoryConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the default port of `scheme`.
    #[must_use]
    pub fn with_default_port(mut self, scheme: &str, port: u16) -> Self {
        self.default_ports.insert(scheme.to_ascii_lowercase(), port);
        self
    }

    /// Adds or replaces a host table entry.
    #[must_use]
    pub fn with_host(mut self, name: &str, ip: IpAddr) -> Self {
        self.hosts.insert(name.to_ascii_lowercase(), ip);
        self
    }

    /// Removes every host table entry, `localhost` included.
    #[must_use]
    pub fn without_hosts(mut self) -> Self {
        self.hosts.clear();
        self
    }

    /// Enables or disables result caching.
    #[must_use]
    pub const fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Returns the overridden default port for `scheme`, if any.
    #[must_use]
    pub fn default_port(&self, scheme: &str) -> Option<u16> {
        self.default_ports.get(&scheme.to_ascii_lowercase()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = FactoryConfig::default();
        assert!(config.default_ports.is_empty());
        assert_eq!(config.hosts.get("localhost"), Some(&IpAddr::V4(Ipv4Addr::LOCALHOST)));
        assert!(config.cache_enabled);
    }

    #[test]
    fn builder_pattern() {
        let config = FactoryConfig::new()
            .with_default_port("WSN", 8080)
            .without_hosts()
            .with_host("Edge", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)))
            .with_cache_enabled(false);

        assert_eq!(config.default_port("wsn"), Some(8080));
        assert_eq!(config.default_port("ws"), None);
        assert_eq!(config.hosts.len(), 1);
        assert!(config.hosts.contains_key("edge"));
        assert!(!config.cache_enabled);
    }
}
