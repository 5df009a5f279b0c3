//! Host name canonicalization for the physical layer.

use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use crate::authority::Host;

/// Maps host names to the canonical host a physical transport binds to.
///
/// This is a pure lookup. No DNS queries are made; names without an entry
/// stay as they are.
pub trait NameResolver: fmt::Debug + Send + Sync {
    /// Returns the canonical form of `host`.
    fn resolve(&self, host: &Host) -> Host;
}

/// A [`NameResolver`] backed by a fixed hosts table.
///
/// The default table maps `localhost` to `127.0.0.1`. Address literals are
/// never rewritten.
///
/// # Examples
///
/// ```
/// use std::net::{IpAddr, Ipv4Addr};
/// use resource_address::{Host, NameResolver, StaticNameResolver};
///
/// let names = StaticNameResolver::default()
///     .with_host("gateway.internal", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)));
///
/// assert_eq!(names.resolve(&Host::parse("localhost").unwrap()).to_string(), "127.0.0.1");
/// assert_eq!(names.resolve(&Host::parse("gateway.internal").unwrap()).to_string(), "10.0.0.7");
/// assert_eq!(names.resolve(&Host::parse("example.com").unwrap()).to_string(), "example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticNameResolver {
    hosts: BTreeMap<String, IpAddr>,
}

impl StaticNameResolver {
    /// Creates a resolver with an empty table.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            hosts: BTreeMap::new(),
        }
    }

    /// Creates a resolver from a hosts table. Names are matched
    /// case-insensitively.
    #[must_use]
    pub fn from_hosts<'a>(hosts: impl IntoIterator<Item = (&'a String, &'a IpAddr)>) -> Self {
        Self {
            hosts: hosts
                .into_iter()
                .map(|(name, ip)| (name.to_ascii_lowercase(), *ip))
                .collect(),
        }
    }

    /// Adds or replaces a host entry.
    #[must_use]
    pub fn with_host(mut self, name: &str, ip: IpAddr) -> Self {
        self.hosts.insert(name.to_ascii_lowercase(), ip);
        self
    }

    /// Returns the address mapped to `name`, if any.
    #[must_use]
    pub fn address_of(&self, name: &str) -> Option<IpAddr> {
        self.hosts.get(&name.to_ascii_lowercase()).copied()
    }
}

impl Default for StaticNameResolver {
    fn default() -> Self {
        Self::empty().with_host("localhost", IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

impl NameResolver for StaticNameResolver {
    fn resolve(&self, host: &Host) -> Host {
        match host {
            Host::Domain(name) => self.address_of(name).map_or_else(|| host.clone(), Host::from),
            Host::Ipv4(_) | Host::Ipv6(_) => host.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use super::*;

    #[test]
    fn localhost_maps_to_loopback() {
        let names = StaticNameResolver::default();
        assert_eq!(
            names.resolve(&Host::Domain("localhost".to_string())),
            Host::Ipv4(Ipv4Addr::LOCALHOST)
        );
    }

    #[test]
    fn literals_are_untouched() {
        let names = StaticNameResolver::default();
        let v6 = Host::Ipv6(Ipv6Addr::LOCALHOST);
        assert_eq!(names.resolve(&v6), v6);
        let v4 = Host::Ipv4(Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(names.resolve(&v4), v4);
    }

    #[test]
    fn unknown_names_pass_through() {
        let names = StaticNameResolver::empty();
        let host = Host::Domain("localhost".to_string());
        assert_eq!(names.resolve(&host), host);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let names = StaticNameResolver::empty().with_host("Gateway", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(names.address_of("GATEWAY"), Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));
    }
}
