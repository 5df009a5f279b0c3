//! `http` and `https`.

use std::time::Duration;

use crate::address::{NEXT_PROTOCOL, QUALIFIER};
use crate::constants::{
    DEFAULT_HTTP_PORT, DEFAULT_HTTPS_PORT, DEFAULT_KEEP_ALIVE_CONNECTIONS, DEFAULT_KEEP_ALIVE_TIMEOUT_SECS,
    HTTP_SCHEME, HTTPS_SCHEME, SSL_SCHEME, TCP_SCHEME,
};
use crate::option::{DeclaredOption, ResourceOption, convert};
use crate::resolver::{Level, PathRule, SchemeDescriptor, SchemeResolver};

/// Idle time before a persistent connection is closed. Bare numbers are
/// seconds.
pub static KEEP_ALIVE_TIMEOUT: ResourceOption<Duration> = ResourceOption::new(
    "http.keepAliveTimeout",
    Duration::from_secs(DEFAULT_KEEP_ALIVE_TIMEOUT_SECS),
    convert::seconds,
);

/// Idle persistent connections kept per remote endpoint.
pub static KEEP_ALIVE_CONNECTIONS: ResourceOption<u32> = ResourceOption::new(
    "http.keepAliveConnections",
    DEFAULT_KEEP_ALIVE_CONNECTIONS,
    convert::unsigned32,
);

/// Authentication realm guarding the endpoint.
pub static REALM_NAME: ResourceOption<Option<String>> =
    ResourceOption::new("http.realmName", None, convert::optional_string);

/// Roles a client must hold.
pub static REQUIRED_ROLES: ResourceOption<Vec<String>> =
    ResourceOption::new("http.requiredRoles", Vec::new(), convert::string_list);

/// Whether responses carry a `Server` header.
pub static SERVER_HEADER_ENABLED: ResourceOption<bool> =
    ResourceOption::new("http.serverHeaderEnabled", true, convert::boolean);

/// Options declared by `http` and `https`.
pub static OPTIONS: &[&dyn DeclaredOption] = &[
    &NEXT_PROTOCOL,
    &QUALIFIER,
    &KEEP_ALIVE_TIMEOUT,
    &KEEP_ALIVE_CONNECTIONS,
    &REALM_NAME,
    &REQUIRED_ROLES,
    &SERVER_HEADER_ENABLED,
];

fn descriptor(name: &'static str, port: u16, transport: &'static str) -> SchemeDescriptor {
    SchemeDescriptor::new(name, HTTP_SCHEME, Level::Session)
        .with_default_port(port)
        .with_default_transport(transport)
        .with_path_rule(PathRule::DefaultRoot)
        .with_declared_options(OPTIONS)
}

/// Resolver for `http` (over `tcp`) and `https` (over `ssl`).
#[derive(Debug, Clone)]
pub struct HttpResolver {
    descriptor: SchemeDescriptor,
}

impl HttpResolver {
    /// `http` over `tcp`, port 80.
    #[must_use]
    pub fn http() -> Self {
        Self {
            descriptor: descriptor(HTTP_SCHEME, DEFAULT_HTTP_PORT, TCP_SCHEME),
        }
    }

    /// `https` over `ssl`, port 443.
    #[must_use]
    pub fn https() -> Self {
        Self {
            descriptor: descriptor(HTTPS_SCHEME, DEFAULT_HTTPS_PORT, SSL_SCHEME),
        }
    }

    /// Replaces the default port.
    #[must_use]
    pub const fn with_default_port(mut self, port: u16) -> Self {
        self.descriptor = self.descriptor.with_default_port(port);
        self
    }
}

impl SchemeResolver for HttpResolver {
    fn descriptor(&self) -> &SchemeDescriptor {
        &self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawOptions;
    use crate::registry::SchemeRegistry;
    use crate::resource_uri::ResourceUri;

    fn resolve(uri: &str, options: &RawOptions) -> crate::ResourceAddress {
        let registry = SchemeRegistry::builtin();
        let uri = ResourceUri::parse(uri).unwrap();
        registry
            .lookup(uri.scheme())
            .unwrap()
            .new_resource_address(&uri, options, &registry)
            .unwrap()
    }

    #[test]
    fn empty_path_becomes_root() {
        let address = resolve("http://localhost:8080", &RawOptions::new());
        assert_eq!(address.resource().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn defaults() {
        let address = resolve("http://localhost/", &RawOptions::new());
        assert_eq!(address.option(&KEEP_ALIVE_TIMEOUT), &Duration::from_secs(30));
        assert_eq!(*address.option(&KEEP_ALIVE_CONNECTIONS), 2);
        assert!(address.option(&REALM_NAME).is_none());
        assert!(*address.option(&SERVER_HEADER_ENABLED));
        assert_eq!(address.resource().port(), Some(80));
    }

    #[test]
    fn https_runs_over_ssl() {
        let address = resolve("https://example.com/", &RawOptions::new());
        let schemes: Vec<_> = address.layers().map(crate::ResourceAddress::scheme).collect();
        assert_eq!(schemes, ["https", "ssl", "tcp"]);
        assert_eq!(address.terminus().resource().as_str(), "tcp://example.com:443");
    }

    #[test]
    fn options_read_from_http_prefix() {
        let options = RawOptions::new()
            .with("http.keepAliveTimeout", "2m")
            .with("http.requiredRoles", "admin, operator")
            .with("http.realmName", "demo");
        let address = resolve("https://example.com/", &options);
        assert_eq!(address.option(&KEEP_ALIVE_TIMEOUT), &Duration::from_secs(120));
        assert_eq!(address.option(&REQUIRED_ROLES), &["admin".to_string(), "operator".to_string()]);
        assert_eq!(address.option(&REALM_NAME).as_deref(), Some("demo"));
    }
}
