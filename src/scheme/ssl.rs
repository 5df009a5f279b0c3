//! `ssl`, the encryption layer under `https`.

use crate::address::{NEXT_PROTOCOL, QUALIFIER};
use crate::constants::{SSL_SCHEME, TCP_SCHEME};
use crate::error::ConfigurationError;
use crate::option::{DeclaredOption, OptionTable, ResourceOption, convert};
use crate::resolver::{Level, PathRule, SchemeDescriptor, SchemeResolver};

/// Cipher suites to enable; empty means the platform defaults.
pub static CIPHER_SUITES: ResourceOption<Vec<String>> =
    ResourceOption::new("ssl.cipherSuites", Vec::new(), convert::string_list);

/// Protocol versions to enable; empty means the platform defaults.
pub static PROTOCOLS: ResourceOption<Vec<String>> =
    ResourceOption::new("ssl.protocols", Vec::new(), convert::string_list);

/// Whether traffic is encrypted at all.
pub static ENCRYPTION_ENABLED: ResourceOption<bool> =
    ResourceOption::new("ssl.encryptionEnabled", true, convert::boolean);

/// Requests, but does not demand, a client certificate.
pub static WANT_CLIENT_AUTH: ResourceOption<bool> =
    ResourceOption::new("ssl.wantClientAuth", false, convert::boolean);

/// Demands a client certificate.
pub static NEED_CLIENT_AUTH: ResourceOption<bool> =
    ResourceOption::new("ssl.needClientAuth", false, convert::boolean);

/// Options declared by `ssl`.
pub static OPTIONS: &[&dyn DeclaredOption] = &[
    &NEXT_PROTOCOL,
    &QUALIFIER,
    &CIPHER_SUITES,
    &PROTOCOLS,
    &ENCRYPTION_ENABLED,
    &WANT_CLIENT_AUTH,
    &NEED_CLIENT_AUTH,
];

/// Resolver for `ssl` over `tcp`. There is no default port.
#[derive(Debug, Clone)]
pub struct SslResolver {
    descriptor: SchemeDescriptor,
}

impl SslResolver {
    /// Creates the resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: SchemeDescriptor::new(SSL_SCHEME, SSL_SCHEME, Level::Security)
                .with_default_transport(TCP_SCHEME)
                .with_path_rule(PathRule::Dropped)
                .with_declared_options(OPTIONS),
        }
    }

    /// Sets a default port.
    #[must_use]
    pub const fn with_default_port(mut self, port: u16) -> Self {
        self.descriptor = self.descriptor.with_default_port(port);
        self
    }
}

impl Default for SslResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemeResolver for SslResolver {
    fn descriptor(&self) -> &SchemeDescriptor {
        &self.descriptor
    }

    fn validate(&self, options: &OptionTable) -> Result<(), ConfigurationError> {
        let encrypted = options.get(&ENCRYPTION_ENABLED).copied().unwrap_or(true);
        let need_client_auth = options.get(&NEED_CLIENT_AUTH).copied().unwrap_or(false);
        if need_client_auth && !encrypted {
            return Err(ConfigurationError::new(
                self.descriptor.name(),
                NEED_CLIENT_AUTH.name(),
                "client authentication requires encryption to be enabled",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::raw::RawOptions;
    use crate::registry::SchemeRegistry;
    use crate::resource_uri::ResourceUri;

    fn resolve(uri: &str, options: &RawOptions) -> Result<crate::ResourceAddress, ResolveError> {
        let registry = SchemeRegistry::builtin();
        SslResolver::new().new_resource_address(&ResourceUri::parse(uri).unwrap(), options, &registry)
    }

    #[test]
    fn port_is_mandatory() {
        let err = resolve("ssl://localhost", &RawOptions::new()).unwrap_err();
        assert!(matches!(err, ResolveError::MissingPort { scheme: "ssl", .. }));
    }

    #[test]
    fn path_is_dropped() {
        let address = resolve("ssl://localhost:9443/ignored", &RawOptions::new()).unwrap();
        assert_eq!(address.resource().as_str(), "ssl://localhost:9443");
        assert_eq!(address.transport_uri().unwrap().as_str(), "tcp://localhost:9443");
    }

    #[test]
    fn client_auth_needs_encryption() {
        let options = RawOptions::new()
            .with("ssl.encryptionEnabled", false)
            .with("ssl.needClientAuth", true);
        let err = resolve("ssl://localhost:9443", &options).unwrap_err();
        let ResolveError::Configuration(err) = err else {
            panic!("expected configuration error, got {err:?}");
        };
        assert_eq!(err.option, "ssl.needClientAuth");
    }

    #[test]
    fn protocols_from_comma_separated_string() {
        let options = RawOptions::new().with("ssl.protocols", "TLSv1.2,TLSv1.3");
        let address = resolve("ssl://localhost:9443", &options).unwrap();
        assert_eq!(address.option(&PROTOCOLS), &["TLSv1.2".to_string(), "TLSv1.3".to_string()]);
    }
}
