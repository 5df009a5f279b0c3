//! WebSocket family: `ws`, `wss` and the native-framing `wsn`.
//!
//! All three share the `ws` option prefix.

use std::time::Duration;

use crate::address::{NEXT_PROTOCOL, QUALIFIER};
use crate::constants::{
    DEFAULT_HTTP_PORT, DEFAULT_HTTPS_PORT, HTTP_SCHEME, HTTPS_SCHEME, WS_SCHEME, WSN_SCHEME, WSS_SCHEME,
};
use crate::error::ConfigurationError;
use crate::option::{DeclaredOption, OptionTable, ResourceOption, convert};
use crate::resolver::{Level, PathRule, SchemeDescriptor, SchemeResolver};

/// Whether frames pass through a codec before reaching the handler.
pub static CODEC_REQUIRED: ResourceOption<bool> =
    ResourceOption::new("ws.codecRequired", true, convert::boolean);

/// Skips the extension handshake and ping handling.
pub static LIGHTWEIGHT: ResourceOption<bool> =
    ResourceOption::new("ws.lightweight", false, convert::boolean);

/// Negotiable extensions, in preference order.
pub static EXTENSIONS: ResourceOption<Vec<String>> =
    ResourceOption::new("ws.extensions", Vec::new(), convert::string_list);

/// Largest accepted message in bytes; `0` means unlimited.
pub static MAX_MESSAGE_SIZE: ResourceOption<u32> =
    ResourceOption::new("ws.maxMessageSize", 0, convert::unsigned32);

/// Idle time before the connection is closed; zero disables the check.
/// Bare numbers are milliseconds.
pub static INACTIVITY_TIMEOUT: ResourceOption<Duration> =
    ResourceOption::new("ws.inactivityTimeout", Duration::ZERO, convert::millis);

/// Sub-protocols this endpoint accepts.
pub static SUPPORTED_PROTOCOLS: ResourceOption<Vec<String>> =
    ResourceOption::new("ws.supportedProtocols", Vec::new(), convert::string_list);

/// Sub-protocols a peer must offer.
pub static REQUIRED_PROTOCOLS: ResourceOption<Vec<String>> =
    ResourceOption::new("ws.requiredProtocols", Vec::new(), convert::string_list);

/// Options declared by every WebSocket scheme.
pub static OPTIONS: &[&dyn DeclaredOption] = &[
    &NEXT_PROTOCOL,
    &QUALIFIER,
    &CODEC_REQUIRED,
    &LIGHTWEIGHT,
    &EXTENSIONS,
    &MAX_MESSAGE_SIZE,
    &INACTIVITY_TIMEOUT,
    &SUPPORTED_PROTOCOLS,
    &REQUIRED_PROTOCOLS,
];

fn descriptor(name: &'static str, port: u16, transport: &'static str) -> SchemeDescriptor {
    SchemeDescriptor::new(name, WS_SCHEME, Level::Application)
        .with_default_port(port)
        .with_default_transport(transport)
        .with_path_rule(PathRule::Required)
        .with_declared_options(OPTIONS)
}

/// Resolver for the WebSocket schemes.
///
/// # Examples
///
/// ```
/// use resource_address::{ResourceAddressFactory, RawOptions, scheme::ws};
///
/// let factory = ResourceAddressFactory::new();
/// let options = RawOptions::new().with("ws.maxMessageSize", 1024);
/// let address = factory
///     .new_resource_address_with_options("wss://example.com/feed", &options)
///     .unwrap();
///
/// assert_eq!(address.resource().as_str(), "wss://example.com:443/feed");
/// assert_eq!(*address.option(&ws::MAX_MESSAGE_SIZE), 1024);
/// assert_eq!(address.transport_uri().unwrap().as_str(), "https://example.com:443/feed");
/// ```
#[derive(Debug, Clone)]
pub struct WsResolver {
    descriptor: SchemeDescriptor,
}

impl WsResolver {
    /// Plain WebSocket over `http`.
    #[must_use]
    pub fn ws() -> Self {
        Self {
            descriptor: descriptor(WS_SCHEME, DEFAULT_HTTP_PORT, HTTP_SCHEME),
        }
    }

    /// WebSocket over `https`.
    #[must_use]
    pub fn wss() -> Self {
        Self {
            descriptor: descriptor(WSS_SCHEME, DEFAULT_HTTPS_PORT, HTTPS_SCHEME),
        }
    }

    /// Native-framing WebSocket over `http`.
    #[must_use]
    pub fn wsn() -> Self {
        Self {
            descriptor: descriptor(WSN_SCHEME, DEFAULT_HTTP_PORT, HTTP_SCHEME),
        }
    }

    /// Replaces the default port.
    #[must_use]
    pub const fn with_default_port(mut self, port: u16) -> Self {
        self.descriptor = self.descriptor.with_default_port(port);
        self
    }
}

impl SchemeResolver for WsResolver {
    fn descriptor(&self) -> &SchemeDescriptor {
        &self.descriptor
    }

    fn validate(&self, options: &OptionTable) -> Result<(), ConfigurationError> {
        let supported = options.get(&SUPPORTED_PROTOCOLS).map_or(&[][..], Vec::as_slice);
        let required = options.get(&REQUIRED_PROTOCOLS).map_or(&[][..], Vec::as_slice);
        if supported.is_empty() {
            return Ok(());
        }
        match required.iter().find(|protocol| !supported.contains(*protocol)) {
            Some(missing) => Err(ConfigurationError::new(
                self.descriptor.name(),
                REQUIRED_PROTOCOLS.name(),
                format!("required protocol '{missing}' is not among the supported protocols"),
            )),
            None => Ok(()),
        }
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
        WsResolver::wsn().new_resource_address(&ResourceUri::parse(uri).unwrap(), options, &registry)
    }

    #[test]
    fn descriptors_share_prefix() {
        for resolver in [WsResolver::ws(), WsResolver::wss(), WsResolver::wsn()] {
            assert_eq!(resolver.descriptor().option_prefix(), "ws");
            assert_eq!(resolver.descriptor().path_rule(), PathRule::Required);
        }
        assert_eq!(WsResolver::wss().descriptor().default_port(), Some(443));
        assert_eq!(WsResolver::wss().descriptor().default_transport(), Some("https"));
    }

    #[test]
    fn required_must_be_supported() {
        let options = RawOptions::new()
            .with("ws.supportedProtocols", ["amqp/0.91"])
            .with("ws.requiredProtocols", ["stomp"]);
        let err = resolve("wsn://localhost/", &options).unwrap_err();
        let ResolveError::Configuration(err) = err else {
            panic!("expected configuration error, got {err:?}");
        };
        assert_eq!(err.option, "ws.requiredProtocols");
        assert!(err.reason.contains("stomp"));
    }

    #[test]
    fn required_without_supported_is_accepted() {
        let options = RawOptions::new().with("ws.requiredProtocols", ["stomp"]);
        let address = resolve("wsn://localhost/", &options).unwrap();
        assert_eq!(address.option(&REQUIRED_PROTOCOLS), &["stomp".to_string()]);
    }

    #[test]
    fn custom_default_port() {
        let registry = SchemeRegistry::builtin();
        let uri = ResourceUri::parse("ws://localhost/").unwrap();
        let address = WsResolver::ws()
            .with_default_port(8000)
            .new_resource_address(&uri, &RawOptions::new(), &registry)
            .unwrap();
        assert_eq!(address.resource().port(), Some(8000));
    }
}
