//! Constants for resource URI validation and scheme defaults.

/// Maximum total URI length in characters.
pub const MAX_URI_LENGTH: usize = 2048;

/// Maximum authority length including port.
pub const MAX_AUTHORITY_LENGTH: usize = 262;

/// DNS label maximum length.
pub const MAX_DNS_LABEL_LENGTH: usize = 63;

/// DNS domain maximum length.
pub const MAX_DNS_DOMAIN_LENGTH: usize = 253;

/// Scheme name for TCP.
pub const TCP_SCHEME: &str = "tcp";

/// Scheme name for TLS over TCP.
pub const SSL_SCHEME: &str = "ssl";

/// Scheme name for HTTP.
pub const HTTP_SCHEME: &str = "http";

/// Scheme name for HTTP over TLS.
pub const HTTPS_SCHEME: &str = "https";

/// Scheme name for WebSocket.
pub const WS_SCHEME: &str = "ws";

/// Scheme name for WebSocket over TLS.
pub const WSS_SCHEME: &str = "wss";

/// Scheme name for the native WebSocket sub-protocol.
pub const WSN_SCHEME: &str = "wsn";

/// Default port for cleartext HTTP-carried schemes.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Default port for TLS-carried HTTP schemes.
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Default HTTP keep-alive timeout in seconds.
pub const DEFAULT_KEEP_ALIVE_TIMEOUT_SECS: u64 = 30;

/// Default number of idle keep-alive connections per HTTP endpoint.
pub const DEFAULT_KEEP_ALIVE_CONNECTIONS: u32 = 2;

/// Default TCP outbound rate limit in bytes per second.
pub const DEFAULT_MAXIMUM_OUTBOUND_RATE: u64 = 0xFFFF_FFFF;
