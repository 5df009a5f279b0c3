//! Error types for resource URI parsing and address resolution.

use thiserror::Error;

/// Errors that can occur when parsing a resource URI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse resource URI '{input}': {kind}")]
pub struct UriError {
    /// The input that failed to parse
    pub input: String,
    /// The specific error that occurred
    pub kind: UriErrorKind,
}

/// Specific URI parsing error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriErrorKind {
    /// URI is empty
    #[error("input is empty")]
    Empty,
    /// URI exceeds maximum length
    #[error("URI length {actual} exceeds maximum {max}")]
    TooLong {
        /// Maximum allowed length
        max: usize,
        /// Actual length
        actual: usize,
    },
    /// Missing or malformed scheme
    #[error("{}", scheme_message(.found))]
    InvalidScheme {
        /// The scheme that was found, if any
        found: Option<String>,
    },
    /// Authority parsing failed
    #[error("invalid authority: {0}")]
    InvalidAuthority(#[from] AuthorityError),
    /// Unexpected character at position
    #[error("unexpected character '{char}' at position {position}")]
    UnexpectedChar {
        /// The unexpected character
        char: char,
        /// Position in the input
        position: usize,
    },
}

fn scheme_message(found: &Option<String>) -> String {
    match found {
        Some(s) => format!("invalid scheme '{s}'; expected letters, digits, '+', '-' or '.'"),
        None => "missing scheme; URI must start with '<scheme>://'".to_string(),
    }
}

/// Errors for authority (`host[:port]`) parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    /// Authority is empty
    #[error("authority cannot be empty")]
    Empty,
    /// Authority exceeds maximum length
    #[error("authority length {actual} exceeds maximum {max}")]
    TooLong {
        /// Maximum allowed length
        max: usize,
        /// Actual length
        actual: usize,
    },
    /// Invalid domain name
    #[error("invalid domain '{domain}': {reason}")]
    InvalidDomain {
        /// The invalid domain
        domain: String,
        /// Reason for invalidity
        reason: &'static str,
    },
    /// Invalid IP address
    #[error("invalid IP address '{value}': {reason}")]
    InvalidIpAddress {
        /// The invalid value
        value: String,
        /// Reason for invalidity
        reason: &'static str,
    },
    /// Invalid port number
    #[error("invalid port '{value}': {reason}")]
    InvalidPort {
        /// The invalid value
        value: String,
        /// Reason for invalidity
        reason: &'static str,
    },
    /// DNS label too long
    #[error("DNS label '{label}' is {actual} chars, max is {max}")]
    LabelTooLong {
        /// The too-long label
        label: String,
        /// Maximum allowed length
        max: usize,
        /// Actual length
        actual: usize,
    },
    /// Invalid character in domain
    #[error("invalid character '{char}' at position {position}")]
    InvalidChar {
        /// The invalid character
        char: char,
        /// Position in the input
        position: usize,
    },
}

/// Errors that can occur when building a URI with [`ResourceUriBuilder`](crate::ResourceUriBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// The scheme is malformed
    #[error("invalid scheme '{scheme}'")]
    InvalidScheme {
        /// The rejected scheme
        scheme: String,
    },
    /// No authority was set
    #[error("authority is required")]
    MissingAuthority,
    /// The resulting URI would exceed the maximum length
    #[error("URI length {actual} exceeds maximum {max}")]
    UriTooLong {
        /// Maximum allowed length
        max: usize,
        /// Actual length
        actual: usize,
    },
}

/// An option value could not be converted to its declared type, or it
/// violates a constraint of the scheme that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for option '{option}' of scheme '{scheme}': {reason}")]
pub struct ConfigurationError {
    /// Scheme whose resolver rejected the value
    pub scheme: String,
    /// Raw option key that carried the value
    pub option: String,
    /// Reason for rejection
    pub reason: String,
}

impl ConfigurationError {
    pub(crate) fn new(
        scheme: impl Into<String>,
        option: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            option: option.into(),
            reason: reason.into(),
        }
    }
}

/// Errors produced while resolving a URI into a [`ResourceAddress`](crate::ResourceAddress).
///
/// Resolution is a pure function of its inputs, so none of these are
/// retryable: the caller decides whether a failure aborts startup or rejects a
/// single connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The input is not an absolute hierarchical URI
    #[error(transparent)]
    InvalidUri(#[from] UriError),
    /// A resolver was handed a URI of another scheme
    #[error("scheme '{found}' does not match resolver scheme '{expected}'")]
    SchemeMismatch {
        /// Scheme the resolver handles
        expected: &'static str,
        /// Scheme found in the URI
        found: String,
    },
    /// The scheme requires an explicit path
    #[error("'{uri}' has no path; scheme '{scheme}' requires an explicit path such as '/'")]
    MissingPath {
        /// Scheme requiring the path
        scheme: &'static str,
        /// Offending URI
        uri: String,
    },
    /// The scheme has no default port and none was given
    #[error("'{uri}' has no port and scheme '{scheme}' has no default port")]
    MissingPort {
        /// Scheme requiring the port
        scheme: &'static str,
        /// Offending URI
        uri: String,
    },
    /// No resolver is registered for a scheme in the chain
    #[error("no resolver registered for scheme '{scheme}'")]
    UnsupportedScheme {
        /// The unknown scheme
        scheme: String,
    },
    /// An option value was rejected
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// An explicit transport does not sit below the layer it carries
    #[error("transport '{transport}' cannot carry scheme '{scheme}'; transports must be lower-level protocols")]
    TransportLevel {
        /// Scheme of the carried layer
        scheme: &'static str,
        /// Offending transport URI
        transport: String,
    },
    /// A transport URI could not be synthesized
    #[error("cannot synthesize transport URI: {0}")]
    Synthesis(#[from] BuilderError),
    /// A resolver for the scheme is already registered
    #[error("a resolver for scheme '{scheme}' is already registered")]
    DuplicateScheme {
        /// The conflicting scheme
        scheme: String,
    },
}
