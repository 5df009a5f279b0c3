//! Explicit transport overrides.

use std::fmt;

use crate::raw::RawOptions;
use crate::resource_uri::ResourceUri;

/// A caller-supplied transport for one layer, replacing the synthesized one.
///
/// Given either as a plain URI (`"ws.transport": "http://localhost:2121/"`) or
/// as a nested option bag carrying a `uri` entry plus extra options for the
/// transport layers:
///
/// ```text
/// ws.transport = { uri = "http://localhost:2121/", "http.keepAliveTimeout" = 10 }
/// ```
///
/// Nested options are laid over the caller's complete raw bag before the
/// transport is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportOverride {
    uri: ResourceUri,
    options: RawOptions,
}

impl TransportOverride {
    /// Key of the transport URI inside a nested option bag.
    pub const URI_KEY: &'static str = "uri";

    /// Creates an override from a bare URI.
    #[must_use]
    pub fn new(uri: ResourceUri) -> Self {
        Self::with_options(uri, RawOptions::new())
    }

    /// Creates an override carrying extra options for the transport layers.
    #[must_use]
    pub const fn with_options(uri: ResourceUri, options: RawOptions) -> Self {
        Self { uri, options }
    }

    /// Returns the transport URI.
    #[must_use]
    pub const fn uri(&self) -> &ResourceUri {
        &self.uri
    }

    /// Returns the extra options, possibly empty.
    #[must_use]
    pub const fn options(&self) -> &RawOptions {
        &self.options
    }
}

impl fmt::Display for TransportOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.options.is_empty() {
            write!(f, "{}", self.uri)
        } else {
            write!(f, "{} {{{}}}", self.uri, self.options)
        }
    }
}
