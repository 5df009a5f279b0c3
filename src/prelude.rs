//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use resource_address::prelude::*;
//!
//! let factory = ResourceAddressFactory::new();
//! let address = factory
//!     .new_resource_address_with_options("wsn://localhost/", &RawOptions::new())
//!     .unwrap();
//! assert_eq!(address.resource().port(), Some(80));
//! ```
//!
//! Builder state markers (`Empty`, `HasScheme`, `Ready`) are left out.

pub use crate::{
    // Core types
    Authority, Host, RawOptions, RawValue, ResourceAddress, ResourceId, ResourceOption, ResourceUri,
    TransportOverride,
    // Resolution
    FactoryConfig, NameResolver, ResolutionCache, ResourceAddressFactory, SchemeDescriptor, SchemeRegistry,
    SchemeResolver, StaticNameResolver,
    // Builder
    ResourceUriBuilder,
    // Errors
    AuthorityError, BuilderError, ConfigurationError, ResolveError, UriError, UriErrorKind,
    // Common options
    NEXT_PROTOCOL, QUALIFIER, TRANSPORT, TRANSPORT_URI,
};
