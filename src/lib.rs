//! Layered resource-address resolution.
//!
//! A gateway speaks protocols stacked on top of each other: WebSocket over
//! HTTP over TCP, or HTTPS over SSL over TCP. This crate turns a URI and a bag
//! of protocol options into an immutable [`ResourceAddress`] whose layers
//! mirror that stack, each with its own typed option table.
//!
//! # Overview
//!
//! ```text
//! wsn://localhost:4949/path            application  (ws.* options)
//!  └─ http://localhost:4949/path       session      (http.* options)
//!      └─ tcp://127.0.0.1:4949         physical     (tcp.* options)
//! ```
//!
//! Each layer fills in its scheme's default port, converts the options it
//! declares exactly once, and either honors an explicit transport or
//! synthesizes one. Transports always sit at a strictly lower abstraction
//! level, so every chain ends at a physical layer.
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use resource_address::{RawOptions, ResourceAddressFactory, scheme::ws};
//!
//! let factory = ResourceAddressFactory::new();
//!
//! let options = RawOptions::new()
//!     .with("ws.maxMessageSize", 1024)
//!     .with("ws.inactivityTimeout", "5s");
//!
//! let address = factory
//!     .new_resource_address_with_options("wsn://localhost:2020/", &options)
//!     .unwrap();
//!
//! assert_eq!(*address.option(&ws::MAX_MESSAGE_SIZE), 1024);
//! assert_eq!(address.option(&ws::INACTIVITY_TIMEOUT), &Duration::from_secs(5));
//! assert_eq!(address.transport_uri().unwrap().as_str(), "http://localhost:2020/");
//! ```
//!
//! # Options
//!
//! Raw options are keyed `<prefix>.<name>`, where the prefix belongs to the
//! scheme family (`ws` for `ws`, `wss` and `wsn`). A layer that does not find
//! its own key falls back to the keys of the layers above it, so
//! `ws.keepAliveTimeout` reaches the `http` layer under a `wsn` address.
//!
//! An explicit transport can be given as a URI or as a nested option bag:
//!
//! ```rust
//! use resource_address::{RawOptions, ResourceAddressFactory};
//!
//! let transport = RawOptions::new()
//!     .with("uri", "http://localhost:2121/")
//!     .with("http.keepAliveConnections", 8);
//! let options = RawOptions::new().with("ws.transport", transport);
//!
//! let address = ResourceAddressFactory::new()
//!     .new_resource_address_with_options("ws://localhost:2020/", &options)
//!     .unwrap();
//! assert_eq!(address.transport_uri().unwrap().as_str(), "http://localhost:2121/");
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: (de)serialization for [`RawOptions`], [`RawValue`],
//!   [`ResourceUri`], [`ResourceId`] and [`FactoryConfig`]

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod address;
mod authority;
mod builder;
mod cache;
mod config;
mod constants;
mod error;
mod factory;
#[cfg(kani)]
mod kani_impls;
mod name_resolver;
mod option;
pub mod prelude;
mod raw;
mod registry;
mod resolver;
mod resource_uri;
pub mod scheme;
mod transport;

pub use address::{Layers, NEXT_PROTOCOL, QUALIFIER, ResourceAddress, ResourceId, TRANSPORT, TRANSPORT_URI};
pub use authority::{Authority, Host};
pub use builder::{Empty, HasScheme, Ready, ResourceUriBuilder};
pub use cache::{CacheStats, ResolutionCache};
pub use config::FactoryConfig;
pub use constants::{
    DEFAULT_HTTP_PORT, DEFAULT_HTTPS_PORT, HTTP_SCHEME, HTTPS_SCHEME, MAX_AUTHORITY_LENGTH, MAX_DNS_DOMAIN_LENGTH,
    MAX_DNS_LABEL_LENGTH, MAX_URI_LENGTH, SSL_SCHEME, TCP_SCHEME, WS_SCHEME, WSN_SCHEME, WSS_SCHEME,
};
pub use error::{AuthorityError, BuilderError, ConfigurationError, ResolveError, UriError, UriErrorKind};
pub use factory::ResourceAddressFactory;
pub use name_resolver::{NameResolver, StaticNameResolver};
pub use option::{Converter, DeclaredOption, OptionTable, OptionValue, ResourceOption, convert};
pub use raw::{RawOptions, RawValue};
pub use registry::SchemeRegistry;
pub use resolver::{Level, PathRule, Resolution, SchemeDescriptor, SchemeResolver};
pub use resource_uri::ResourceUri;
pub use transport::TransportOverride;
