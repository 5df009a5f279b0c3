//! `tcp`, the physical terminus of every chain.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::address::{NEXT_PROTOCOL, QUALIFIER};
use crate::authority::Authority;
use crate::constants::{DEFAULT_MAXIMUM_OUTBOUND_RATE, TCP_SCHEME};
use crate::name_resolver::{NameResolver, StaticNameResolver};
use crate::option::{DeclaredOption, ResourceOption, convert};
use crate::resolver::{Level, PathRule, SchemeDescriptor, SchemeResolver};

/// Local address to bind instead of the resource address, given as a port
/// (`"8080"`, all interfaces) or as `"ip:port"`.
pub static BIND: ResourceOption<Option<SocketAddr>> =
    ResourceOption::new("tcp.bind", None, convert::bind_address);

/// Outbound rate limit in bytes per second.
pub static MAXIMUM_OUTBOUND_RATE: ResourceOption<u64> = ResourceOption::new(
    "tcp.maximumOutboundRate",
    DEFAULT_MAXIMUM_OUTBOUND_RATE,
    convert::unsigned64,
);

/// Options declared by `tcp`.
pub static OPTIONS: &[&dyn DeclaredOption] = &[&NEXT_PROTOCOL, &QUALIFIER, &BIND, &MAXIMUM_OUTBOUND_RATE];

/// Resolver for `tcp`.
///
/// The host is canonicalized through a [`NameResolver`], so
/// `tcp://localhost:4949` resolves to `tcp://127.0.0.1:4949` with the
/// default table.
#[derive(Debug, Clone)]
pub struct TcpResolver {
    descriptor: SchemeDescriptor,
    names: Arc<dyn NameResolver>,
}

impl TcpResolver {
    /// Creates the resolver with the default hosts table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_name_resolver(Arc::new(StaticNameResolver::default()))
    }

    /// Creates the resolver with a custom name resolver.
    #[must_use]
    pub fn with_name_resolver(names: Arc<dyn NameResolver>) -> Self {
        Self {
            descriptor: SchemeDescriptor::new(TCP_SCHEME, TCP_SCHEME, Level::Physical)
                .with_path_rule(PathRule::Dropped)
                .with_declared_options(OPTIONS),
            names,
        }
    }

    /// Sets a default port.
    #[must_use]
    pub fn with_default_port(mut self, port: u16) -> Self {
        self.descriptor = self.descriptor.with_default_port(port);
        self
    }
}

impl Default for TcpResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemeResolver for TcpResolver {
    fn descriptor(&self) -> &SchemeDescriptor {
        &self.descriptor
    }

    fn canonical_authority(&self, authority: Authority) -> Authority {
        let host = self.names.resolve(authority.host());
        authority.with_host(host)
    }
}
