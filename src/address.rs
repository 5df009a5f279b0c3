//! The immutable, layered resource address.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use crate::option::{OptionTable, OptionValue, ResourceOption, convert};
use crate::resource_uri::ResourceUri;
use crate::transport::TransportOverride;

/// Application-level protocol carried by the endpoint, e.g. `"amqp/0.91"`.
pub static NEXT_PROTOCOL: ResourceOption<Option<String>> =
    ResourceOption::new("nextProtocol", None, convert::optional_string);

/// Free-form discriminator distinguishing otherwise identical endpoints.
pub static QUALIFIER: ResourceOption<Option<String>> =
    ResourceOption::new("qualifier", None, convert::optional_string);

/// Explicit transport replacing the synthesized one.
///
/// Consumed during resolution: the chosen transport is reachable through
/// [`ResourceAddress::transport`], not through the option table.
pub static TRANSPORT: ResourceOption<Option<TransportOverride>> =
    ResourceOption::new("transport", None, convert::transport);

/// URI of the layer below, recorded in every non-terminal layer's table.
pub static TRANSPORT_URI: ResourceOption<Option<ResourceUri>> =
    ResourceOption::new("transportUri", None, convert::optional_uri);

/// Identity of an endpoint, independent of its option values.
///
/// Two addresses with equal ids name the same endpoint even if they were
/// resolved with different tuning options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceId {
    scheme: String,
    authority: String,
    path: String,
    next_protocol: Option<String>,
    qualifier: Option<String>,
}

impl ResourceId {
    pub(crate) fn new(
        resource: &ResourceUri,
        next_protocol: Option<String>,
        qualifier: Option<String>,
    ) -> Self {
        Self {
            scheme: resource.scheme().to_string(),
            authority: resource.authority().as_str().to_string(),
            path: resource.path().to_string(),
            next_protocol,
            qualifier,
        }
    }

    /// Returns the scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the canonical `host:port` authority.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Returns the canonical path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the next protocol, if any.
    #[must_use]
    pub fn next_protocol(&self) -> Option<&str> {
        self.next_protocol.as_deref()
    }

    /// Returns the qualifier, if any.
    #[must_use]
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.path)?;
        if let Some(next) = &self.next_protocol {
            write!(f, " [{next}]")?;
        }
        if let Some(qualifier) = &self.qualifier {
            write!(f, " ({qualifier})")?;
        }
        Ok(())
    }
}

/// One resolved endpoint and the chain of transports that carries it.
///
/// A `ResourceAddress` is never mutated after resolution. Its transport is
/// shared behind an [`Arc`], and the chain always ends at a physical layer
/// whose transport is `None`.
///
/// # Examples
///
/// ```
/// use resource_address::ResourceAddressFactory;
///
/// let factory = ResourceAddressFactory::new();
/// let address = factory.new_resource_address("wsn://localhost:2020/echo").unwrap();
///
/// let schemes: Vec<&str> = address.layers().map(|layer| layer.scheme()).collect();
/// assert_eq!(schemes, ["wsn", "http", "tcp"]);
/// assert_eq!(address.transport_uri().unwrap().as_str(), "http://localhost:2020/echo");
/// assert_eq!(address.terminus().resource().as_str(), "tcp://127.0.0.1:2020");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAddress {
    scheme: &'static str,
    external_uri: ResourceUri,
    resource: ResourceUri,
    resource_id: ResourceId,
    options: OptionTable,
    transport: Option<Arc<ResourceAddress>>,
}

impl ResourceAddress {
    pub(crate) fn new(
        scheme: &'static str,
        external_uri: ResourceUri,
        resource: ResourceUri,
        options: OptionTable,
        transport: Option<Arc<Self>>,
    ) -> Self {
        let next_protocol = options.get(&NEXT_PROTOCOL).cloned().flatten();
        let qualifier = options.get(&QUALIFIER).cloned().flatten();
        let resource_id = ResourceId::new(&resource, next_protocol, qualifier);
        Self {
            scheme,
            external_uri,
            resource,
            resource_id,
            options,
            transport,
        }
    }

    /// Returns the scheme of the resolver that produced this layer.
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        self.scheme
    }

    /// Returns the URI exactly as supplied. It compares equal to its
    /// canonical form but `as_str` and `Display` give the caller's text.
    #[must_use]
    pub const fn external_uri(&self) -> &ResourceUri {
        &self.external_uri
    }

    /// Returns the canonical URI: default port filled in, path normalized.
    #[must_use]
    pub const fn resource(&self) -> &ResourceUri {
        &self.resource
    }

    /// Returns the identity key of this layer.
    #[must_use]
    pub const fn resource_id(&self) -> &ResourceId {
        &self.resource_id
    }

    /// Returns the typed option table of this layer.
    #[must_use]
    pub const fn options(&self) -> &OptionTable {
        &self.options
    }

    /// Returns the value of `option`, or its default when this layer does
    /// not declare it.
    #[must_use]
    pub fn option<'a, T: OptionValue>(&'a self, option: &'a ResourceOption<T>) -> &'a T {
        self.options.get(option).unwrap_or_else(|| option.default_value())
    }

    /// Returns the value of `option` only if this layer declares it.
    #[must_use]
    pub fn try_option<T: OptionValue>(&self, option: &ResourceOption<T>) -> Option<&T> {
        self.options.get(option)
    }

    /// Returns the next protocol, if any.
    #[must_use]
    pub fn next_protocol(&self) -> Option<&str> {
        self.resource_id.next_protocol()
    }

    /// Returns the qualifier, if any.
    #[must_use]
    pub fn qualifier(&self) -> Option<&str> {
        self.resource_id.qualifier()
    }

    /// Returns the layer below, or `None` at the physical terminus.
    #[must_use]
    pub fn transport(&self) -> Option<&Self> {
        self.transport.as_deref()
    }

    /// Returns the shared handle to the layer below.
    #[must_use]
    pub const fn transport_arc(&self) -> Option<&Arc<Self>> {
        self.transport.as_ref()
    }

    /// Returns the external URI of the layer below.
    #[must_use]
    pub fn transport_uri(&self) -> Option<&ResourceUri> {
        self.transport().map(Self::external_uri)
    }

    /// Iterates from this layer down to the physical terminus.
    #[must_use]
    pub const fn layers(&self) -> Layers<'_> {
        Layers { next: Some(self) }
    }

    /// Returns the first layer, starting here, with the given scheme.
    #[must_use]
    pub fn find_layer(&self, scheme: &str) -> Option<&Self> {
        self.layers()
            .find(|layer| layer.scheme.eq_ignore_ascii_case(scheme))
    }

    /// Returns the physical layer at the bottom of the chain.
    #[must_use]
    pub fn terminus(&self) -> &Self {
        let mut layer = self;
        while let Some(next) = layer.transport() {
            layer = next;
        }
        layer
    }

    /// Returns the number of layers, this one included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layers().count()
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for layer in self.layers() {
            if !first {
                f.write_str(" -> ")?;
            }
            first = false;
            write!(f, "{}", layer.resource)?;
        }
        Ok(())
    }
}

/// Iterator over the layers of a [`ResourceAddress`], outermost first.
#[derive(Debug, Clone)]
pub struct Layers<'a> {
    next: Option<&'a ResourceAddress>,
}

impl<'a> Iterator for Layers<'a> {
    type Item = &'a ResourceAddress;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.transport();
        Some(current)
    }
}

impl FusedIterator for Layers<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(uri: &str, options: OptionTable, transport: Option<ResourceAddress>) -> ResourceAddress {
        let uri = ResourceUri::parse(uri).unwrap();
        let scheme: &'static str = match uri.scheme() {
            "tcp" => "tcp",
            "http" => "http",
            _ => "wsn",
        };
        ResourceAddress::new(scheme, uri.clone(), uri, options, transport.map(Arc::new))
    }

    fn chain() -> ResourceAddress {
        let tcp = layer("tcp://127.0.0.1:8080", OptionTable::default(), None);
        let http = layer("http://localhost:8080/", OptionTable::default(), Some(tcp));
        let mut options = OptionTable::default();
        options.insert(&NEXT_PROTOCOL, Some("amqp/0.91".to_string()));
        layer("wsn://localhost:8080/", options, Some(http))
    }

    #[test]
    fn layers_walk_to_terminus() {
        let address = chain();
        let schemes: Vec<_> = address.layers().map(ResourceAddress::scheme).collect();
        assert_eq!(schemes, ["wsn", "http", "tcp"]);
        assert_eq!(address.depth(), 3);
        assert_eq!(address.terminus().scheme(), "tcp");
        assert!(address.terminus().transport().is_none());
    }

    #[test]
    fn find_layer_is_case_insensitive() {
        let address = chain();
        assert_eq!(address.find_layer("HTTP").unwrap().scheme(), "http");
        assert!(address.find_layer("ssl").is_none());
    }

    #[test]
    fn resource_id_carries_next_protocol() {
        let address = chain();
        assert_eq!(address.next_protocol(), Some("amqp/0.91"));
        assert_eq!(address.resource_id().to_string(), "wsn://localhost:8080/ [amqp/0.91]");
        assert_eq!(address.transport().unwrap().next_protocol(), None);
    }

    #[test]
    fn option_falls_back_to_default() {
        let address = chain();
        assert_eq!(address.option(&QUALIFIER), &None);
        assert!(address.try_option(&QUALIFIER).is_none());
    }

    #[test]
    fn display_lists_every_layer() {
        assert_eq!(
            chain().to_string(),
            "wsn://localhost:8080/ -> http://localhost:8080/ -> tcp://127.0.0.1:8080"
        );
    }

    #[test]
    fn ids_order_by_scheme_then_authority() {
        let a = ResourceId::new(&ResourceUri::parse("http://a:80/").unwrap(), None, None);
        let b = ResourceId::new(&ResourceUri::parse("http://b:80/").unwrap(), None, None);
        assert!(a < b);
    }
}
