//! Scheme resolvers and the layered resolution algorithm they share.
//!
//! Every scheme goes through the same steps:
//!
//! 1. check the URI scheme against the resolver's scheme
//! 2. check the URI shape and fill in the default port
//! 3. resolve the declared options into a typed table
//! 4. pick the transport: an explicit override or the synthesized default
//! 5. resolve the transport through the registry, one abstraction level lower
//!
//! Scheme-specific behavior lives in the [`SchemeDescriptor`] and in the
//! [`SchemeResolver`] hooks.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::address::{ResourceAddress, TRANSPORT, TRANSPORT_URI};
use crate::authority::Authority;
use crate::error::{ConfigurationError, ResolveError};
use crate::option::{DeclaredOption, OptionTable};
use crate::raw::{RawOptions, RawValue};
use crate::registry::SchemeRegistry;
use crate::resource_uri::ResourceUri;

/// Protocol abstraction level. A transport always sits strictly lower than
/// the layer it carries, which bounds every chain to four layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Byte streams over the network (`tcp`)
    Physical,
    /// Encryption wrappers (`ssl`)
    Security,
    /// Request/response sessions (`http`, `https`)
    Session,
    /// Message protocols (`ws`, `wss`, `wsn`)
    Application,
}

/// How a scheme treats the path of its URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathRule {
    /// An explicit, non-empty path is mandatory.
    Required,
    /// An empty path becomes `/`.
    DefaultRoot,
    /// The path is not part of the resource.
    Dropped,
}

/// Static description of a scheme.
///
/// # Examples
///
/// ```
/// use resource_address::{Level, PathRule, SchemeDescriptor};
///
/// let descriptor = SchemeDescriptor::new("sse", "sse", Level::Application)
///     .with_default_port(80)
///     .with_default_transport("http")
///     .with_path_rule(PathRule::Required);
///
/// assert_eq!(descriptor.default_port(), Some(80));
/// assert_eq!(descriptor.default_transport(), Some("http"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SchemeDescriptor {
    name: &'static str,
    option_prefix: &'static str,
    level: Level,
    default_port: Option<u16>,
    default_transport: Option<&'static str>,
    path_rule: PathRule,
    declared_options: &'static [&'static dyn DeclaredOption],
}

impl SchemeDescriptor {
    /// Describes a scheme with no default port, no default transport, an
    /// optional path and no declared options.
    #[must_use]
    pub const fn new(name: &'static str, option_prefix: &'static str, level: Level) -> Self {
        Self {
            name,
            option_prefix,
            level,
            default_port: None,
            default_transport: None,
            path_rule: PathRule::DefaultRoot,
            declared_options: &[],
        }
    }

    /// Sets the port used when the URI has none.
    #[must_use]
    pub const fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = Some(port);
        self
    }

    /// Sets the scheme of the synthesized transport.
    #[must_use]
    pub const fn with_default_transport(mut self, scheme: &'static str) -> Self {
        self.default_transport = Some(scheme);
        self
    }

    /// Sets the path rule.
    #[must_use]
    pub const fn with_path_rule(mut self, rule: PathRule) -> Self {
        self.path_rule = rule;
        self
    }

    /// Sets the options this scheme resolves into its table.
    #[must_use]
    pub const fn with_declared_options(mut self, options: &'static [&'static dyn DeclaredOption]) -> Self {
        self.declared_options = options;
        self
    }

    /// Returns the scheme name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the prefix of this scheme's raw option keys.
    #[must_use]
    pub const fn option_prefix(&self) -> &'static str {
        self.option_prefix
    }

    /// Returns the abstraction level.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Returns the default port, if the scheme has one.
    #[must_use]
    pub const fn default_port(&self) -> Option<u16> {
        self.default_port
    }

    /// Returns the default transport scheme; `None` for a physical terminus.
    #[must_use]
    pub const fn default_transport(&self) -> Option<&'static str> {
        self.default_transport
    }

    /// Returns the path rule.
    #[must_use]
    pub const fn path_rule(&self) -> PathRule {
        self.path_rule
    }

    /// Returns the declared options.
    #[must_use]
    pub const fn declared_options(&self) -> &'static [&'static dyn DeclaredOption] {
        self.declared_options
    }

    /// Returns true if this scheme declares an option with the given local name.
    #[must_use]
    pub fn declares(&self, local_name: &str) -> bool {
        self.declared_options
            .iter()
            .any(|option| option.local_name() == local_name)
    }
}

/// Resolves URIs of one scheme into [`ResourceAddress`] layers.
///
/// Implementors supply a [`SchemeDescriptor`] and optionally override the
/// hooks; the resolution steps themselves are shared.
pub trait SchemeResolver: fmt::Debug + Send + Sync {
    /// Returns the static description of the scheme.
    fn descriptor(&self) -> &SchemeDescriptor;

    /// Canonicalizes the authority of the resource URI. The port is already
    /// filled in.
    fn canonical_authority(&self, authority: Authority) -> Authority {
        authority
    }

    /// Checks constraints spanning several resolved options.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` naming the offending option.
    fn validate(&self, options: &OptionTable) -> Result<(), ConfigurationError> {
        let _ = options;
        Ok(())
    }

    /// Resolves `uri` as one layer of the chain described by `cx`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if this layer or any layer below it fails.
    fn resolve(&self, uri: &ResourceUri, cx: &Resolution<'_>) -> Result<ResourceAddress, ResolveError> {
        resolve_layer(self, uri, cx)
    }

    /// Resolves `uri` with `options` as the outermost layer.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::SchemeMismatch` if `uri` is of another scheme,
    /// and any error of the layers below.
    fn new_resource_address(
        &self,
        uri: &ResourceUri,
        options: &RawOptions,
        registry: &SchemeRegistry,
    ) -> Result<ResourceAddress, ResolveError> {
        self.resolve(uri, &Resolution::new(registry, options))
    }
}

/// State threaded through one resolution: the registry, the caller's raw
/// option bag, and the layers already resolved above the current one.
#[derive(Debug)]
pub struct Resolution<'a> {
    registry: &'a SchemeRegistry,
    raw: Cow<'a, RawOptions>,
    outer: Vec<SchemeDescriptor>,
}

impl<'a> Resolution<'a> {
    /// Starts a resolution at the outermost layer.
    #[must_use]
    pub fn new(registry: &'a SchemeRegistry, raw: &'a RawOptions) -> Self {
        Self {
            registry,
            raw: Cow::Borrowed(raw),
            outer: Vec::new(),
        }
    }

    /// Returns the raw options visible to the current layer.
    #[must_use]
    pub fn raw(&self) -> &RawOptions {
        &self.raw
    }

    /// Returns the registry.
    #[must_use]
    pub const fn registry(&self) -> &'a SchemeRegistry {
        self.registry
    }

    /// Finds the raw value for `local_name` as seen by a layer with `prefix`.
    ///
    /// The layer's own key wins. Otherwise the keys of the outer layers are
    /// tried, nearest first, skipping layers that declare the option
    /// themselves.
    fn lookup(&self, prefix: &str, local_name: &str) -> Option<(String, &RawValue)> {
        let own = RawOptions::key(prefix, local_name);
        if let Some(value) = self.raw.get(&own) {
            return Some((own, value));
        }
        self.outer
            .iter()
            .rev()
            .filter(|layer| layer.option_prefix() != prefix && !layer.declares(local_name))
            .find_map(|layer| {
                let key = RawOptions::key(layer.option_prefix(), local_name);
                self.raw.get(&key).map(|value| (key, value))
            })
    }

    fn resolve_options(&self, descriptor: &SchemeDescriptor) -> Result<OptionTable, ConfigurationError> {
        let mut table = OptionTable::default();
        for option in descriptor.declared_options() {
            let source = self.lookup(descriptor.option_prefix(), option.local_name());
            if let Some((key, _)) = &source {
                trace!(scheme = descriptor.name(), option = option.name(), source = %key, "option resolved");
            }
            option.resolve_into(
                descriptor.name(),
                source.as_ref().map(|(key, value)| (key.as_str(), *value)),
                &mut table,
            )?;
        }
        Ok(table)
    }

    fn descend(
        &self,
        outer: &SchemeDescriptor,
        target: &dyn SchemeResolver,
        uri: &ResourceUri,
        overlay: Option<&RawOptions>,
    ) -> Result<Arc<ResourceAddress>, ResolveError> {
        if target.descriptor().level() >= outer.level() {
            return Err(ResolveError::TransportLevel {
                scheme: outer.name(),
                transport: uri.to_string(),
            });
        }

        let raw = match overlay {
            Some(overlay) if !overlay.is_empty() => Cow::Owned(self.raw.overlaid_with(overlay)),
            _ => Cow::Borrowed(self.raw.as_ref()),
        };
        let mut layers = self.outer.clone();
        layers.push(*outer);

        let child = Resolution {
            registry: self.registry,
            raw,
            outer: layers,
        };
        target.resolve(uri, &child).map(Arc::new)
    }
}

pub(crate) fn resolve_layer<R: SchemeResolver + ?Sized>(
    resolver: &R,
    uri: &ResourceUri,
    cx: &Resolution<'_>,
) -> Result<ResourceAddress, ResolveError> {
    let descriptor = resolver.descriptor();
    let scheme = descriptor.name();
    if !uri.scheme().eq_ignore_ascii_case(scheme) {
        return Err(ResolveError::SchemeMismatch {
            expected: scheme,
            found: uri.scheme().to_string(),
        });
    }

    let resource = canonical_resource(resolver, uri)?;
    let mut options = cx.resolve_options(descriptor)?;
    resolver.validate(&options)?;

    let transport = match TRANSPORT.resolve(scheme, descriptor.option_prefix(), cx.raw())? {
        Some(explicit) => {
            let target = cx.registry.lookup(explicit.uri().scheme())?;
            debug!(scheme, transport = %explicit, "using explicit transport");
            Some(cx.descend(descriptor, target.as_ref(), explicit.uri(), Some(explicit.options()))?)
        }
        None => match descriptor.default_transport() {
            Some(transport_scheme) => {
                let target = cx.registry.lookup(transport_scheme)?;
                let transport_uri = synthesize(&resource, target.descriptor())?;
                debug!(scheme, transport = %transport_uri, "synthesized transport");
                Some(cx.descend(descriptor, target.as_ref(), &transport_uri, None)?)
            }
            None => None,
        },
    };

    if let Some(transport) = &transport {
        options.insert(&TRANSPORT_URI, Some(transport.external_uri().clone()));
    }

    Ok(ResourceAddress::new(
        scheme,
        uri.clone(),
        resource,
        options,
        transport,
    ))
}

fn canonical_resource<R: SchemeResolver + ?Sized>(
    resolver: &R,
    uri: &ResourceUri,
) -> Result<ResourceUri, ResolveError> {
    let descriptor = resolver.descriptor();
    let shaped = match descriptor.path_rule() {
        PathRule::Required if !uri.has_path() => {
            return Err(ResolveError::MissingPath {
                scheme: descriptor.name(),
                uri: uri.to_string(),
            });
        }
        PathRule::DefaultRoot if !uri.has_path() => uri.with_path("/"),
        PathRule::Required | PathRule::DefaultRoot => uri.with_normalized_path(),
        PathRule::Dropped => uri.without_path(),
    };

    let port = uri
        .port()
        .or(descriptor.default_port())
        .ok_or_else(|| ResolveError::MissingPort {
            scheme: descriptor.name(),
            uri: uri.to_string(),
        })?;
    let authority = resolver.canonical_authority(uri.authority().with_port(port));
    Ok(shaped.with_authority(authority))
}

/// Builds `<transport>://<host>:<port><path>` from the carried layer's
/// resource. The path is left out when the transport drops it.
fn synthesize(resource: &ResourceUri, transport: &SchemeDescriptor) -> Result<ResourceUri, ResolveError> {
    let builder = ResourceUri::builder()
        .scheme(transport.name())
        .authority(resource.authority().clone());
    let builder = match transport.path_rule() {
        PathRule::Dropped => builder,
        PathRule::Required | PathRule::DefaultRoot => builder.path(resource.path()),
    };
    Ok(builder.build()?)
}
