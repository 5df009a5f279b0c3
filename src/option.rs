//! Typed option descriptors and the per-layer option table.
//!
//! Every option a scheme understands is declared once as a `static`
//! [`ResourceOption`]. Descriptors are compared by identity, so a table lookup
//! is a typed, reference-based operation rather than string re-parsing.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigurationError;
use crate::raw::{RawOptions, RawValue};

/// Converts a raw value into an option's typed value, or explains why not.
pub type Converter<T> = fn(&RawValue) -> Result<T, String>;

/// Values that can be stored in an [`OptionTable`].
pub trait OptionValue: Any + Clone + PartialEq + fmt::Debug + Send + Sync {}

impl<T> OptionValue for T where T: Any + Clone + PartialEq + fmt::Debug + Send + Sync {}

/// A typed, uniquely named option key with a default and a conversion rule.
///
/// Names are namespaced by the scheme family that owns them
/// (`"ws.maxMessageSize"`); options shared by every layer carry a bare name
/// (`"nextProtocol"`). Either way the raw key is looked up under the resolving
/// layer's option prefix, e.g. `"ws.nextProtocol"`.
///
/// # Examples
///
/// ```
/// use resource_address::{RawOptions, scheme::ws};
///
/// let raw = RawOptions::new().with("ws.maxMessageSize", 1024);
/// assert_eq!(ws::MAX_MESSAGE_SIZE.resolve("wsn", "ws", &raw).unwrap(), 1024);
/// assert_eq!(ws::MAX_MESSAGE_SIZE.resolve("wsn", "ws", &RawOptions::new()).unwrap(), 0);
/// ```
pub struct ResourceOption<T: 'static> {
    name: &'static str,
    default: T,
    convert: Converter<T>,
}

impl<T: OptionValue> ResourceOption<T> {
    /// Declares an option. Intended for `static` items.
    pub const fn new(name: &'static str, default: T, convert: Converter<T>) -> Self {
        Self {
            name,
            default,
            convert,
        }
    }

    /// Returns the globally unique name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the name without its namespace.
    #[must_use]
    pub fn local_name(&self) -> &'static str {
        local_name(self.name)
    }

    /// Returns the value used when the option is absent.
    #[must_use]
    pub const fn default_value(&self) -> &T {
        &self.default
    }

    /// Resolves the option from `raw`, looking up `<prefix>.<local name>`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the value cannot be converted.
    pub fn resolve(&self, scheme: &str, prefix: &str, raw: &RawOptions) -> Result<T, ConfigurationError> {
        let key = RawOptions::key(prefix, self.local_name());
        self.convert_or_default(scheme, &key, raw.get(&key))
    }

    fn convert_or_default(
        &self,
        scheme: &str,
        key: &str,
        value: Option<&RawValue>,
    ) -> Result<T, ConfigurationError> {
        match value {
            Some(value) => (self.convert)(value).map_err(|reason| ConfigurationError::new(scheme, key, reason)),
            None => Ok(self.default.clone()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ResourceOption<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceOption")
            .field("name", &self.name)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// Object-safe view of a [`ResourceOption`], used for a scheme's declared set.
pub trait DeclaredOption: fmt::Debug + Send + Sync {
    /// Globally unique name.
    fn name(&self) -> &'static str;

    /// Name without its namespace; the raw key is `<prefix>.<local name>`.
    fn local_name(&self) -> &'static str {
        local_name(self.name())
    }

    /// Converts `source` (or the default when absent) into `table`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` naming `scheme` and the source key if the
    /// value cannot be converted.
    fn resolve_into(
        &self,
        scheme: &str,
        source: Option<(&str, &RawValue)>,
        table: &mut OptionTable,
    ) -> Result<(), ConfigurationError>;
}

impl<T: OptionValue> DeclaredOption for ResourceOption<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn resolve_into(
        &self,
        scheme: &str,
        source: Option<(&str, &RawValue)>,
        table: &mut OptionTable,
    ) -> Result<(), ConfigurationError> {
        let value = match source {
            Some((key, raw)) => self.convert_or_default(scheme, key, Some(raw))?,
            None => self.default.clone(),
        };
        table.insert_named(self.name, value);
        Ok(())
    }
}

fn local_name(name: &'static str) -> &'static str {
    name.rsplit_once('.').map_or(name, |(_, local)| local)
}

trait DynValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynValue) -> bool;
}

impl<T: OptionValue> DynValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynValue) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|o| o == self)
    }
}

/// Immutable mapping from option descriptor to typed value for one layer.
#[derive(Clone, Default)]
pub struct OptionTable {
    entries: BTreeMap<&'static str, Arc<dyn DynValue>>,
}

impl OptionTable {
    /// Returns the value for `option`, if this layer declared it.
    #[must_use]
    pub fn get<T: OptionValue>(&self, option: &ResourceOption<T>) -> Option<&T> {
        self.entries
            .get(option.name)
            .and_then(|value| value.as_ref().as_any().downcast_ref::<T>())
    }

    /// Returns true if a value is stored under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the option names in this table, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub(crate) fn insert<T: OptionValue>(&mut self, option: &ResourceOption<T>, value: T) {
        self.insert_named(option.name, value);
    }

    fn insert_named<T: OptionValue>(&mut self, name: &'static str, value: T) {
        self.entries.insert(name, Arc::new(value));
    }
}

impl PartialEq for OptionTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().zip(other.entries.iter()).all(|((ka, va), (kb, vb))| {
                ka == kb && va.as_ref().dyn_eq(vb.as_ref())
            })
    }
}

impl Eq for OptionTable {}

impl fmt::Debug for OptionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Conversion rules used by option declarations.
pub mod convert {
    use std::net::{Ipv4Addr, SocketAddr};
    use std::time::Duration;

    use crate::raw::{RawOptions, RawValue};
    use crate::resource_uri::ResourceUri;
    use crate::transport::TransportOverride;

    fn mismatch(expected: &str, found: &RawValue) -> String {
        format!("expected {expected}, found {} {found}", found.kind())
    }

    /// `true`/`false`, or the strings `"true"`/`"false"` in any case.
    pub fn boolean(raw: &RawValue) -> Result<bool, String> {
        match raw {
            RawValue::Bool(b) => Ok(*b),
            RawValue::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            RawValue::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(mismatch("a boolean", other)),
        }
    }

    /// A non-empty string; absent means `None`.
    pub fn optional_string(raw: &RawValue) -> Result<Option<String>, String> {
        match raw {
            RawValue::String(s) if s.trim().is_empty() => Ok(None),
            RawValue::String(s) => Ok(Some(s.trim().to_string())),
            other => Err(mismatch("a string", other)),
        }
    }

    fn integer(raw: &RawValue) -> Result<i64, String> {
        match raw {
            RawValue::Integer(i) => Ok(*i),
            RawValue::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("'{s}' is not an integer")),
            other => Err(mismatch("an integer", other)),
        }
    }

    /// A non-negative integer that fits in 32 bits.
    pub fn unsigned32(raw: &RawValue) -> Result<u32, String> {
        let value = integer(raw)?;
        u32::try_from(value).map_err(|_| format!("value {value} is out of range 0..={}", u32::MAX))
    }

    /// A non-negative integer.
    pub fn unsigned64(raw: &RawValue) -> Result<u64, String> {
        let value = integer(raw)?;
        u64::try_from(value).map_err(|_| format!("value {value} must not be negative"))
    }

    /// A list of strings, or one comma-separated string.
    pub fn string_list(raw: &RawValue) -> Result<Vec<String>, String> {
        match raw {
            RawValue::List(items) => Ok(items.clone()),
            RawValue::String(s) => Ok(s
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()),
            other => Err(mismatch("a list of strings", other)),
        }
    }

    /// A duration; bare numbers are milliseconds.
    pub fn millis(raw: &RawValue) -> Result<Duration, String> {
        duration(raw, Duration::from_millis)
    }

    /// A duration; bare numbers are seconds.
    pub fn seconds(raw: &RawValue) -> Result<Duration, String> {
        duration(raw, Duration::from_secs)
    }

    fn duration(raw: &RawValue, bare: fn(u64) -> Duration) -> Result<Duration, String> {
        match raw {
            RawValue::Integer(_) => unsigned64(raw).map(bare),
            RawValue::String(s) => parse_duration(s, bare),
            other => Err(mismatch("a duration", other)),
        }
    }

    /// Parses `"<n>"` or `"<n><unit>"` where unit is one of `ms`, `s`, `m`, `h`
    /// or a spelled-out form such as `"5 seconds"`.
    pub(crate) fn parse_duration(input: &str, bare: fn(u64) -> Duration) -> Result<Duration, String> {
        let trimmed = input.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        let amount: u64 = number
            .parse()
            .map_err(|_| format!("'{input}' is not a duration"))?;

        let duration = match unit.trim().to_ascii_lowercase().as_str() {
            "" => bare(amount),
            "ms" | "millis" | "millisecond" | "milliseconds" => Duration::from_millis(amount),
            "s" | "sec" | "secs" | "second" | "seconds" => Duration::from_secs(amount),
            "m" | "min" | "mins" | "minute" | "minutes" => Duration::from_secs(amount.saturating_mul(60)),
            "h" | "hour" | "hours" => Duration::from_secs(amount.saturating_mul(3600)),
            other => return Err(format!("unknown duration unit '{other}' in '{input}'")),
        };
        Ok(duration)
    }

    /// A parseable URI string.
    pub fn optional_uri(raw: &RawValue) -> Result<Option<ResourceUri>, String> {
        match raw {
            RawValue::String(s) => ResourceUri::parse(s).map(Some).map_err(|e| e.to_string()),
            other => Err(mismatch("a URI", other)),
        }
    }

    /// A transport URI, or a nested option bag carrying `uri` plus options
    /// for the transport layers.
    pub fn transport(raw: &RawValue) -> Result<Option<TransportOverride>, String> {
        match raw {
            RawValue::Options(bag) => {
                let uri = bag
                    .get(TransportOverride::URI_KEY)
                    .ok_or_else(|| format!("nested transport options need a '{}' entry", TransportOverride::URI_KEY))
                    .and_then(optional_uri)?
                    .ok_or_else(|| "nested transport URI is empty".to_string())?;
                let options: RawOptions = bag
                    .iter()
                    .filter(|(key, _)| *key != TransportOverride::URI_KEY)
                    .map(|(key, value)| (key.to_string(), value.clone()))
                    .collect();
                Ok(Some(TransportOverride::with_options(uri, options)))
            }
            other => Ok(optional_uri(other)?.map(TransportOverride::new)),
        }
    }

    /// A bind address: a port (`8080`, bound on all interfaces) or `ip:port`.
    pub fn bind_address(raw: &RawValue) -> Result<Option<SocketAddr>, String> {
        let port_only = |port: i64| {
            u16::try_from(port)
                .map(|p| Some(SocketAddr::from((Ipv4Addr::UNSPECIFIED, p))))
                .map_err(|_| format!("port {port} is out of range 0..=65535"))
        };
        match raw {
            RawValue::Integer(port) => port_only(*port),
            RawValue::String(s) => {
                let s = s.trim();
                if let Ok(port) = s.parse::<i64>() {
                    return port_only(port);
                }
                s.parse::<SocketAddr>()
                    .map(Some)
                    .map_err(|_| format!("'{s}' is not a port or ip:port socket address"))
            }
            other => Err(mismatch("a port or socket address", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    static FLAG: ResourceOption<bool> = ResourceOption::new("test.flag", true, convert::boolean);
    static SIZE: ResourceOption<u32> = ResourceOption::new("test.size", 0, convert::unsigned32);
    static NAMES: ResourceOption<Vec<String>> =
        ResourceOption::new("test.names", Vec::new(), convert::string_list);
    static LABEL: ResourceOption<Option<String>> =
        ResourceOption::new("label", None, convert::optional_string);

    #[test]
    fn local_name_strips_namespace() {
        assert_eq!(FLAG.local_name(), "flag");
        assert_eq!(LABEL.local_name(), "label");
    }

    #[test]
    fn resolve_absent_returns_default() {
        let raw = RawOptions::new();
        assert!(FLAG.resolve("test", "test", &raw).unwrap());
        assert_eq!(SIZE.resolve("test", "test", &raw).unwrap(), 0);
        assert!(NAMES.resolve("test", "test", &raw).unwrap().is_empty());
    }

    #[test]
    fn resolve_uses_prefix() {
        let raw = RawOptions::new().with("other.size", 5).with("test.size", 7);
        assert_eq!(SIZE.resolve("test", "test", &raw).unwrap(), 7);
        assert_eq!(SIZE.resolve("other", "other", &raw).unwrap(), 5);
    }

    #[test]
    fn common_option_resolves_under_any_prefix() {
        let raw = RawOptions::new().with("ws.label", "custom");
        assert_eq!(
            LABEL.resolve("wsn", "ws", &raw).unwrap(),
            Some("custom".to_string())
        );
    }

    #[test]
    fn wrong_shape_is_configuration_error() {
        let raw = RawOptions::new().with("test.flag", 3);
        let err = FLAG.resolve("test", "test", &raw).unwrap_err();
        assert_eq!(err.option, "test.flag");
        assert_eq!(err.scheme, "test");
        assert!(err.reason.contains("boolean"));
    }

    #[test]
    fn out_of_range_is_configuration_error() {
        let raw = RawOptions::new().with("test.size", -1);
        let err = SIZE.resolve("test", "test", &raw).unwrap_err();
        assert!(err.reason.contains("out of range"));
    }

    #[test]
    fn table_get_is_typed() {
        let mut table = OptionTable::default();
        table.insert(&SIZE, 1024);
        table.insert(&FLAG, false);
        assert_eq!(table.get(&SIZE), Some(&1024));
        assert_eq!(table.get(&FLAG), Some(&false));
        assert_eq!(table.get(&NAMES), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn tables_compare_by_value() {
        let mut a = OptionTable::default();
        let mut b = OptionTable::default();
        a.insert(&NAMES, vec!["x".to_string()]);
        b.insert(&NAMES, vec!["x".to_string()]);
        assert_eq!(a, b);

        b.insert(&NAMES, vec!["y".to_string()]);
        assert_ne!(a, b);
    }

    #[test]
    fn declared_option_resolves_into_table() {
        let mut table = OptionTable::default();
        let declared: &dyn DeclaredOption = &SIZE;
        declared
            .resolve_into("test", Some(("test.size", &RawValue::Integer(9))), &mut table)
            .unwrap();
        assert_eq!(table.get(&SIZE), Some(&9));

        let declared: &dyn DeclaredOption = &FLAG;
        declared.resolve_into("test", None, &mut table).unwrap();
        assert_eq!(table.get(&FLAG), Some(&true));
    }

    #[test]
    fn boolean_accepts_strings() {
        assert_eq!(convert::boolean(&RawValue::from("TRUE")), Ok(true));
        assert_eq!(convert::boolean(&RawValue::from("false")), Ok(false));
        assert!(convert::boolean(&RawValue::from("yes")).is_err());
    }

    #[test]
    fn list_accepts_comma_separated_string() {
        assert_eq!(
            convert::string_list(&RawValue::from("x-alpha, x-beta,,")),
            Ok(vec!["x-alpha".to_string(), "x-beta".to_string()])
        );
    }

    #[test]
    fn durations() {
        assert_eq!(convert::millis(&RawValue::from(5000)), Ok(Duration::from_secs(5)));
        assert_eq!(convert::seconds(&RawValue::from(25)), Ok(Duration::from_secs(25)));
        assert_eq!(convert::millis(&RawValue::from("5s")), Ok(Duration::from_secs(5)));
        assert_eq!(convert::seconds(&RawValue::from("1500ms")), Ok(Duration::from_millis(1500)));
        assert_eq!(convert::seconds(&RawValue::from("2 minutes")), Ok(Duration::from_secs(120)));
        assert_eq!(convert::seconds(&RawValue::from("30")), Ok(Duration::from_secs(30)));
        assert!(convert::millis(&RawValue::from("soon")).is_err());
        assert!(convert::millis(&RawValue::from("5 fortnights")).is_err());
        assert!(convert::millis(&RawValue::from(-1)).is_err());
    }

    #[test]
    fn bind_address_forms() {
        assert_eq!(
            convert::bind_address(&RawValue::from(8080)),
            Ok(Some("0.0.0.0:8080".parse().unwrap()))
        );
        assert_eq!(
            convert::bind_address(&RawValue::from("127.0.0.1:9000")),
            Ok(Some("127.0.0.1:9000".parse().unwrap()))
        );
        assert!(convert::bind_address(&RawValue::from("localhost:9000")).is_err());
        assert!(convert::bind_address(&RawValue::from(70000)).is_err());
    }

    #[test]
    fn transport_from_nested_bag() {
        let bag = RawOptions::new()
            .with("uri", "http://localhost:2121/")
            .with("http.keepAliveTimeout", 10);
        let transport = convert::transport(&RawValue::from(bag)).unwrap().unwrap();
        assert_eq!(transport.uri().as_str(), "http://localhost:2121/");
        assert!(transport.options().contains_key("http.keepAliveTimeout"));
        assert!(!transport.options().contains_key("uri"));
    }

    #[test]
    fn transport_bag_without_uri_fails() {
        let bag = RawOptions::new().with("http.keepAliveTimeout", 10);
        assert!(convert::transport(&RawValue::from(bag)).is_err());
    }
}
