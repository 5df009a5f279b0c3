//! Untyped option bags as supplied by callers and configuration files.

use std::collections::BTreeMap;
use std::fmt;

use crate::resource_uri::ResourceUri;

/// A single untyped option value.
///
/// This is the input side of option resolution; each layer converts the values
/// it declares into typed entries exactly once.
///
/// URIs are carried as their text, so a bag survives a trip through JSON or
/// TOML unchanged and keeps its identity as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RawValue {
    /// A boolean flag
    Bool(bool),
    /// A signed integer
    Integer(i64),
    /// A string, possibly holding a number, duration, URI or comma-separated list
    String(String),
    /// An ordered list of strings
    List(Vec<String>),
    /// A nested option bag, used for transport overrides
    Options(RawOptions),
}

impl RawValue {
    /// Returns a short name for the value's shape, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Options(_) => "option bag",
        }
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u16> for RawValue {
    fn from(value: u16) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for RawValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for RawValue {
    fn from(value: &[&str]) -> Self {
        Self::List(value.iter().map(|s| (*s).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RawValue {
    fn from(value: [&str; N]) -> Self {
        Self::List(value.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<ResourceUri> for RawValue {
    fn from(value: ResourceUri) -> Self {
        Self::String(value.as_str().to_string())
    }
}

impl From<RawOptions> for RawValue {
    fn from(value: RawOptions) -> Self {
        Self::Options(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
            Self::Options(options) => write!(f, "{{{options}}}"),
        }
    }
}

/// A bag of untyped options keyed `<prefix>.<optionName>`.
///
/// Keys are kept sorted so that two bags with the same entries compare and
/// hash equal regardless of insertion order.
///
/// # Examples
///
/// ```
/// use resource_address::RawOptions;
///
/// let options = RawOptions::new()
///     .with("ws.maxMessageSize", 1024)
///     .with("ws.extensions", ["x-kaazing-alpha", "x-kaazing-beta"])
///     .with("http.keepAliveTimeout", "25s");
///
/// assert_eq!(options.len(), 3);
/// assert!(options.get("ws.maxMessageSize").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RawOptions {
    entries: BTreeMap<String, RawValue>,
}

impl RawOptions {
    /// Creates an empty option bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bag with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Option<RawValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Returns the value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.get(key)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns an iterator over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a copy of this bag with every entry of `overlay` written on top.
    #[must_use]
    pub fn overlaid_with(&self, overlay: &Self) -> Self {
        let mut merged = self.clone();
        merged
            .entries
            .extend(overlay.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Formats the key for `name` in the `prefix` namespace.
    #[must_use]
    pub fn key(prefix: &str, name: &str) -> String {
        format!("{prefix}.{name}")
    }
}

impl<K, V> FromIterator<(K, V)> for RawOptions
where
    K: Into<String>,
    V: Into<RawValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for RawOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .entries
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        write!(f, "{}", pairs.join(", "))
    }
}
