//! Hierarchical resource URI type.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::authority::{Authority, Host};
use crate::builder::ResourceUriBuilder;
use crate::constants::MAX_URI_LENGTH;
use crate::error::{UriError, UriErrorKind};

/// A parsed absolute, hierarchical URI naming a gateway endpoint.
///
/// Only the subset of URI syntax that accept and connect addresses use is
/// supported: a scheme, a mandatory authority, an optional path, and opaque
/// query and fragment parts.
///
/// # Structure
///
/// ```text
/// <scheme>://<host>[:<port>][/<path>][?<query>][#<fragment>]
/// ```
///
/// # Examples
///
/// ```
/// use resource_address::ResourceUri;
///
/// let uri = ResourceUri::parse("wsn://localhost:2020/echo").unwrap();
/// assert_eq!(uri.scheme(), "wsn");
/// assert_eq!(uri.port(), Some(2020));
/// assert_eq!(uri.path(), "/echo");
///
/// // Scheme and host are case-insensitive; the canonical form is lowercase
/// // while the supplied text is kept as is
/// let uri = ResourceUri::parse("WS://LocalHost/").unwrap();
/// assert_eq!(uri.as_str(), "WS://LocalHost/");
/// assert_eq!(uri.canonical(), "ws://localhost/");
/// assert_eq!(uri, ResourceUri::parse("ws://localhost/").unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct ResourceUri {
    scheme: String,
    authority: Authority,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
    /// Normalized string representation; equality and hashing use it
    normalized: String,
    /// Text as supplied to `parse`, when it differs from `normalized`
    original: Option<String>,
}

impl ResourceUri {
    /// Parses a resource URI from a string.
    ///
    /// # Errors
    ///
    /// Returns `UriError` if:
    /// - The URI is empty or too long
    /// - The scheme is missing or malformed
    /// - The authority is missing or invalid
    /// - The path contains whitespace or control characters
    pub fn parse(input: &str) -> Result<Self, UriError> {
        Self::parse_inner(input).map_err(|kind| UriError {
            input: input.to_string(),
            kind,
        })
    }

    /// Returns a typestate builder for assembling a URI from components.
    #[must_use]
    pub fn builder() -> ResourceUriBuilder {
        ResourceUriBuilder::new()
    }

    /// Returns the scheme, lowercased.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the authority.
    #[must_use]
    pub const fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Returns the host.
    #[must_use]
    pub const fn host(&self) -> &Host {
        self.authority.host()
    }

    /// Returns the explicit port, if any.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.authority.port()
    }

    /// Returns the path, which is empty when the URI has none.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true if the URI carries an explicit, non-empty path.
    #[must_use]
    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// Returns the query string without the leading `?`, if present.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the fragment without the leading `#`, if present.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Returns the URI text: exactly as supplied for a parsed URI, the
    /// canonical form for one derived through a `with_*` method or the builder.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.original.as_deref().unwrap_or(&self.normalized)
    }

    /// Returns the canonical text: lowercase scheme and host, no empty query
    /// or fragment, no empty port.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.normalized
    }

    /// Returns a copy with `.` and `..` path segments removed.
    #[must_use]
    pub fn with_normalized_path(&self) -> Self {
        let path = remove_dot_segments(&self.path);
        self.with_path(path)
    }

    /// Returns a copy with the given authority.
    #[must_use]
    pub fn with_authority(&self, authority: Authority) -> Self {
        Self::from_parts(
            self.scheme.clone(),
            authority,
            self.path.clone(),
            self.query.clone(),
            self.fragment.clone(),
        )
    }

    /// Returns a copy with the given path.
    #[must_use]
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self::from_parts(
            self.scheme.clone(),
            self.authority.clone(),
            path.into(),
            self.query.clone(),
            self.fragment.clone(),
        )
    }

    /// Returns a copy without path, query and fragment.
    #[must_use]
    pub fn without_path(&self) -> Self {
        Self::from_parts(
            self.scheme.clone(),
            self.authority.clone(),
            String::new(),
            None,
            None,
        )
    }

    pub(crate) fn from_parts(
        scheme: String,
        authority: Authority,
        path: String,
        query: Option<String>,
        fragment: Option<String>,
    ) -> Self {
        let normalized =
            Self::normalize(&scheme, &authority, &path, query.as_deref(), fragment.as_deref());
        Self {
            scheme,
            authority,
            path,
            query,
            fragment,
            normalized,
            original: None,
        }
    }

    pub(crate) fn validate_scheme(scheme: &str) -> Result<(), UriErrorKind> {
        let mut chars = scheme.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c));
        if valid {
            Ok(())
        } else {
            Err(UriErrorKind::InvalidScheme {
                found: (!scheme.is_empty()).then(|| scheme.to_string()),
            })
        }
    }

    fn parse_inner(input: &str) -> Result<Self, UriErrorKind> {
        if input.is_empty() {
            return Err(UriErrorKind::Empty);
        }

        if input.len() > MAX_URI_LENGTH {
            return Err(UriErrorKind::TooLong {
                max: MAX_URI_LENGTH,
                actual: input.len(),
            });
        }

        let (scheme, rest) = input
            .split_once("://")
            .ok_or(UriErrorKind::InvalidScheme { found: None })?;
        Self::validate_scheme(scheme)?;
        let rest_offset = scheme.len() + 3;

        let (rest, fragment) = split_off(rest, '#');
        let (rest, query) = split_off(rest, '?');

        let (authority_str, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        let authority = Authority::parse(authority_str)?;

        for (i, c) in path.char_indices() {
            if c.is_whitespace() || c.is_control() {
                return Err(UriErrorKind::UnexpectedChar {
                    char: c,
                    position: rest_offset + authority_str.len() + i,
                });
            }
        }

        let mut uri = Self::from_parts(
            scheme.to_ascii_lowercase(),
            authority,
            path.to_string(),
            query.map(str::to_string),
            fragment.map(str::to_string),
        );
        if uri.normalized != input {
            uri.original = Some(input.to_string());
        }
        Ok(uri)
    }

    fn normalize(
        scheme: &str,
        authority: &Authority,
        path: &str,
        query: Option<&str>,
        fragment: Option<&str>,
    ) -> String {
        let mut result = format!("{scheme}://{authority}{path}");

        if let Some(q) = query {
            result.push('?');
            result.push_str(q);
        }

        if let Some(frag) = fragment {
            result.push('#');
            result.push_str(frag);
        }

        result
    }
}

/// Splits `input` at the first `delimiter`; an empty tail is stripped.
fn split_off(input: &str, delimiter: char) -> (&str, Option<&str>) {
    match input.split_once(delimiter) {
        Some((head, "")) => (head, None),
        Some((head, tail)) => (head, Some(tail)),
        None => (input, None),
    }
}

fn remove_dot_segments(path: &str) -> String {
    if !path.contains("/.") {
        return path.to_string();
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/').skip(1) {
        match segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut normalized = String::with_capacity(path.len());
    for segment in &segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    // A trailing dot segment names a directory
    if path.ends_with("/.") || path.ends_with("/..") || normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

impl PartialEq for ResourceUri {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for ResourceUri {}

impl Hash for ResourceUri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl PartialOrd for ResourceUri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResourceUri {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized.cmp(&other.normalized)
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceUri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ResourceUri {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for ResourceUri {
    type Error = UriError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ResourceUri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ResourceUri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_uri() {
        let uri = ResourceUri::parse("wsn://localhost:2020/echo").unwrap();
        assert_eq!(uri.scheme(), "wsn");
        assert_eq!(uri.host().to_string(), "localhost");
        assert_eq!(uri.port(), Some(2020));
        assert_eq!(uri.path(), "/echo");
    }

    #[test]
    fn parse_without_path() {
        let uri = ResourceUri::parse("tcp://127.0.0.1:4949").unwrap();
        assert!(!uri.has_path());
        assert_eq!(uri.as_str(), "tcp://127.0.0.1:4949");
    }

    #[test]
    fn parse_opaque_style_authority() {
        let uri = ResourceUri::parse("test://opaque").unwrap();
        assert_eq!(uri.scheme(), "test");
        assert_eq!(uri.host().to_string(), "opaque");
    }

    #[test]
    fn parse_empty_returns_error() {
        let result = ResourceUri::parse("");
        assert!(matches!(
            result,
            Err(UriError {
                kind: UriErrorKind::Empty,
                ..
            })
        ));
    }

    #[test]
    fn parse_too_long_returns_error() {
        let long_path = "a".repeat(MAX_URI_LENGTH);
        let result = ResourceUri::parse(&format!("ws://localhost/{long_path}"));
        assert!(matches!(
            result,
            Err(UriError {
                kind: UriErrorKind::TooLong { .. },
                ..
            })
        ));
    }

    #[test]
    fn parse_missing_scheme_returns_error() {
        let result = ResourceUri::parse("localhost:8000/");
        assert!(matches!(
            result,
            Err(UriError {
                kind: UriErrorKind::InvalidScheme { found: None },
                ..
            })
        ));
    }

    #[test]
    fn parse_malformed_scheme_returns_error() {
        let result = ResourceUri::parse("9ws://localhost/");
        assert!(matches!(
            result,
            Err(UriError {
                kind: UriErrorKind::InvalidScheme { found: Some(_) },
                ..
            })
        ));
    }

    #[test]
    fn parse_missing_authority_returns_error() {
        let result = ResourceUri::parse("ws:///path");
        assert!(matches!(
            result,
            Err(UriError {
                kind: UriErrorKind::InvalidAuthority(_),
                ..
            })
        ));
    }

    #[test]
    fn parse_whitespace_in_path_returns_error() {
        let result = ResourceUri::parse("ws://localhost/a b");
        assert!(matches!(
            result,
            Err(UriError {
                kind: UriErrorKind::UnexpectedChar { char: ' ', position: 16 },
                ..
            })
        ));
    }

    #[test]
    fn parse_query_and_fragment() {
        let uri = ResourceUri::parse("http://localhost:8000/path?a=1#top").unwrap();
        assert_eq!(uri.path(), "/path");
        assert_eq!(uri.query(), Some("a=1"));
        assert_eq!(uri.fragment(), Some("top"));
        assert_eq!(uri.to_string(), "http://localhost:8000/path?a=1#top");
    }

    #[test]
    fn empty_query_is_stripped() {
        let uri = ResourceUri::parse("http://localhost/?").unwrap();
        assert!(uri.query().is_none());
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let a = ResourceUri::parse("WSN://localhost/").unwrap();
        let b = ResourceUri::parse("wsn://localhost/").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn supplied_text_is_kept() {
        for (input, canonical) in [
            ("WSN://LocalHost:2020/Echo", "wsn://localhost:2020/Echo"),
            ("wsn://localhost:2020/?", "wsn://localhost:2020/"),
            ("wsn://localhost:/x", "wsn://localhost/x"),
        ] {
            let uri = ResourceUri::parse(input).unwrap();
            assert_eq!(uri.as_str(), input);
            assert_eq!(uri.to_string(), input);
            assert_eq!(uri.canonical(), canonical);
            assert_eq!(uri, ResourceUri::parse(canonical).unwrap());
        }
    }

    #[test]
    fn derived_uri_is_canonical() {
        let uri = ResourceUri::parse("WSN://LocalHost/a/./b").unwrap();
        assert_eq!(uri.with_normalized_path().as_str(), "wsn://localhost/a/b");
        assert_eq!(uri.without_path().as_str(), "wsn://localhost");
    }

    #[test]
    fn dot_segments_are_removed() {
        let uri = ResourceUri::parse("http://localhost/a/./b/../c").unwrap();
        assert_eq!(uri.with_normalized_path().path(), "/a/c");

        let uri = ResourceUri::parse("http://localhost/a/..").unwrap();
        assert_eq!(uri.with_normalized_path().path(), "/");

        let uri = ResourceUri::parse("http://localhost/plain").unwrap();
        assert_eq!(uri.with_normalized_path().path(), "/plain");
    }

    #[test]
    fn without_path_drops_query_and_fragment() {
        let uri = ResourceUri::parse("http://localhost:80/x?y#z").unwrap();
        assert_eq!(uri.without_path().as_str(), "http://localhost:80");
    }

    #[test]
    fn display_roundtrip() {
        let input = "wss://gateway.example.com:9000/amqp";
        let uri = ResourceUri::parse(input).unwrap();
        assert_eq!(uri.to_string(), input);
    }
}
