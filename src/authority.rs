//! Authority (`host[:port]`) of a resource URI.
//!
//! ```text
//! authority = host [ ":" port ]
//! host      = domain / "[" ipv6-address "]" / ipv4-address
//! domain    = label *( "." label )
//! label     = 1*63( ALPHA / DIGIT / "-" / "_" )
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::constants::{MAX_AUTHORITY_LENGTH, MAX_DNS_DOMAIN_LENGTH, MAX_DNS_LABEL_LENGTH};
use crate::error::AuthorityError;

/// The host portion of an authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Host {
    /// A domain name (e.g., "localhost", "gateway.example.com")
    Domain(String),
    /// An IPv4 address (e.g., "127.0.0.1")
    Ipv4(Ipv4Addr),
    /// An IPv6 address (e.g., `::1`)
    Ipv6(Ipv6Addr),
}

impl Host {
    /// Parses a bare host: a domain, an IPv4 address, or a bracketed IPv6 literal.
    ///
    /// # Errors
    ///
    /// Returns `AuthorityError` if the host is empty or malformed.
    pub fn parse(input: &str) -> Result<Self, AuthorityError> {
        if input.is_empty() {
            return Err(AuthorityError::Empty);
        }
        if let Some(inner) = input.strip_prefix('[') {
            let literal = inner.strip_suffix(']').ok_or_else(|| AuthorityError::InvalidIpAddress {
                value: input.to_string(),
                reason: "missing closing bracket for IPv6 literal",
            })?;
            return Self::parse_ipv6(literal);
        }
        Self::parse_unbracketed(input)
    }

    fn parse_unbracketed(host_str: &str) -> Result<Self, AuthorityError> {
        if let Ok(ip) = host_str.parse::<Ipv4Addr>() {
            return Ok(Self::Ipv4(ip));
        }
        validate_domain(host_str)?;
        Ok(Self::Domain(host_str.to_ascii_lowercase()))
    }

    fn parse_ipv6(literal: &str) -> Result<Self, AuthorityError> {
        literal
            .parse::<Ipv6Addr>()
            .map(Self::Ipv6)
            .map_err(|_| AuthorityError::InvalidIpAddress {
                value: literal.to_string(),
                reason: "invalid IPv6 address",
            })
    }
}

impl From<IpAddr> for Host {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Self::Ipv4(v4),
            IpAddr::V6(v6) => Self::Ipv6(v6),
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(d) => f.write_str(d),
            Self::Ipv4(ip) => write!(f, "{ip}"),
            Self::Ipv6(ip) => write!(f, "[{ip}]"),
        }
    }
}

/// A validated authority (`host[:port]`) from a resource URI.
///
/// # Examples
///
/// ```
/// use resource_address::Authority;
///
/// let authority = Authority::parse("localhost:2020").unwrap();
/// assert_eq!(authority.host().to_string(), "localhost");
/// assert_eq!(authority.port(), Some(2020));
///
/// let authority = Authority::parse("[::1]").unwrap();
/// assert!(authority.port().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Authority {
    host: Host,
    port: Option<u16>,
    /// Normalized string representation (lowercase host)
    normalized: String,
}

impl Authority {
    /// Creates an authority from an already validated host and optional port.
    #[must_use]
    pub fn new(host: Host, port: Option<u16>) -> Self {
        let normalized = Self::normalize(&host, port);
        Self {
            host,
            port,
            normalized,
        }
    }

    /// Parses an authority from a string.
    ///
    /// # Errors
    ///
    /// Returns `AuthorityError` if:
    /// - The input is empty
    /// - The input exceeds the maximum authority length
    /// - The domain contains invalid characters or labels
    /// - The IP address is malformed
    /// - The port is invalid (not numeric or out of range)
    pub fn parse(input: &str) -> Result<Self, AuthorityError> {
        if input.is_empty() {
            return Err(AuthorityError::Empty);
        }

        if input.len() > MAX_AUTHORITY_LENGTH {
            return Err(AuthorityError::TooLong {
                max: MAX_AUTHORITY_LENGTH,
                actual: input.len(),
            });
        }

        // Handle IPv6 literals: [::1]:port
        if input.starts_with('[') {
            return Self::parse_ipv6_literal(input);
        }

        let (host_str, port) = Self::split_host_port(input)?;
        let host = Host::parse_unbracketed(host_str)?;
        Ok(Self::new(host, port))
    }

    /// Returns the host portion.
    #[must_use]
    pub const fn host(&self) -> &Host {
        &self.host
    }

    /// Returns the port, if specified.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the normalized string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Returns a new authority with the given port.
    #[must_use]
    pub fn with_port(&self, port: u16) -> Self {
        Self::new(self.host.clone(), Some(port))
    }

    /// Returns a new authority with the given host, keeping the port.
    #[must_use]
    pub fn with_host(&self, host: Host) -> Self {
        Self::new(host, self.port)
    }

    fn split_host_port(input: &str) -> Result<(&str, Option<u16>), AuthorityError> {
        let Some((host_part, port_part)) = input.rsplit_once(':') else {
            return Ok((input, None));
        };

        if port_part.is_empty() {
            // "host:" is treated as no port
            return Ok((host_part, None));
        }

        if !port_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(AuthorityError::InvalidPort {
                value: port_part.to_string(),
                reason: "port must be numeric",
            });
        }

        let port: u16 = port_part.parse().map_err(|_| AuthorityError::InvalidPort {
            value: port_part.to_string(),
            reason: "port must be 0-65535",
        })?;
        Ok((host_part, Some(port)))
    }

    fn parse_ipv6_literal(input: &str) -> Result<Self, AuthorityError> {
        let closing_bracket = input.find(']').ok_or_else(|| AuthorityError::InvalidIpAddress {
            value: input.to_string(),
            reason: "missing closing bracket for IPv6 literal",
        })?;

        let host = Host::parse_ipv6(&input[1..closing_bracket])?;

        let rest = &input[closing_bracket + 1..];
        let port = if rest.is_empty() {
            None
        } else {
            let port_str = rest.strip_prefix(':').ok_or_else(|| AuthorityError::InvalidPort {
                value: rest.to_string(),
                reason: "expected ':' after IPv6 closing bracket",
            })?;
            Some(port_str.parse::<u16>().map_err(|_| AuthorityError::InvalidPort {
                value: port_str.to_string(),
                reason: "port must be 0-65535",
            })?)
        };

        Ok(Self::new(host, port))
    }

    fn normalize(host: &Host, port: Option<u16>) -> String {
        match port {
            Some(p) => format!("{host}:{p}"),
            None => host.to_string(),
        }
    }
}

fn validate_domain(domain: &str) -> Result<(), AuthorityError> {
    if domain.len() > MAX_DNS_DOMAIN_LENGTH {
        return Err(AuthorityError::InvalidDomain {
            domain: domain.to_string(),
            reason: "domain exceeds 253 character limit",
        });
    }

    let mut offset = 0;
    for label in domain.split('.') {
        if label.is_empty() {
            return Err(AuthorityError::InvalidDomain {
                domain: domain.to_string(),
                reason: "empty label (consecutive dots or leading/trailing dot)",
            });
        }

        if label.len() > MAX_DNS_LABEL_LENGTH {
            return Err(AuthorityError::LabelTooLong {
                label: label.to_string(),
                max: MAX_DNS_LABEL_LENGTH,
                actual: label.len(),
            });
        }

        // Underscores show up in internal service names, so they are tolerated
        for (j, c) in label.chars().enumerate() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' {
                return Err(AuthorityError::InvalidChar {
                    char: c,
                    position: offset + j,
                });
            }
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(AuthorityError::InvalidDomain {
                domain: domain.to_string(),
                reason: "label cannot start or end with hyphen",
            });
        }

        offset += label.len() + 1;
    }

    Ok(())
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl FromStr for Authority {
    type Err = AuthorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Authority {
    fn as_ref(&self) -> &str {
        &self.normalized
    }
}

impl PartialOrd for Authority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Authority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized.cmp(&other.normalized)
    }
}

impl PartialOrd for Host {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Host {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Domain(a), Self::Domain(b)) => a.cmp(b),
            (Self::Ipv4(a), Self::Ipv4(b)) => a.cmp(b),
            (Self::Ipv6(a), Self::Ipv6(b)) => a.cmp(b),
            (Self::Domain(_), _) | (Self::Ipv4(_), Self::Ipv6(_)) => Ordering::Less,
            (_, Self::Domain(_)) | (Self::Ipv6(_), Self::Ipv4(_)) => Ordering::Greater,
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Host {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Host {
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
    fn parse_domain() {
        let authority = Authority::parse("gateway.example.com").unwrap();
        assert_eq!(authority.host(), &Host::Domain("gateway.example.com".to_string()));
        assert!(authority.port().is_none());
    }

    #[test]
    fn parse_domain_with_port() {
        let authority = Authority::parse("localhost:2020").unwrap();
        assert_eq!(authority.host().to_string(), "localhost");
        assert_eq!(authority.port(), Some(2020));
    }

    #[test]
    fn parse_ipv4_with_port() {
        let authority = Authority::parse("127.0.0.1:4949").unwrap();
        assert!(matches!(authority.host(), Host::Ipv4(_)));
        assert_eq!(authority.port(), Some(4949));
    }

    #[test]
    fn parse_ipv6_literal() {
        let authority = Authority::parse("[::1]:8000").unwrap();
        assert!(matches!(authority.host(), Host::Ipv6(_)));
        assert_eq!(authority.port(), Some(8000));
        assert_eq!(authority.as_str(), "[::1]:8000");
    }

    #[test]
    fn parse_ipv6_without_port() {
        let authority = Authority::parse("[::1]").unwrap();
        assert!(authority.port().is_none());
    }

    #[test]
    fn trailing_colon_means_no_port() {
        let authority = Authority::parse("localhost:").unwrap();
        assert!(authority.port().is_none());
        assert_eq!(authority.as_str(), "localhost");
    }

    #[test]
    fn normalizes_to_lowercase() {
        let authority = Authority::parse("LocalHost:80").unwrap();
        assert_eq!(authority.as_str(), "localhost:80");
    }

    #[test]
    fn with_port_replaces_port() {
        let authority = Authority::parse("localhost").unwrap().with_port(80);
        assert_eq!(authority.as_str(), "localhost:80");
    }

    #[test]
    fn with_host_keeps_port() {
        let authority = Authority::parse("localhost:4949")
            .unwrap()
            .with_host(Host::Ipv4(Ipv4Addr::LOCALHOST));
        assert_eq!(authority.as_str(), "127.0.0.1:4949");
    }

    #[test]
    fn parse_empty_fails() {
        assert!(matches!(Authority::parse(""), Err(AuthorityError::Empty)));
    }

    #[test]
    fn parse_non_numeric_port_fails() {
        let result = Authority::parse("localhost:http");
        assert!(matches!(result, Err(AuthorityError::InvalidPort { .. })));
    }

    #[test]
    fn parse_out_of_range_port_fails() {
        let result = Authority::parse("localhost:70000");
        assert!(matches!(result, Err(AuthorityError::InvalidPort { .. })));
    }

    #[test]
    fn parse_invalid_domain_fails() {
        let result = Authority::parse("invalid..domain");
        assert!(matches!(result, Err(AuthorityError::InvalidDomain { .. })));
    }

    #[test]
    fn parse_label_with_hyphen_start_fails() {
        let result = Authority::parse("-invalid.com");
        assert!(matches!(result, Err(AuthorityError::InvalidDomain { .. })));
    }

    #[test]
    fn invalid_char_position_points_into_domain() {
        let result = Authority::parse("a.b!c");
        assert!(matches!(
            result,
            Err(AuthorityError::InvalidChar { char: '!', position: 3 })
        ));
    }
}
