//! Kani Arbitrary implementations and proof harnesses for property verification.
//!
//! # Usage
//!
//! Kani is not a Cargo dependency. Install and run with:
//!
//! ```bash
//! cargo install --locked kani-verifier
//! cargo kani setup
//! cargo kani --features kani
//! ```
//!
//! This module is only compiled when using Kani (`#[cfg(kani)]`).

use std::net::Ipv4Addr;

use crate::option::convert;
use crate::raw::RawValue;
use crate::resolver::Level;
use crate::{Authority, Host};

impl kani::Arbitrary for Host {
    fn any() -> Self {
        let octets: u32 = kani::any();
        Host::Ipv4(Ipv4Addr::from(octets))
    }
}

impl kani::Arbitrary for Authority {
    fn any() -> Self {
        let host: Host = kani::any();
        let has_port: bool = kani::any();
        let port = if has_port { Some(kani::any()) } else { None };
        Authority::new(host, port)
    }
}

impl kani::Arbitrary for Level {
    fn any() -> Self {
        match kani::any::<u8>() % 4 {
            0 => Level::Physical,
            1 => Level::Security,
            2 => Level::Session,
            _ => Level::Application,
        }
    }
}

// ============================================================================
// Kani Proof Harnesses
// ============================================================================

/// Proof: Display then parse yields the same authority
#[kani::proof]
#[kani::unwind(24)]
fn proof_authority_roundtrip() {
    let authority: Authority = kani::any();
    let reparsed = Authority::parse(authority.as_str()).expect("canonical authority should parse");
    assert_eq!(reparsed, authority);
}

/// Proof: with_port always sets exactly the given port
#[kani::proof]
fn proof_with_port_sets_port() {
    let authority: Authority = kani::any();
    let port: u16 = kani::any();
    assert_eq!(authority.with_port(port).port(), Some(port));
    assert_eq!(authority.with_port(port).host(), authority.host());
}

/// Proof: a strictly decreasing chain of levels has at most four links
#[kani::proof]
#[kani::unwind(6)]
fn proof_level_chain_is_bounded() {
    let mut current: Level = kani::any();
    let mut hops = 1;
    for _ in 0..5 {
        let next: Level = kani::any();
        if next < current {
            current = next;
            hops += 1;
        }
    }
    assert!(hops <= 4);
}

/// Proof: unsigned32 accepts exactly the integers in range
#[kani::proof]
fn proof_unsigned32_range() {
    let value: i64 = kani::any();
    let converted = convert::unsigned32(&RawValue::Integer(value));
    assert_eq!(converted.is_ok(), (0..=i64::from(u32::MAX)).contains(&value));
}
