//! Built-in scheme resolvers and their option declarations.
//!
//! | scheme | prefix | default port | transport | level |
//! |--------|--------|--------------|-----------|-------|
//! | `ws`    | `ws`   | 80  | `http`  | application |
//! | `wss`   | `ws`   | 443 | `https` | application |
//! | `wsn`   | `ws`   | 80  | `http`  | application |
//! | `http`  | `http` | 80  | `tcp`   | session |
//! | `https` | `http` | 443 | `ssl`   | session |
//! | `ssl`   | `ssl`  | -   | `tcp`   | security |
//! | `tcp`   | `tcp`  | -   | -       | physical |

pub mod http;
pub mod ssl;
pub mod tcp;
pub mod ws;

pub use http::HttpResolver;
pub use ssl::SslResolver;
pub use tcp::TcpResolver;
pub use ws::WsResolver;

use crate::address::{TRANSPORT, TRANSPORT_URI};
use crate::option::DeclaredOption;

static COMMON: &[&dyn DeclaredOption] = &[&TRANSPORT, &TRANSPORT_URI];

/// Returns the built-in option declaration with the given name.
///
/// Declarations are statics, so repeated lookups return the same instance.
///
/// # Examples
///
/// ```
/// use resource_address::scheme;
///
/// let a = scheme::declared_option("ws.maxMessageSize").unwrap();
/// let b = scheme::declared_option("ws.maxMessageSize").unwrap();
/// assert!(std::ptr::addr_eq(a, b));
/// assert!(scheme::declared_option("ws.unknown").is_none());
/// ```
#[must_use]
pub fn declared_option(name: &str) -> Option<&'static dyn DeclaredOption> {
    [COMMON, ws::OPTIONS, http::OPTIONS, ssl::OPTIONS, tcp::OPTIONS]
        .into_iter()
        .flatten()
        .copied()
        .find(|option| option.name() == name)
}
