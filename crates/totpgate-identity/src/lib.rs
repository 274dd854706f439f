//! Client identity resolution for totpgate.
//!
//! "Who is this request from?" has two consumers in the gate: sessions can
//! be bound to the client address, and every authentication attempt is
//! audit-logged with it. Both need the same answer, and the answer must not
//! be forgeable by a client that simply sends an `X-Forwarded-For` header.
//!
//! - [`TrustedProxySet`]: the CIDR ranges whose forwarding headers we
//!   believe. Built once from configuration, immutable afterwards.
//! - [`resolve`]: raw peer address + forwarding headers + trusted set →
//!   identity string.
//!
//! # Trust boundary
//!
//! ```text
//! client ──→ trusted proxy (10.0.0.5) ──→ gate
//!            writes X-Forwarded-For: <client>
//! ```
//!
//! Headers are honoured only when the *direct* peer is inside a trusted
//! range. From anyone else they are ignored and the peer address is the
//! identity.

mod error;
mod proxies;
mod resolver;

pub use error::IdentityError;
pub use proxies::TrustedProxySet;
pub use resolver::{peer_host, resolve};

/// Standard forwarding header (comma-separated chain, client first).
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Single-address forwarding header set by nginx and friends.
pub const X_REAL_IP: &str = "x-real-ip";
