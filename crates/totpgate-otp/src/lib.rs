//! One-time password primitives for totpgate.
//!
//! This crate knows nothing about HTTP, cookies or sessions. It answers
//! exactly two questions:
//!
//! - **What is the code right now?** ([`generate`], [`hotp`]): a pure
//!   function of a [`Secret`], a time-step index and a digit count.
//! - **Is this submitted code acceptable?** ([`is_valid`]): the generator
//!   applied across a small window of neighbouring time steps to absorb
//!   clock drift between the server and the authenticator app.
//!
//! # Architecture
//!
//! ```text
//! Secret (bytes) → hotp(counter) → generate(time step) → is_valid(window)
//! ```
//!
//! Everything here is deterministic and free of I/O except
//! [`Secret::generate`], which reads the OS random source.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod error;
mod generator;
mod provisioning;
mod secret;
mod validator;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::OtpError;
pub use generator::{generate, hotp, time_step_index};
pub use provisioning::provisioning_uri;
pub use secret::Secret;
pub use validator::{TotpParams, is_valid};

/// Largest digit count the generator supports.
///
/// The truncated HMAC value is a 31-bit integer (at most 2_147_483_647),
/// so more than ten digits would only ever add leading zeros.
pub const MAX_DIGITS: u32 = 10;
