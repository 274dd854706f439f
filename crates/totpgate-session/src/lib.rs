//! Authenticated session management for totpgate.
//!
//! Once a user has typed a correct code, the gate hands them a session
//! cookie so they are not challenged on every request. This crate owns
//! everything about those sessions:
//!
//! 1. **Records**: what a session is ([`Session`], [`SessionConfig`])
//! 2. **Storage**: a concurrent token → session map ([`SessionStore`])
//! 3. **Tokens**: unguessable cookie values ([`generate_token`])
//! 4. **Cleanup**: a background task that evicts expired sessions
//!    ([`Sweeper`])
//! 5. **Time**: an injectable [`Clock`] so expiry is testable
//!
//! # How it fits in the stack
//!
//! ```text
//! Gate (above)  ← checks cookies against the store, creates sessions
//!     ↕
//! Session Layer (this crate)  ← stores, expires and sweeps sessions
//! ```
//!
//! Sessions live only in memory. A restart logs everybody out.

mod clock;
mod error;
mod session;
mod store;
mod sweeper;
mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SessionError;
pub use session::{Session, SessionConfig};
pub use store::SessionStore;
pub use sweeper::Sweeper;
pub use token::{TOKEN_BYTES, generate_token};
