//! # totpgate
//!
//! TOTP authentication gate for axum and tower services.
//!
//! Requests without a valid session cookie get a small HTML form asking for
//! a time-based one-time password. A correct code creates an in-memory
//! session, sets a cookie and redirects back to the original URL; every
//! later request with that cookie passes straight through to the wrapped
//! service.
//!
//! The layers, leaves first:
//!
//! - [`totpgate_otp`]: secrets, code generation and validation.
//! - [`totpgate_identity`]: client identity behind trusted proxies.
//! - [`totpgate_session`]: session store, clock and background sweeper.
//! - this crate: configuration, the per-request gate and its tower layer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use totpgate::prelude::*;
//!
//! # async fn run() -> Result<(), GateError> {
//! let gate = TotpGate::new(GateConfig::with_secret("JBSWY3DPEHPK3PXP"))?;
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "secret stuff" }))
//!     .layer(gate.layer());
//! // Serve `app` with `into_make_service_with_connect_info::<SocketAddr>()`
//! // so the gate can see the client address.
//! # Ok(())
//! # }
//! ```

pub mod challenge;
pub mod config;
pub mod cookie;
mod error;
mod gate;
mod handler;
mod layer;

pub use challenge::ChallengeReason;
pub use config::{CookieSettings, GateConfig, PageText, ValidatedConfig};
pub use error::{ConfigError, GateError};
pub use gate::{DEFAULT_GATE_NAME, TotpGate, TotpGateBuilder};
pub use handler::{Outcome, SessionCheck};
pub use layer::{GateLayer, GateService};

// Re-export sub-crates so users only need `totpgate` as a dependency.
pub use totpgate_identity;
pub use totpgate_otp;
pub use totpgate_session;

/// Convenience re-exports for the common case.
///
/// ```rust
/// use totpgate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ChallengeReason, ConfigError, GateConfig, GateError, GateLayer, GateService, Outcome,
        SessionCheck, TotpGate, ValidatedConfig,
    };
    pub use totpgate_otp::{Secret, TotpParams};
    pub use totpgate_session::{Clock, ManualClock, SessionStore, SystemClock};
}
