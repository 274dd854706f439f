//! `TotpGate` builder and shared gate state.
//!
//! This is the entry point for guarding a service. It ties together all the
//! layers: config → otp → identity → session → the per-request handler.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use totpgate_otp::provisioning_uri;
use totpgate_session::{Clock, SessionStore, Sweeper, SystemClock};

use crate::config::{GateConfig, ValidatedConfig};
use crate::layer::GateLayer;
use crate::GateError;

/// Name used in log fields when the builder is not given one.
pub const DEFAULT_GATE_NAME: &str = "totp-gate";

/// Shared state behind every clone of a [`TotpGate`].
///
/// Dropping the last clone drops the [`Sweeper`], which stops the
/// background sweep task.
pub(crate) struct GateState {
    pub(crate) name: String,
    pub(crate) config: ValidatedConfig,
    pub(crate) sessions: Arc<SessionStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) sweeper: Sweeper,
}

/// Builder for configuring and starting a [`TotpGate`].
///
/// # Example
///
/// ```rust,ignore
/// use totpgate::prelude::*;
///
/// let gate = TotpGate::builder(GateConfig::with_secret("JBSWY3DPEHPK3PXP"))
///     .name("admin")
///     .build()?;
/// let app = Router::new().route("/", get(handler)).layer(gate.layer());
/// ```
pub struct TotpGateBuilder {
    config: GateConfig,
    name: String,
    clock: Option<Arc<dyn Clock>>,
    sweep_interval: Option<Duration>,
}

impl TotpGateBuilder {
    /// Creates a new builder around a raw config.
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            name: DEFAULT_GATE_NAME.to_string(),
            clock: None,
            sweep_interval: None,
        }
    }

    /// Sets the name attached to every log event of this gate.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the system clock. Used by tests to drive expiry.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Overrides how often expired sessions are swept (default 5 minutes).
    pub fn sweep_interval(mut self, every: Duration) -> Self {
        self.sweep_interval = Some(every);
        self
    }

    /// Validates the config and starts the sweeper.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// [`GateError::Config`] for a rejected config, and
    /// [`GateError::Session`] when no runtime is available for the sweeper.
    pub fn build(self) -> Result<TotpGate, GateError> {
        let mut config = self.config.validate()?;
        if let Some(every) = self.sweep_interval {
            config.session.sweep_interval = every;
        }

        let sessions = Arc::new(SessionStore::new());
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let sweeper = Sweeper::spawn(
            Arc::clone(&sessions),
            Arc::clone(&clock),
            config.session.sweep_interval,
        )?;

        tracing::info!(
            gate = %self.name,
            session_ttl_secs = config.session.ttl.as_secs(),
            validate_ip = config.validate_ip,
            trusted_proxies = config.trusted_proxies.len(),
            "totp gate ready"
        );

        Ok(TotpGate {
            state: Arc::new(GateState {
                name: self.name,
                config,
                sessions,
                clock,
                sweeper,
            }),
        })
    }
}

/// A TOTP gate in front of some service.
///
/// Cheap to clone: all clones share one session store and one sweeper.
/// Wrap a service with [`layer()`](Self::layer), or drive it by hand
/// with [`authorize()`](Self::authorize).
#[derive(Clone)]
pub struct TotpGate {
    pub(crate) state: Arc<GateState>,
}

impl TotpGate {
    /// Builds a gate with default name, system clock and sweep interval.
    pub fn new(config: GateConfig) -> Result<Self, GateError> {
        Self::builder(config).build()
    }

    /// Creates a new builder.
    pub fn builder(config: GateConfig) -> TotpGateBuilder {
        TotpGateBuilder::new(config)
    }

    /// Returns a tower layer that puts this gate in front of a service.
    pub fn layer(&self) -> GateLayer {
        GateLayer::new(self.clone())
    }

    /// The gate's name, as used in logs.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// The validated configuration.
    pub fn config(&self) -> &ValidatedConfig {
        &self.state.config
    }

    /// The session store shared by all clones.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.state.sessions
    }

    /// The `otpauth://` URI to enroll this gate's secret in an
    /// authenticator app.
    pub fn provisioning_uri(&self) -> String {
        let config = &self.state.config;
        provisioning_uri(&config.secret, &config.issuer, &config.account_name, &config.totp)
    }

    /// Stops the background sweeper. Requests are still served; expired
    /// sessions are then only removed when they are presented.
    pub fn shutdown(&self) {
        self.state.sweeper.stop();
        tracing::debug!(gate = %self.state.name, "gate shutdown requested");
    }

    /// Returns `true` while the sweep task is running.
    pub fn is_sweeping(&self) -> bool {
        !self.state.sweeper.is_finished()
    }
}

impl fmt::Debug for TotpGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TotpGate")
            .field("name", &self.state.name)
            .field("config", &self.state.config)
            .field("sessions", &self.state.sessions.len())
            .finish_non_exhaustive()
    }
}
