//! Session types: what the gate remembers about an authenticated client.

use std::time::{Duration, SystemTime};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a session stays valid after a successful code entry.
    ///
    /// Default: 1 hour.
    pub ttl: Duration,

    /// How often the background sweeper evicts expired sessions.
    ///
    /// Default: 5 minutes. Expired sessions are already rejected on read,
    /// so this only bounds memory, not security.
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(300),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single authenticated session.
///
/// Created by the gate after a correct code, read on every request, and
/// removed either by the gate (expired or identity mismatch) or by the
/// sweeper. A removed session is never revived; the client must enter a
/// new code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The cookie value. 64 hex characters, see
    /// [`generate_token`](crate::generate_token).
    pub token: String,

    /// When the code was accepted.
    pub created_at: SystemTime,

    /// Always `created_at + ttl`.
    pub expires_at: SystemTime,

    /// The client identity at creation time. Only compared when the gate
    /// runs with IP validation enabled.
    pub bound_identity: String,
}

impl Session {
    /// Builds a session that expires `ttl` after `now`.
    pub fn new(
        token: impl Into<String>,
        now: SystemTime,
        ttl: Duration,
        bound_identity: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            created_at: now,
            expires_at: now + ttl,
            bound_identity: bound_identity.into(),
        }
    }

    /// `true` once `now` is strictly past `expires_at`.
    ///
    /// This is the read-path check. The sweeper is one tick more eager
    /// and also removes sessions with `expires_at == now`.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        now > self.expires_at
    }

    /// The lifetime this session was created with.
    pub fn ttl(&self) -> Duration {
        self.expires_at
            .duration_since(self.created_at)
            .unwrap_or(Duration::ZERO)
    }
}
