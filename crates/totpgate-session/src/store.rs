//! The session store: every live session, keyed by token.
//!
//! # Concurrency note
//!
//! Unlike a store owned by a single accept loop, this one is hit by every
//! request task at once, so it carries its own lock: one
//! [`RwLock`] around a plain `HashMap`.
//!
//! - Lookups take the shared (read) lock and run in parallel.
//! - `put`, `delete` and `sweep` take the exclusive (write) lock.
//!
//! The lock is `std::sync::RwLock`, not the Tokio one, because nothing
//! awaits while holding it: every critical section is a map operation.
//! A poisoned lock is recovered rather than propagated; the map is never
//! left half-updated by any of these methods.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime};

use crate::{Session, SessionError, generate_token};

/// Concurrent token → [`Session`] map.
///
/// ## Lifecycle
///
/// ```text
/// create()/put() ──→ [active] ──→ get() on every request
///                       │
///          ┌────────────┼──────────────┐
///          ▼            ▼              ▼
///   gate: expired   gate: identity   sweep(now)
///     delete()        delete()
///          └────────────┴──────────────┘
///                       ▼
///                    [gone]
/// ```
///
/// `get` deliberately does not evict. The gate decides what to do with an
/// expired or mismatched session so it can log the two cases differently.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a fresh token, stores a session for it and returns a copy.
    ///
    /// # Errors
    /// Returns [`SessionError::TokenGeneration`] if the OS random source
    /// fails; nothing is stored in that case.
    pub fn create(
        &self,
        now: SystemTime,
        ttl: Duration,
        bound_identity: &str,
    ) -> Result<Session, SessionError> {
        let token = generate_token()?;
        let session = Session::new(token, now, ttl, bound_identity);
        self.put(session.clone());

        tracing::debug!(identity = %bound_identity, "session created");
        Ok(session)
    }

    /// Inserts a session, replacing any existing one with the same token.
    pub fn put(&self, session: Session) {
        self.write().insert(session.token.clone(), session);
    }

    /// Looks up a session by token.
    ///
    /// Returns a clone so the read lock is released before the caller
    /// inspects it. Expired sessions are returned as-is.
    pub fn get(&self, token: &str) -> Option<Session> {
        self.read().get(token).cloned()
    }

    /// Removes a session. Returns `true` if one was present.
    ///
    /// Idempotent: deleting an unknown token is a no-op.
    pub fn delete(&self, token: &str) -> bool {
        self.write().remove(token).is_some()
    }

    /// Removes every session with `expires_at <= now`.
    ///
    /// Holds the write lock for the whole pass. Returns how many sessions
    /// were removed; running it twice in a row removes nothing the second
    /// time.
    pub fn sweep(&self, now: SystemTime) -> usize {
        let mut sessions = self.write();
        let before = sessions.len();
        // `retain` keeps entries where the closure returns `true`.
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }

    /// Number of stored sessions, expired or not.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// =========================================================================
// Tests
// =========================================================================
