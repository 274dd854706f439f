//! Error types for the session layer.

/// Errors that can occur during session management.
///
/// Lookups never fail (a missing session is just `None`), so these cover
/// the two things that touch the outside world: the OS random source and
/// the Tokio runtime.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The OS random source failed while generating a session token.
    /// The request that triggered it should be re-challenged.
    #[error("failed to generate session token: {0}")]
    TokenGeneration(String),

    /// The sweeper was started outside a Tokio runtime.
    #[error("session sweeper requires a running Tokio runtime")]
    NoRuntime,
}
