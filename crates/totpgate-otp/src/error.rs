//! Error types for the one-time password layer.

/// Errors that can occur while loading a shared secret.
///
/// Code generation and validation themselves cannot fail once a
/// [`Secret`](crate::Secret) exists, so every variant here is a
/// construction-time problem.
#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    /// The secret string was empty (or only whitespace/padding).
    #[error("secret key is empty")]
    EmptySecret,

    /// The secret string is not valid base32 (RFC 4648 alphabet).
    #[error("invalid secret key (must be base32 encoded): {0}")]
    InvalidSecret(#[from] data_encoding::DecodeError),

    /// The OS random source failed while generating a fresh secret.
    #[error("random source unavailable: {0}")]
    Random(String),
}
