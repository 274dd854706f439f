//! Unified error type for the totpgate framework.

use totpgate_identity::IdentityError;
use totpgate_otp::{MAX_DIGITS, OtpError};
use totpgate_session::SessionError;

use crate::config::MAX_ALLOWED_SKEW;

/// Problems found while validating a [`GateConfig`](crate::GateConfig).
///
/// All of these are fatal: a gate with a broken secret or proxy list is
/// never built, so no request can ever be served by it.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `secretKey` was missing or blank.
    #[error("secretKey is required")]
    MissingSecret,

    /// `secretKey` is not valid base32.
    #[error(transparent)]
    Secret(#[from] OtpError),

    /// An entry of `trustedProxies` is not valid CIDR.
    #[error(transparent)]
    TrustedProxy(#[from] IdentityError),

    /// `allowedSkew` is negative or unreasonably large.
    #[error("allowedSkew must be between 0 and {max}, got {0}", max = MAX_ALLOWED_SKEW)]
    InvalidSkew(i64),

    /// `codeDigits` is larger than the generator supports.
    #[error("codeDigits must be at most {max}, got {0}", max = MAX_DIGITS)]
    CodeDigits(i64),
}

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A session-level error (no runtime for the sweeper, token failure).
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<OtpError> for GateError {
    fn from(err: OtpError) -> Self {
        Self::Config(ConfigError::Secret(err))
    }
}

impl From<IdentityError> for GateError {
    fn from(err: IdentityError) -> Self {
        Self::Config(ConfigError::TrustedProxy(err))
    }
}
