//! Gate configuration: the raw, deserializable form and the validated form.
//!
//! [`GateConfig`] mirrors what an operator writes in a config file. Every
//! field has a default, so `{"secretKey": "..."}` is a complete config.
//! [`GateConfig::validate`] turns it into a [`ValidatedConfig`] up front:
//! the secret is decoded, proxy ranges are parsed and out-of-range numbers
//! are either defaulted or rejected, before any request is served.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use totpgate_identity::TrustedProxySet;
use totpgate_otp::{MAX_DIGITS, Secret, TotpParams};
use totpgate_session::SessionConfig;
use tracing::warn;

use crate::ConfigError;

/// Largest accepted `allowedSkew`. Every extra step on each side adds two
/// more valid codes, so anything beyond this is a misconfiguration.
pub const MAX_ALLOWED_SKEW: i64 = 10;

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "totp_session";

const DEFAULT_SESSION_EXPIRY: i64 = 3600;
const DEFAULT_TIME_STEP: i64 = 30;
const DEFAULT_CODE_DIGITS: i64 = 6;

// ---------------------------------------------------------------------------
// GateConfig
// ---------------------------------------------------------------------------

/// Configuration as written by the operator (JSON/YAML keys in camelCase).
///
/// Numeric fields are signed on purpose: a negative value in a config file
/// must reach [`validate`](Self::validate) to be reported, not fail
/// deserialization with a confusing type error.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GateConfig {
    /// Base32 TOTP secret. Required.
    pub secret_key: String,

    /// Session lifetime in seconds. Default 3600; `<= 0` means default.
    pub session_expiry: i64,

    /// Session cookie name. Default `totp_session`; empty means default.
    pub cookie_name: String,

    /// Cookie `Domain` attribute. Empty means host-only.
    pub cookie_domain: String,

    /// Cookie `Secure` attribute. Default `true`.
    pub cookie_secure: bool,

    /// Issuer shown in authenticator apps (provisioning URI only).
    pub issuer: String,

    /// Account name shown in authenticator apps (provisioning URI only).
    pub account_name: String,

    /// Seconds per code. Default 30; `<= 0` means default.
    pub time_step: i64,

    /// Code length. Default 6; `<= 0` means default; above 10 is rejected.
    pub code_digits: i64,

    /// Accepted steps on each side of the current one. Default 1.
    /// Negative values are rejected.
    pub allowed_skew: i64,

    /// Challenge page heading.
    pub page_title: String,

    /// Challenge page subheading.
    pub page_description: String,

    /// Bind sessions to the client identity that created them.
    /// Default `false`: NATs and multi-homed clients would be logged out.
    #[serde(rename = "validateIP", alias = "validateIp")]
    pub validate_ip: bool,

    /// CIDR ranges whose `X-Forwarded-For`/`X-Real-IP` headers are trusted.
    pub trusted_proxies: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            session_expiry: DEFAULT_SESSION_EXPIRY,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_domain: String::new(),
            cookie_secure: true,
            issuer: "MyService".to_string(),
            account_name: "user@example.com".to_string(),
            time_step: DEFAULT_TIME_STEP,
            code_digits: DEFAULT_CODE_DIGITS,
            allowed_skew: 1,
            page_title: "TOTP Authentication Required".to_string(),
            page_description: "Please enter your TOTP code to continue".to_string(),
            validate_ip: false,
            trusted_proxies: Vec::new(),
        }
    }
}

// Hand-written so the secret never shows up in logs or panic messages.
impl fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("secret_key", &"[redacted]")
            .field("session_expiry", &self.session_expiry)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_domain", &self.cookie_domain)
            .field("cookie_secure", &self.cookie_secure)
            .field("time_step", &self.time_step)
            .field("code_digits", &self.code_digits)
            .field("allowed_skew", &self.allowed_skew)
            .field("validate_ip", &self.validate_ip)
            .field("trusted_proxies", &self.trusted_proxies)
            .finish_non_exhaustive()
    }
}

impl GateConfig {
    /// Creates a default config with the given secret.
    pub fn with_secret(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    /// Checks and normalizes every field.
    ///
    /// Rules:
    /// - `secretKey` blank → [`ConfigError::MissingSecret`]; not base32 →
    ///   [`ConfigError::Secret`].
    /// - `sessionExpiry`, `timeStep` `<= 0` → default (with a warning).
    /// - `codeDigits` `<= 0` → 6; `> 10` → [`ConfigError::CodeDigits`].
    /// - `allowedSkew` outside `0..=10` → [`ConfigError::InvalidSkew`].
    /// - any bad `trustedProxies` entry → [`ConfigError::TrustedProxy`].
    /// - empty `cookieName` → `totp_session`; empty `cookieDomain` → none.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        if self.secret_key.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        let secret = Secret::from_base32(&self.secret_key)?;

        let session_expiry = positive_or_default("sessionExpiry", self.session_expiry, DEFAULT_SESSION_EXPIRY);
        let time_step = positive_or_default("timeStep", self.time_step, DEFAULT_TIME_STEP);
        let code_digits = positive_or_default("codeDigits", self.code_digits, DEFAULT_CODE_DIGITS);

        if code_digits > i64::from(MAX_DIGITS) {
            return Err(ConfigError::CodeDigits(code_digits));
        }
        if !(0..=MAX_ALLOWED_SKEW).contains(&self.allowed_skew) {
            return Err(ConfigError::InvalidSkew(self.allowed_skew));
        }

        let trusted_proxies = TrustedProxySet::parse(&self.trusted_proxies)?;

        let cookie_name = match self.cookie_name.trim() {
            "" => DEFAULT_COOKIE_NAME.to_string(),
            name => name.to_string(),
        };
        let cookie_domain = match self.cookie_domain.trim() {
            "" => None,
            domain => Some(domain.to_string()),
        };

        // The casts below are lossless: each value was range-checked above.
        let ttl = Duration::from_secs(session_expiry as u64);
        Ok(ValidatedConfig {
            secret,
            totp: TotpParams {
                time_step: time_step as u64,
                digits: code_digits as u32,
                allowed_skew: self.allowed_skew as u32,
            },
            session: SessionConfig {
                ttl,
                ..SessionConfig::default()
            },
            cookie: CookieSettings {
                name: cookie_name,
                domain: cookie_domain,
                secure: self.cookie_secure,
                max_age: ttl,
            },
            validate_ip: self.validate_ip,
            trusted_proxies,
            page: PageText {
                title: self.page_title.clone(),
                description: self.page_description.clone(),
            },
            issuer: self.issuer.clone(),
            account_name: self.account_name.clone(),
        })
    }
}

fn positive_or_default(field: &str, value: i64, default: i64) -> i64 {
    if value > 0 {
        value
    } else {
        warn!(field, value, default, "non-positive config value, using default");
        default
    }
}

// ---------------------------------------------------------------------------
// ValidatedConfig
// ---------------------------------------------------------------------------

/// Cookie attributes for the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    /// Cookie name.
    pub name: String,
    /// `Domain` attribute, if any.
    pub domain: Option<String>,
    /// `Secure` attribute.
    pub secure: bool,
    /// `Max-Age`; always the session lifetime.
    pub max_age: Duration,
}

/// Text shown on the challenge page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: String,
    pub description: String,
}

/// A configuration that passed [`GateConfig::validate`].
///
/// Immutable for the life of the gate.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub secret: Secret,
    pub totp: TotpParams,
    pub session: SessionConfig,
    pub cookie: CookieSettings,
    pub validate_ip: bool,
    pub trusted_proxies: TrustedProxySet,
    pub page: PageText,
    pub issuer: String,
    pub account_name: String,
}
