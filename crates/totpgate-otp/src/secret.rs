//! The shared secret between the gate and the user's authenticator app.
//!
//! Authenticator apps (Google Authenticator, Aegis, 1Password...) exchange
//! the secret as a base32 string, because base32 survives being typed by
//! hand: no lowercase/uppercase confusion, no `0`/`O` ambiguity. Internally
//! we only ever need the raw bytes, which become the HMAC key.

use std::fmt;

use data_encoding::BASE32_NOPAD;
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::OtpError;

/// Length of freshly generated secrets: 160 bits, the size RFC 4226
/// recommends for HMAC-SHA1.
const GENERATED_SECRET_LEN: usize = 20;

/// Decoded HMAC key bytes.
///
/// Immutable once built. `Debug` is implemented by hand so that the key
/// never ends up in a log line by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    bytes: Vec<u8>,
}

impl Secret {
    /// Decodes a base32 secret as shown by authenticator setup screens.
    ///
    /// The input is normalized before decoding: surrounding and inner
    /// whitespace is removed, letters are upper-cased and `=` padding is
    /// optional. So `"gezd gnbv gy3t qojq"` and `"GEZDGNBVGY3TQOJQ"` are
    /// the same secret.
    ///
    /// # Errors
    /// - [`OtpError::EmptySecret`]: nothing left after normalization
    /// - [`OtpError::InvalidSecret`]: characters outside the base32
    ///   alphabet, or a length that cannot be base32
    pub fn from_base32(encoded: &str) -> Result<Self, OtpError> {
        let normalized: String = encoded
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let normalized = normalized.trim_end_matches('=');

        if normalized.is_empty() {
            return Err(OtpError::EmptySecret);
        }

        let bytes = BASE32_NOPAD.decode(normalized.as_bytes())?;
        Self::from_bytes(bytes)
    }

    /// Wraps raw key bytes.
    ///
    /// # Errors
    /// Returns [`OtpError::EmptySecret`] for an empty key: HMAC would
    /// accept it, but every code would then be public knowledge.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, OtpError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(OtpError::EmptySecret);
        }
        Ok(Self { bytes })
    }

    /// Generates a new random secret from the OS random source.
    ///
    /// # Errors
    /// Returns [`OtpError::Random`] if the OS refuses to hand out entropy.
    pub fn generate() -> Result<Self, OtpError> {
        let mut bytes = [0u8; GENERATED_SECRET_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| OtpError::Random(e.to_string()))?;
        Self::from_bytes(bytes.to_vec())
    }

    /// Encodes the secret as unpadded base32, ready for an authenticator app.
    pub fn to_base32(&self) -> String {
        BASE32_NOPAD.encode(&self.bytes)
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`: empty secrets are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([redacted; {} bytes])", self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base32_decodes_ascii_digits() {
        let secret = Secret::from_base32("GEZDGNBVGY3TQOJQ").unwrap();
        assert_eq!(secret.as_bytes(), b"1234567890");
    }

    #[test]
    fn test_from_base32_normalizes_case_spaces_and_padding() {
        let canonical = Secret::from_base32("GEZDGNBVGY3TQOJQ").unwrap();

        for variant in ["gezdgnbvgy3tqojq", " gezd gnbv gy3t qojq ", "GEZDGNBVGY3TQOJQ======"] {
            let secret = Secret::from_base32(variant).expect(variant);
            assert_eq!(secret, canonical, "variant {variant:?} should decode identically");
        }
    }

    #[test]
    fn test_from_base32_empty_returns_empty_secret() {
        assert!(matches!(Secret::from_base32(""), Err(OtpError::EmptySecret)));
        assert!(matches!(Secret::from_base32("  =="), Err(OtpError::EmptySecret)));
    }

    #[test]
    fn test_from_base32_invalid_alphabet_returns_invalid_secret() {
        // '1', '8' and '9' are not part of the RFC 4648 base32 alphabet.
        let result = Secret::from_base32("18181818");
        assert!(matches!(result, Err(OtpError::InvalidSecret(_))));
    }

    #[test]
    fn test_from_bytes_rejects_empty_key() {
        assert!(matches!(Secret::from_bytes(Vec::new()), Err(OtpError::EmptySecret)));
    }

    #[test]
    fn test_generate_produces_160_bit_secret() {
        let secret = Secret::generate().unwrap();
        assert_eq!(secret.len(), GENERATED_SECRET_LEN);
        // 20 bytes = 160 bits = exactly 32 base32 characters, no padding.
        assert_eq!(secret.to_base32().len(), 32);
    }

    #[test]
    fn test_generate_twice_differs() {
        let a = Secret::generate().unwrap();
        let b = Secret::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_to_base32_round_trips_through_from_base32() {
        let secret = Secret::from_bytes(b"12345678901234567890".to_vec()).unwrap();
        let encoded = secret.to_base32();
        assert_eq!(encoded, "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ");
        assert_eq!(Secret::from_base32(&encoded).unwrap(), secret);
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let secret = Secret::from_bytes(b"hunter2".to_vec()).unwrap();
        let printed = format!("{secret:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("redacted"));
    }
}
