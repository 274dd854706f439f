//! Session token generation.

use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::SessionError;

/// Random bytes per token: 256 bits of entropy.
pub const TOKEN_BYTES: usize = 32;

/// Generates a random 64-character lowercase hex token.
///
/// The bytes come straight from the OS random source rather than a
/// userspace PRNG. Hex keeps the value cookie-safe without any escaping.
///
/// # Errors
/// Returns [`SessionError::TokenGeneration`] if the OS random source is
/// unavailable.
pub fn generate_token() -> Result<String, SessionError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| SessionError::TokenGeneration(e.to_string()))?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_is_64_lowercase_hex_chars() {
        let token = generate_token().unwrap();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn test_generate_token_is_unique() {
        let tokens: std::collections::HashSet<String> =
            (0..100).map(|_| generate_token().unwrap()).collect();
        assert_eq!(tokens.len(), 100, "tokens must not collide");
    }
}
