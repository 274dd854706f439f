//! Code generation: RFC 4226 (HOTP) and its time-based form, RFC 6238 (TOTP).
//!
//! A TOTP code is just an HOTP code whose counter is "how many time steps
//! have elapsed since the Unix epoch". So the whole algorithm lives in
//! [`hotp`]; [`generate`] and [`time_step_index`] only give it TOTP names.

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::{MAX_DIGITS, Secret};

type HmacSha1 = Hmac<Sha1>;

/// Converts a Unix timestamp to a time-step index (`floor(unix / step)`).
///
/// A `step_secs` of zero is treated as one second rather than dividing by
/// zero; configuration validation never lets zero through anyway.
pub fn time_step_index(unix_secs: u64, step_secs: u64) -> u64 {
    unix_secs / step_secs.max(1)
}

/// Generates the code for a given time-step index.
///
/// Pure and deterministic: the same `(secret, time_step, digits)` triple
/// always yields the same string of exactly `digits` ASCII digits.
pub fn generate(secret: &Secret, time_step: u64, digits: u32) -> String {
    hotp(secret, time_step, digits)
}

/// RFC 4226 HOTP.
///
/// 1. `HMAC-SHA1(secret, counter as 8 big-endian bytes)` → 20-byte hash
/// 2. Dynamic truncation: the low nibble of the last byte picks an offset
///    `o` in `0..=15`; bytes `o..o+4` are read big-endian and the top bit
///    is cleared, giving a 31-bit unsigned value
/// 3. `value mod 10^digits`, left-padded with zeros
///
/// `digits` is clamped to `1..=MAX_DIGITS`.
pub fn hotp(secret: &Secret, counter: u64, digits: u32) -> String {
    let digits = digits.clamp(1, MAX_DIGITS);

    // HMAC is defined for keys of any length, so this cannot fail.
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(&counter.to_be_bytes());
    let hash = mac.finalize().into_bytes();

    let offset = (hash[hash.len() - 1] & 0x0f) as usize;
    let truncated = u32::from_be_bytes([
        hash[offset],
        hash[offset + 1],
        hash[offset + 2],
        hash[offset + 3],
    ]) & 0x7fff_ffff;

    let code = u64::from(truncated) % 10u64.pow(digits);
    format!("{code:0width$}", width = digits as usize)
}
