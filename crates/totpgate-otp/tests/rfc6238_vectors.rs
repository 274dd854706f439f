//! Golden vectors from RFC 6238, Appendix B (SHA1 column).
//!
//! The RFC uses the ASCII secret "12345678901234567890", a 30-second step
//! and 8-digit codes. The 6-digit code is the last six digits of the
//! 8-digit one, because both are `value mod 10^n` of the same value.

use totpgate_otp::{Secret, TotpParams, generate, is_valid, time_step_index};

const VECTORS: &[(u64, &str)] = &[
    (59, "94287082"),
    (1_111_111_109, "07081804"),
    (1_111_111_111, "14050471"),
    (1_234_567_890, "89005924"),
    (2_000_000_000, "69279037"),
    (20_000_000_000, "65353130"),
];

fn rfc_secret() -> Secret {
    Secret::from_base32("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").expect("valid base32")
}

#[test]
fn test_generate_matches_rfc6238_eight_digits() {
    let secret = rfc_secret();
    for (time, want) in VECTORS {
        let step = time_step_index(*time, 30);
        assert_eq!(generate(&secret, step, 8), *want, "time {time}");
    }
}

#[test]
fn test_generate_matches_rfc6238_six_digit_suffix() {
    let secret = rfc_secret();
    for (time, want) in VECTORS {
        let step = time_step_index(*time, 30);
        assert_eq!(generate(&secret, step, 6), want[2..], "time {time}");
    }
}

#[test]
fn test_time_59_is_step_one() {
    // The reference point used throughout the docs: t = 59 s is step 1.
    assert_eq!(time_step_index(59, 30), 1);
    assert_eq!(generate(&rfc_secret(), 1, 6), "287082");
}

#[test]
fn test_is_valid_accepts_rfc_codes_at_their_time() {
    let secret = rfc_secret();
    let params = TotpParams {
        digits: 8,
        allowed_skew: 0,
        ..TotpParams::default()
    };
    for (time, code) in VECTORS {
        assert!(params.verify(&secret, code, *time), "time {time}");
        assert!(is_valid(&secret, code, *time, 30, 8, 0));
    }
}

#[test]
fn test_is_valid_skew_boundary() {
    let secret = rfc_secret();
    // Code for t = 59 (step 1) submitted at t = 90 (step 3): two steps late.
    assert!(!is_valid(&secret, "287082", 90, 30, 6, 1));
    assert!(is_valid(&secret, "287082", 90, 30, 6, 2));
    // One step late is inside the default window.
    assert!(is_valid(&secret, "287082", 60, 30, 6, 1));
}
