//! Code validation across a clock-skew window.

use subtle::ConstantTimeEq;

use crate::{Secret, generate, time_step_index};

/// Accepts `code` if it matches any time step in
/// `[current - allowed_skew, current + allowed_skew]`, where
/// `current = floor(now_unix / time_step)`.
///
/// `allowed_skew = 0` accepts only the current step. Steps that would fall
/// before the epoch are skipped. Each comparison is constant-time, so a
/// wrong code takes as long to reject as an almost-right one.
pub fn is_valid(
    secret: &Secret,
    code: &str,
    now_unix: u64,
    time_step: u64,
    digits: u32,
    allowed_skew: u32,
) -> bool {
    let current = time_step_index(now_unix, time_step);
    let skew = i128::from(allowed_skew);

    for offset in -skew..=skew {
        let Ok(step) = u64::try_from(i128::from(current) + offset) else {
            continue;
        };
        let expected = generate(secret, step, digits);
        if bool::from(expected.as_bytes().ct_eq(code.as_bytes())) {
            return true;
        }
    }

    false
}

/// The three knobs that define a TOTP deployment.
///
/// Authenticator apps assume the defaults (30 s, 6 digits) unless the
/// provisioning URI says otherwise, so change them only together with a
/// re-enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotpParams {
    /// Seconds per time step.
    pub time_step: u64,
    /// Code length.
    pub digits: u32,
    /// Neighbouring steps accepted on each side of the current one.
    pub allowed_skew: u32,
}

impl Default for TotpParams {
    fn default() -> Self {
        Self {
            time_step: 30,
            digits: 6,
            allowed_skew: 1,
        }
    }
}

impl TotpParams {
    /// The code an authenticator app would display at `now_unix`.
    pub fn code_at(&self, secret: &Secret, now_unix: u64) -> String {
        generate(secret, time_step_index(now_unix, self.time_step), self.digits)
    }

    /// [`is_valid`] with these parameters.
    pub fn verify(&self, secret: &Secret, code: &str, now_unix: u64) -> bool {
        is_valid(
            secret,
            code,
            now_unix,
            self.time_step,
            self.digits,
            self.allowed_skew,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn secret() -> Secret {
        Secret::from_base32("JBSWY3DPEHPK3PXP").unwrap()
    }

    fn code_for_offset(offset: i64) -> String {
        let current = time_step_index(NOW, 30);
        generate(&secret(), current.checked_add_signed(offset).unwrap(), 6)
    }

    #[test]
    fn test_is_valid_current_step_with_zero_skew_accepts() {
        assert!(is_valid(&secret(), &code_for_offset(0), NOW, 30, 6, 0));
    }

    #[test]
    fn test_is_valid_neighbour_step_with_zero_skew_rejects() {
        let code = code_for_offset(1);
        // Guard against the (1 in a million) chance both steps collide.
        if code != code_for_offset(0) {
            assert!(!is_valid(&secret(), &code, NOW, 30, 6, 0));
        }
    }

    #[test]
    fn test_is_valid_within_skew_accepts_both_directions() {
        assert!(is_valid(&secret(), &code_for_offset(-1), NOW, 30, 6, 1));
        assert!(is_valid(&secret(), &code_for_offset(1), NOW, 30, 6, 1));
    }

    #[test]
    fn test_is_valid_two_steps_away_with_skew_one_rejects() {
        let code = code_for_offset(2);
        let window: Vec<String> = (-1..=1).map(code_for_offset).collect();
        if !window.contains(&code) {
            assert!(!is_valid(&secret(), &code, NOW, 30, 6, 1));
        }
    }

    #[test]
    fn test_is_valid_rejects_wrong_length_and_garbage() {
        let code = code_for_offset(0);
        assert!(!is_valid(&secret(), &code[..5], NOW, 30, 6, 1));
        assert!(!is_valid(&secret(), "", NOW, 30, 6, 1));
        assert!(!is_valid(&secret(), "abcdef", NOW, 30, 6, 1));
    }

    #[test]
    fn test_is_valid_near_epoch_skips_negative_steps() {
        // At t = 0 the window [-1, 1] would include step -1; it is skipped.
        let code = generate(&secret(), 0, 6);
        assert!(is_valid(&secret(), &code, 0, 30, 6, 1));
    }

    #[test]
    fn test_totp_params_default() {
        let params = TotpParams::default();
        assert_eq!(params.time_step, 30);
        assert_eq!(params.digits, 6);
        assert_eq!(params.allowed_skew, 1);
    }

    #[test]
    fn test_totp_params_code_at_verifies() {
        let params = TotpParams::default();
        let code = params.code_at(&secret(), NOW);
        assert!(params.verify(&secret(), &code, NOW));
        assert!(params.verify(&secret(), &code, NOW + 30));
    }
}
