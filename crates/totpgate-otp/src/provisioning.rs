//! `otpauth://` provisioning URIs.
//!
//! This is the string behind the QR code an authenticator app scans during
//! enrollment (Key Uri Format, as popularized by Google Authenticator):
//!
//! ```text
//! otpauth://totp/{issuer}:{account}?secret={B32}&issuer={issuer}&digits=6&period=30
//! ```

use crate::{Secret, TotpParams};

/// Builds the provisioning URI for `secret`.
///
/// Issuer and account are percent-encoded (everything outside the RFC 3986
/// unreserved set), so spaces become `%20` and `@` becomes `%40`.
pub fn provisioning_uri(
    secret: &Secret,
    issuer: &str,
    account: &str,
    params: &TotpParams,
) -> String {
    let issuer = urlencoding::encode(issuer);
    let account = urlencoding::encode(account);
    format!(
        "otpauth://totp/{issuer}:{account}?secret={}&issuer={issuer}&algorithm=SHA1&digits={}&period={}",
        secret.to_base32(),
        params.digits,
        params.time_step,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisioning_uri_default_params() {
        let secret = Secret::from_base32("JBSWY3DPEHPK3PXP").unwrap();
        let uri = provisioning_uri(&secret, "MyService", "user", &TotpParams::default());
        assert_eq!(
            uri,
            "otpauth://totp/MyService:user?secret=JBSWY3DPEHPK3PXP&issuer=MyService&algorithm=SHA1&digits=6&period=30"
        );
    }

    #[test]
    fn test_provisioning_uri_encodes_label() {
        let secret = Secret::from_base32("JBSWY3DPEHPK3PXP").unwrap();
        let params = TotpParams {
            time_step: 60,
            digits: 8,
            allowed_skew: 1,
        };
        let uri = provisioning_uri(&secret, "Company Portal", "admin@example.com", &params);
        assert!(uri.starts_with("otpauth://totp/Company%20Portal:admin%40example.com?"));
        assert!(uri.contains("&issuer=Company%20Portal&"));
        assert!(uri.ends_with("&digits=8&period=60"));
    }

    #[test]
    fn test_provisioning_uri_keeps_unreserved_and_escapes_separators() {
        let secret = Secret::from_base32("JBSWY3DPEHPK3PXP").unwrap();
        let uri = provisioning_uri(&secret, "a-b.c_d~e", "a:b/c", &TotpParams::default());
        assert!(uri.starts_with("otpauth://totp/a-b.c_d~e:a%3Ab%2Fc?"));
    }
}
