//! Reading and writing the session cookie.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};

use crate::config::CookieSettings;

/// Returns the value of the first cookie named `name`, if any.
///
/// Looks through every `Cookie` header; HTTP/2 clients may split cookies
/// across several. Headers that are not valid visible ASCII are skipped.
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

/// Renders the `Set-Cookie` value for a freshly issued session token.
///
/// ```text
/// totp_session=<token>; Path=/; Domain=example.com; Max-Age=3600; HttpOnly; Secure; SameSite=Lax
/// ```
///
/// `Domain` and `Secure` are only present when configured. Returns `None`
/// if the name or domain contains bytes a header value cannot carry, which
/// validated settings plus a hex token never produce.
pub fn session_cookie(settings: &CookieSettings, token: &str) -> Option<HeaderValue> {
    let mut cookie = format!("{}={}; Path=/", settings.name, token);
    if let Some(domain) = &settings.domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    cookie.push_str(&format!("; Max-Age={}; HttpOnly", settings.max_age.as_secs()));
    if settings.secure {
        cookie.push_str("; Secure");
    }
    cookie.push_str("; SameSite=Lax");

    HeaderValue::from_str(&cookie).ok()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn settings(domain: Option<&str>, secure: bool) -> CookieSettings {
        CookieSettings {
            name: "totp_session".to_string(),
            domain: domain.map(str::to_string),
            secure,
            max_age: Duration::from_secs(3600),
        }
    }

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for cookie in cookies {
            map.append(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        map
    }

    // =====================================================================
    // find_cookie()
    // =====================================================================

    #[test]
    fn test_find_cookie_among_others() {
        let map = headers(&["theme=dark; totp_session=abc123; lang=en"]);
        assert_eq!(find_cookie(&map, "totp_session"), Some("abc123"));
    }

    #[test]
    fn test_find_cookie_across_multiple_headers() {
        let map = headers(&["theme=dark", "totp_session=abc123"]);
        assert_eq!(find_cookie(&map, "totp_session"), Some("abc123"));
    }

    #[test]
    fn test_find_cookie_missing_returns_none() {
        let map = headers(&["theme=dark"]);
        assert_eq!(find_cookie(&map, "totp_session"), None);
        assert_eq!(find_cookie(&HeaderMap::new(), "totp_session"), None);
    }

    #[test]
    fn test_find_cookie_requires_exact_name() {
        let map = headers(&["xtotp_session=nope; totp_session_old=nope"]);
        assert_eq!(find_cookie(&map, "totp_session"), None);
    }

    #[test]
    fn test_find_cookie_empty_value() {
        let map = headers(&["totp_session="]);
        assert_eq!(find_cookie(&map, "totp_session"), Some(""));
    }

    // =====================================================================
    // session_cookie()
    // =====================================================================

    #[test]
    fn test_session_cookie_all_attributes() {
        let value = session_cookie(&settings(Some("example.com"), true), "tok").unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "totp_session=tok; Path=/; Domain=example.com; Max-Age=3600; HttpOnly; Secure; SameSite=Lax"
        );
    }

    #[test]
    fn test_session_cookie_without_domain_or_secure() {
        let value = session_cookie(&settings(None, false), "tok").unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "totp_session=tok; Path=/; Max-Age=3600; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn test_session_cookie_rejects_control_characters() {
        let mut bad = settings(None, true);
        bad.name = "bad\nname".to_string();
        assert!(session_cookie(&bad, "tok").is_none());
    }
}
