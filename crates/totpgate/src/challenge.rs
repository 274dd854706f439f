//! The challenge page: a small self-contained HTML form asking for a code.
//!
//! Rendered with `format!` rather than a template engine. Every piece of
//! text that comes from configuration or from the request (the form action
//! is the request URI) goes through [`html_escape`] first.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use totpgate_otp::TotpParams;

use crate::config::PageText;

/// Why the challenge page is being shown.
///
/// Each reason maps to one user-facing message. `None` (a plain first
/// visit) shows the form without an error box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeReason {
    /// The form was submitted with an empty `totp_code`.
    Blank,
    /// The code did not match any accepted time step.
    InvalidCode,
    /// The POST body could not be parsed as a form.
    BadRequest,
    /// The code was right but no session could be created.
    Internal,
}

impl ChallengeReason {
    /// The message shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            Self::Blank => "Please enter a TOTP code",
            Self::InvalidCode => "Invalid TOTP code. Please try again.",
            Self::BadRequest => "Invalid request",
            Self::Internal => "Authentication failed. Please try again.",
        }
    }
}

/// Builds the 401 challenge response.
///
/// `action` is the path-and-query the form posts back to, so a successful
/// submission lands the user where they were going.
pub fn challenge(
    page: &PageText,
    totp: &TotpParams,
    action: &str,
    reason: Option<ChallengeReason>,
) -> Response {
    let body = render_page(page, totp, action, reason.map(ChallengeReason::message));
    (StatusCode::UNAUTHORIZED, Html(body)).into_response()
}

/// Renders the challenge page HTML.
pub fn render_page(page: &PageText, totp: &TotpParams, action: &str, error: Option<&str>) -> String {
    let title = html_escape(&page.title);
    let description = html_escape(&page.description);
    let action = html_escape(action);
    let error = error
        .map(|msg| format!(r#"<div class="error">{}</div>"#, html_escape(msg)))
        .unwrap_or_default();
    let digits = totp.digits;
    let step = totp.time_step;
    let placeholder = "0".repeat(digits as usize);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
               background: #f4f5f7; display: flex; align-items: center;
               justify-content: center; min-height: 100vh; margin: 0; }}
        .container {{ background: #fff; border-radius: 12px; padding: 40px;
                     box-shadow: 0 10px 30px rgba(0,0,0,0.1); max-width: 400px; width: 100%; }}
        h1 {{ font-size: 22px; margin: 0 0 8px; text-align: center; }}
        .description {{ color: #666; text-align: center; margin-bottom: 24px; }}
        .error {{ background: #fee; color: #c33; padding: 12px; border-radius: 6px;
                 margin-bottom: 16px; text-align: center; }}
        label {{ display: block; margin-bottom: 8px; font-weight: 500; }}
        input[type="text"] {{ width: 100%; box-sizing: border-box; padding: 12px;
                             font-size: 24px; letter-spacing: 8px; text-align: center;
                             border: 2px solid #ddd; border-radius: 6px; }}
        button {{ width: 100%; margin-top: 16px; padding: 12px; font-size: 16px;
                 background: #4f46e5; color: #fff; border: 0; border-radius: 6px; cursor: pointer; }}
        .info-text {{ color: #888; font-size: 13px; text-align: center; margin-top: 20px; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        <p class="description">{description}</p>
        {error}
        <form method="POST" action="{action}">
            <label for="totp_code">Authentication Code</label>
            <input type="text" id="totp_code" name="totp_code" maxlength="{digits}"
                   pattern="[0-9]*" inputmode="numeric" placeholder="{placeholder}"
                   autocomplete="one-time-code" autofocus required>
            <button type="submit">Verify &amp; Continue</button>
        </form>
        <div class="info-text">
            Enter the {digits}-digit code from your authenticator app.<br>
            Codes refresh every {step} seconds.
        </div>
    </div>
    <script>
        document.getElementById('totp_code').addEventListener('input', function () {{
            this.value = this.value.replace(/[^0-9]/g, '');
            if (this.value.length === {digits}) {{
                this.form.submit();
            }}
        }});
    </script>
</body>
</html>"#
    )
}

/// Escapes the five HTML-significant characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
