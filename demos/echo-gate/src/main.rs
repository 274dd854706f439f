//! echo-gate: echoes every request back, but only after a TOTP login.
//!
//! ```text
//! echo-gate secret --issuer Acme --account ops      # new secret + otpauth URI
//! echo-gate serve --secret JBSWY3DPEHPK3PXP         # listen on 127.0.0.1:8080
//! echo-gate serve --config gate.json -vv            # JSON GateConfig, debug logs
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;

use axum::http::{Method, Uri};
use axum::Router;
use clap::{Arg, ArgAction, ArgMatches, Command};
use qrcode::QrCode;
use qrcode::render::unicode::Dense1x2;
use totpgate::prelude::*;
use totpgate::totpgate_otp::{OtpError, provisioning_uri};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("cannot read config {path}: {source}")]
    ReadConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    ParseConfig {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Secret(#[from] OtpError),

    #[error("cannot render QR code: {0}")]
    QrCode(#[from] qrcode::types::QrError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

fn cli() -> Command {
    Command::new("echo-gate")
        .about("Echo server behind a TOTP gate")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("More logging (-v debug, -vv trace); RUST_LOG wins if set")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the echo handler behind the gate")
                .arg(
                    Arg::new("listen")
                        .short('l')
                        .long("listen")
                        .help("Address to listen on")
                        .default_value("127.0.0.1:8080")
                        .env("ECHO_GATE_LISTEN")
                        .value_parser(clap::value_parser!(SocketAddr)),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to a JSON gate config (camelCase keys)")
                        .env("ECHO_GATE_CONFIG"),
                )
                .arg(
                    Arg::new("secret")
                        .short('s')
                        .long("secret")
                        .help("Base32 TOTP secret, overrides secretKey from the config")
                        .env("ECHO_GATE_SECRET"),
                ),
        )
        .subcommand(
            Command::new("secret")
                .about("Generate (or check) a secret and print its provisioning URI")
                .arg(
                    Arg::new("secret")
                        .short('s')
                        .long("secret")
                        .help("Existing base32 secret to check instead of generating one")
                        .env("ECHO_GATE_SECRET"),
                )
                .arg(
                    Arg::new("issuer")
                        .long("issuer")
                        .help("Issuer shown in the authenticator app")
                        .default_value("MyService"),
                )
                .arg(
                    Arg::new("account")
                        .long("account")
                        .help("Account name shown in the authenticator app")
                        .default_value("user@example.com"),
                )
                .arg(
                    Arg::new("digits")
                        .long("digits")
                        .help("Code length")
                        .default_value("6")
                        .value_parser(clap::value_parser!(u32).range(1..=10)),
                )
                .arg(
                    Arg::new("period")
                        .long("period")
                        .help("Seconds per code")
                        .default_value("30")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                ),
        )
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Reads the gate config from `path` (if any), then applies `secret`.
fn load_config(path: Option<&str>, secret: Option<&str>) -> Result<GateConfig, DemoError> {
    let mut config = match path {
        Some(path) => read_config(Path::new(path))?,
        None => GateConfig::default(),
    };
    if let Some(secret) = secret {
        config.secret_key = secret.to_string();
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<GateConfig, DemoError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| DemoError::ReadConfig {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| DemoError::ParseConfig {
        path: display,
        source,
    })
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn echo(method: Method, uri: Uri) -> String {
    format!("{method} {uri}\n")
}

fn app(gate: &TotpGate) -> Router {
    Router::new().fallback(echo).layer(gate.layer())
}

async fn serve(matches: &ArgMatches) -> Result<(), DemoError> {
    let config = load_config(
        matches.get_one::<String>("config").map(String::as_str),
        matches.get_one::<String>("secret").map(String::as_str),
    )?;
    let gate = TotpGate::builder(config).name("echo-gate").build()?;

    let listen = matches
        .get_one::<SocketAddr>("listen")
        .copied()
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!(addr = %listener.local_addr()?, "echo-gate listening");

    axum::serve(
        listener,
        app(&gate).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
    })
    .await?;

    gate.shutdown();
    Ok(())
}

fn secret(matches: &ArgMatches) -> Result<(), DemoError> {
    let secret = match matches.get_one::<String>("secret") {
        Some(encoded) => Secret::from_base32(encoded)?,
        None => Secret::generate()?,
    };
    let params = TotpParams {
        digits: matches.get_one::<u32>("digits").copied().unwrap_or(6),
        time_step: matches.get_one::<u64>("period").copied().unwrap_or(30),
        ..TotpParams::default()
    };
    let issuer = matches.get_one::<String>("issuer").map_or("MyService", String::as_str);
    let account = matches
        .get_one::<String>("account")
        .map_or("user@example.com", String::as_str);

    print!("{}", enrollment_text(&secret, issuer, account, &params)?);
    Ok(())
}

/// Everything needed to enroll `secret`: a terminal QR code for scanning,
/// the details for manual entry, and the `secretKey` line for the config.
fn enrollment_text(
    secret: &Secret,
    issuer: &str,
    account: &str,
    params: &TotpParams,
) -> Result<String, DemoError> {
    let uri = provisioning_uri(secret, issuer, account, params);
    let qr = QrCode::new(uri.as_bytes())?
        .render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .build();
    let key = secret.to_base32();

    Ok(format!(
        "Scan with your authenticator app:\n\n{qr}\n\n\
         Or enter manually:\n  \
         Account: {account}\n  \
         Issuer:  {issuer}\n  \
         Key:     {key}\n  \
         Type:    time-based (TOTP, SHA1)\n  \
         Digits:  {digits}\n  \
         Period:  {period} seconds\n\n\
         uri: {uri}\n\n\
         Gate config:\n  \"secretKey\": \"{key}\"\n",
        digits = params.digits,
        period = params.time_step,
    ))
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    let result = match matches.subcommand() {
        Some(("serve", sub)) => serve(sub).await,
        Some(("secret", sub)) => secret(sub),
        _ => unreachable!("subcommand_required is set"),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "echo-gate failed");
            ExitCode::FAILURE
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_cli_serve_defaults() {
        let matches = cli().try_get_matches_from(["echo-gate", "serve"]).unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "serve");
        assert_eq!(
            sub.get_one::<SocketAddr>("listen").copied(),
            Some(SocketAddr::from(([127, 0, 0, 1], 8080)))
        );
    }

    #[test]
    fn test_cli_counts_verbosity() {
        let matches = cli()
            .try_get_matches_from(["echo-gate", "secret", "-vv"])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);
    }

    #[test]
    fn test_cli_rejects_too_many_digits() {
        let result = cli().try_get_matches_from(["echo-gate", "secret", "--digits", "11"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_secret_override() {
        let config = load_config(None, Some("JBSWY3DPEHPK3PXP")).unwrap();
        assert_eq!(config.secret_key, "JBSWY3DPEHPK3PXP");
        assert_eq!(config.cookie_name, "totp_session");
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("echo-gate-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"secretKey": "AAAA", "cookieName": "gate"}"#).unwrap();

        let config = load_config(path.to_str(), Some("JBSWY3DPEHPK3PXP")).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.secret_key, "JBSWY3DPEHPK3PXP");
        assert_eq!(config.cookie_name, "gate");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Some("/definitely/not/here.json"), None);
        assert!(matches!(result, Err(DemoError::ReadConfig { .. })));
    }

    #[test]
    fn test_enrollment_text_has_qr_and_manual_details() {
        let secret = Secret::from_base32("JBSWY3DPEHPK3PXP").unwrap();
        let params = TotpParams {
            digits: 8,
            time_step: 60,
            ..TotpParams::default()
        };

        let text = enrollment_text(&secret, "Acme", "ops@example.com", &params).unwrap();

        assert!(text.contains("Key:     JBSWY3DPEHPK3PXP"));
        assert!(text.contains("Digits:  8"));
        assert!(text.contains("Period:  60 seconds"));
        assert!(text.contains("uri: otpauth://totp/Acme:ops%40example.com?"));
        assert!(text.contains(r#""secretKey": "JBSWY3DPEHPK3PXP""#));
        // Dense1x2 draws with half-block characters.
        assert!(text.contains('\u{2580}') || text.contains('\u{2584}') || text.contains('\u{2588}'));
    }

    #[tokio::test]
    async fn test_app_challenges_anonymous_request() {
        let gate = TotpGate::new(GateConfig::with_secret("JBSWY3DPEHPK3PXP")).unwrap();
        let request = Request::builder().uri("/hello").body(Body::empty()).unwrap();

        let response = app(&gate).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
