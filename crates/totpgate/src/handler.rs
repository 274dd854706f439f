//! Per-request handler: session check, code submission, challenge.
//!
//! Every request that reaches the gate runs through [`TotpGate::authorize`].
//! Nothing about a request is remembered between calls; the state is
//! derived each time from the session store and the shape of the request.
//! The flow is:
//!   1. Session cookie → store lookup → expiry → identity binding
//!   2. POST → parse form → verify code → create session → 303
//!   3. Anything else → 401 challenge page

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, FromRequest, OriginalUri, Request};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use totpgate_identity::{X_FORWARDED_FOR, X_REAL_IP, resolve};

use crate::challenge::{ChallengeReason, challenge};
use crate::cookie::{find_cookie, session_cookie};
use crate::gate::TotpGate;

/// What the gate decided for one request.
#[derive(Debug)]
pub enum Outcome {
    /// Authenticated: hand the request (unchanged) to the wrapped service.
    Allow(Request<Body>),
    /// Answer directly: a challenge page or the post-login redirect.
    Respond(Response),
}

/// Result of looking at the request's session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCheck {
    /// No cookie, or no session for its token.
    Missing,
    /// The session existed but had expired. It has been removed.
    Expired,
    /// The session belongs to a different client identity. It has been
    /// removed.
    IdentityMismatch { expected: String, actual: String },
    /// A live session for this client.
    Valid,
}

/// The submitted login form.
#[derive(Debug, Deserialize)]
struct CodeSubmission {
    #[serde(default)]
    totp_code: String,
}

impl TotpGate {
    /// Decides what to do with one request.
    ///
    /// Never fails: the worst case for any request is a re-challenge.
    pub async fn authorize(&self, req: Request<Body>) -> Outcome {
        let identity = self.client_identity(&req);

        if self.check_session(req.headers(), &identity) == SessionCheck::Valid {
            return Outcome::Allow(req);
        }

        let action = return_path(&req);
        let response = if req.method() == Method::POST {
            self.handle_submission(req, &identity, &action).await
        } else {
            self.challenge(&action, None)
        };
        Outcome::Respond(response)
    }

    /// Resolves who is on the other end of `req`.
    ///
    /// Uses the `ConnectInfo<SocketAddr>` extension for the peer address;
    /// without it the raw address is empty, and the forwarding headers are
    /// never trusted.
    pub fn client_identity(&self, req: &Request<Body>) -> String {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_default();
        let headers = req.headers();
        let forwarded_for = headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok());
        let real_ip = headers.get(X_REAL_IP).and_then(|v| v.to_str().ok());

        resolve(&peer, forwarded_for, real_ip, &self.state.config.trusted_proxies)
    }

    /// Checks the session cookie in `headers` against the store.
    ///
    /// Expired and mismatched sessions are deleted on the spot.
    pub fn check_session(&self, headers: &HeaderMap, identity: &str) -> SessionCheck {
        let state = &self.state;
        let Some(token) = find_cookie(headers, &state.config.cookie.name) else {
            return SessionCheck::Missing;
        };
        let Some(session) = state.sessions.get(token) else {
            return SessionCheck::Missing;
        };

        if session.is_expired(state.clock.now()) {
            state.sessions.delete(token);
            tracing::debug!(gate = %state.name, identity = %session.bound_identity, "session expired");
            return SessionCheck::Expired;
        }

        if state.config.validate_ip && session.bound_identity != identity {
            state.sessions.delete(token);
            tracing::warn!(
                gate = %state.name,
                expected = %session.bound_identity,
                actual = %identity,
                "session identity mismatch"
            );
            return SessionCheck::IdentityMismatch {
                expected: session.bound_identity,
                actual: identity.to_string(),
            };
        }

        SessionCheck::Valid
    }

    async fn handle_submission(&self, req: Request<Body>, identity: &str, action: &str) -> Response {
        let state = &self.state;

        let Form(submission) = match Form::<CodeSubmission>::from_request(req, &()).await {
            Ok(form) => form,
            Err(rejection) => {
                tracing::debug!(gate = %state.name, error = %rejection, "unreadable code submission");
                return self.challenge(action, Some(ChallengeReason::BadRequest));
            }
        };

        let code = submission.totp_code.trim();
        if code.is_empty() {
            return self.challenge(action, Some(ChallengeReason::Blank));
        }

        if !state.config.totp.verify(&state.config.secret, code, state.clock.unix_secs()) {
            tracing::warn!(gate = %state.name, %identity, "invalid TOTP code attempt");
            return self.challenge(action, Some(ChallengeReason::InvalidCode));
        }

        let session = match state
            .sessions
            .create(state.clock.now(), state.config.session.ttl, identity)
        {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(gate = %state.name, error = %e, "failed to create session");
                return self.challenge(action, Some(ChallengeReason::Internal));
            }
        };

        let Some(cookie) = session_cookie(&state.config.cookie, &session.token) else {
            state.sessions.delete(&session.token);
            tracing::error!(gate = %state.name, "session cookie is not a valid header value");
            return self.challenge(action, Some(ChallengeReason::Internal));
        };

        tracing::info!(gate = %state.name, %identity, "successful TOTP authentication");

        let mut response = Redirect::to(action).into_response();
        response.headers_mut().insert(SET_COOKIE, cookie);
        response
    }

    fn challenge(&self, action: &str, reason: Option<ChallengeReason>) -> Response {
        let config = &self.state.config;
        challenge(&config.page, &config.totp, action, reason)
    }
}

/// The path-and-query the user was trying to reach.
///
/// Inside a nested router `req.uri()` has the mount prefix stripped, so the
/// full URI is taken from axum's `OriginalUri` extension when present.
fn return_path(req: &Request<Body>) -> String {
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map_or(req.uri(), |OriginalUri(uri)| uri);
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}
