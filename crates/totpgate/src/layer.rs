//! Tower integration: [`GateLayer`] wraps any service with a [`TotpGate`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::Request;
use axum::response::Response;
use tower::{Layer, Service};

use crate::gate::TotpGate;
use crate::handler::Outcome;

/// Layer that puts a [`TotpGate`] in front of a service.
///
/// Usually obtained from [`TotpGate::layer`].
#[derive(Debug, Clone)]
pub struct GateLayer {
    gate: TotpGate,
}

impl GateLayer {
    /// Creates a layer for `gate`.
    pub fn new(gate: TotpGate) -> Self {
        Self { gate }
    }
}

impl<S> Layer<S> for GateLayer {
    type Service = GateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GateService {
            inner,
            gate: self.gate.clone(),
        }
    }
}

/// Service produced by [`GateLayer`].
///
/// Only requests the gate allows reach `inner`; everything else is
/// answered by the gate itself.
#[derive(Debug, Clone)]
pub struct GateService<S> {
    inner: S,
    gate: TotpGate,
}

impl<S> Service<Request<Body>> for GateService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let gate = self.gate.clone();
        // Take the service that was driven to readiness, leave a fresh clone.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match gate.authorize(request).await {
                Outcome::Allow(request) => inner.call(request).await,
                Outcome::Respond(response) => Ok(response),
            }
        })
    }
}
