//! Request dispatch.
//!
//! # Per-request flow
//! ```text
//! sticky + valid cookie for an alive backend → affinity hit
//! otherwise → pool.select() via strategy (+ fresh cookie when sticky)
//!     → selection failed → 503, stop
//!     → count in-flight request → forward
//!         → ok: stream backend response back (count released after body)
//!         → err: demote backend immediately → 502
//! ```

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Instant;

use crate::health::passive;
use crate::http::forward::set_forwarded_host;
use crate::http::request::request_id;
use crate::http::response::DispatchError;
use crate::http::server::AppState;
use crate::load_balancer::{backend::Backend, error::LbResult};
use crate::observability::metrics;
use crate::session::{self, affinity_cookie, affinity_token};

/// A backend chosen for one request.
struct Choice {
    backend: Arc<Backend>,
    /// Bind the client to `backend` with a fresh affinity cookie.
    issue_cookie: bool,
}

fn choose_backend(state: &AppState, headers: &HeaderMap) -> LbResult<Choice> {
    if state.sticky {
        if let Some(backend) = session::affine_backend(&state.pool, headers) {
            tracing::debug!(backend = %backend.url(), "Sticky session, routing to bound backend");
            metrics::record_affinity_hit();
            return Ok(Choice {
                backend,
                issue_cookie: false,
            });
        }
    }

    Ok(Choice {
        backend: state.pool.select()?,
        issue_cookie: state.sticky,
    })
}

/// Main proxy handler.
/// Selects a backend, forwards the request, and demotes the backend on failure.
pub async fn dispatch(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().to_string();

    let Choice {
        backend,
        issue_cookie,
    } = match choose_backend(&state, request.headers()) {
        Ok(choice) => choice,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "No backend available");
            let response = DispatchError::from(e).into_response();
            metrics::record_request(&method, response.status().as_u16(), "none", start);
            return response;
        }
    };

    let guard = backend.track_connection();
    set_forwarded_host(&mut request);
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %request.uri().path(),
        backend = %backend.url(),
        "Forwarding request"
    );

    let mut response = match state.forwarder.forward(backend.url(), request).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            // The request stays counted until the body is fully streamed or
            // the client goes away and the body is dropped.
            let body = body.map_frame(move |frame| {
                let _held = &guard;
                frame
            });
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, backend = %backend.url(), error = %e, "Upstream error");
            passive::demote(&state.pool, &backend, &e);
            DispatchError::from(e).into_response()
        }
    };

    if issue_cookie {
        let token = affinity_token(backend.url());
        if let Some(cookie) = affinity_cookie(&token, state.cookie_max_age_secs) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
    }

    metrics::record_request(&method, response.status().as_u16(), backend.url().as_str(), start);
    response
}
