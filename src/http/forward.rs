//! Forwarding requests to a chosen backend.
//!
//! # Responsibilities
//! - Preserve the original host in `X-Forwarded-Host`
//! - Rewrite the request URI onto the backend's base URL
//! - Bound the round trip with a timeout
//! - Stream the backend response back unchanged

use axum::{
    body::Body,
    http::{header, uri::PathAndQuery, HeaderName, HeaderValue, Request, Response, Uri, Version},
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Why a forward did not produce a backend response.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error("could not build upstream request: {0}")]
    Request(#[from] axum::http::Error),
}

pub type ForwardFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Response<Body>, ForwardError>> + Send + 'a>>;

/// Sends a request to a backend and returns its response.
pub trait Forwarder: Send + Sync {
    fn forward<'a>(&'a self, target: &'a Url, request: Request<Body>) -> ForwardFuture<'a>;
}

/// Forwarder backed by hyper's pooled HTTP client.
#[derive(Clone)]
pub struct HyperForwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl HyperForwarder {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, timeout }
    }
}

impl Forwarder for HyperForwarder {
    fn forward<'a>(&'a self, target: &'a Url, request: Request<Body>) -> ForwardFuture<'a> {
        Box::pin(async move {
            let request = prepare_request(target, request)?;
            match tokio::time::timeout(self.timeout, self.client.request(request)).await {
                Ok(Ok(response)) => Ok(into_proxy_response(response)),
                Ok(Err(e)) => Err(ForwardError::Transport(e)),
                Err(_) => Err(ForwardError::Timeout(self.timeout)),
            }
        })
    }
}

/// Re-box the backend's streaming body so the client reads it as it arrives.
fn into_proxy_response(response: Response<Incoming>) -> Response<Body> {
    response.map(Body::new)
}

/// Record the client-facing host in `X-Forwarded-Host` so the backend can
/// still see it once the request is re-addressed.
pub fn set_forwarded_host<B>(request: &mut Request<B>) {
    let original_host = request.headers().get(header::HOST).cloned().or_else(|| {
        request
            .uri()
            .authority()
            .and_then(|a| HeaderValue::from_str(a.as_str()).ok())
    });
    if let Some(host) = original_host {
        request.headers_mut().insert(X_FORWARDED_HOST, host);
    }
}

/// Point `request` at `target`, keeping its path and query.
///
/// The inbound `Host` is dropped so the client addresses the backend.
pub fn prepare_request(target: &Url, request: Request<Body>) -> Result<Request<Body>, ForwardError> {
    let (mut parts, body) = request.into_parts();

    let authority = authority_of(target);
    let path_and_query = join_path(target, parts.uri.path_and_query());
    parts.uri = Uri::builder()
        .scheme(target.scheme())
        .authority(authority.as_str())
        .path_and_query(path_and_query.as_str())
        .build()?;
    // The client speaks HTTP/1.1 to backends whatever the inbound version was.
    parts.version = Version::HTTP_11;
    parts.headers.remove(header::HOST);

    Ok(Request::from_parts(parts, body))
}

fn authority_of(target: &Url) -> String {
    let host = target.host_str().unwrap_or_default();
    match target.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

fn join_path(target: &Url, incoming: Option<&PathAndQuery>) -> String {
    let base = target.path().trim_end_matches('/');
    let (path, query) = match incoming {
        Some(pq) => (pq.path(), pq.query()),
        None => ("/", None),
    };
    let path = if path.starts_with('/') { path.to_string() } else { format!("/{}", path) };

    let mut joined = format!("{}{}", base, path);
    if let Some(query) = query {
        joined.push('?');
        joined.push_str(query);
    }
    joined
}
