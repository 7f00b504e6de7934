//! Error responses produced by the dispatcher.
//!
//! - No backend could be selected → 503 Service Unavailable
//! - The chosen backend failed the round trip → 502 Bad Gateway
//!
//! Neither is retried against another backend.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::http::forward::ForwardError;
use crate::load_balancer::error::LbError;

/// Terminal per-request failures.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Selection(#[from] LbError),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Selection(_) => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::Forward(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let body = match &self {
            DispatchError::Selection(_) => "Service unavailable",
            DispatchError::Forward(_) => "The server is down",
        };
        (self.status(), body).into_response()
    }
}
