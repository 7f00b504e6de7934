use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::admin::AdminState;
use crate::load_balancer::backend::{Backend, BackendStatus, DEFAULT_WEIGHT};
use crate::load_balancer::error::LbError;

#[derive(Serialize)]
pub struct StatusReport {
    pub strategy: &'static str,
    pub sticky: bool,
    pub backends: Vec<BackendStatus>,
}

#[derive(Debug, Deserialize)]
pub struct AddBackend {
    pub url: String,
    pub weight: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveBackend {
    pub url: String,
}

/// Admin request failures.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] JsonRejection),

    #[error(transparent)]
    InvalidAddress(#[from] LbError),

    #[error("Backend already registered: {0}")]
    Duplicate(Url),

    #[error("Backend not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::InvalidJson(_) | AdminError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            AdminError::Duplicate(_) => StatusCode::CONFLICT,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, self.to_string()).into_response()
    }
}

pub async fn get_status(State(state): State<AdminState>) -> Json<StatusReport> {
    Json(StatusReport {
        strategy: state.pool.strategy().name(),
        sticky: state.sticky,
        backends: state.pool.status(),
    })
}

pub async fn add_backend(
    State(state): State<AdminState>,
    payload: Result<Json<AddBackend>, JsonRejection>,
) -> Result<(StatusCode, &'static str), AdminError> {
    let Json(payload) = payload?;
    let backend = Backend::parse(&payload.url, true, payload.weight.unwrap_or(DEFAULT_WEIGHT))?;

    if state.pool.contains(backend.url()) {
        return Err(AdminError::Duplicate(backend.url().clone()));
    }

    state.pool.add_backend(backend);
    Ok((StatusCode::CREATED, "Backend added"))
}

pub async fn remove_backend(
    State(state): State<AdminState>,
    payload: Result<Json<RemoveBackend>, JsonRejection>,
) -> Result<&'static str, AdminError> {
    let Json(payload) = payload?;
    let url = Url::parse(&payload.url).map_err(|_| AdminError::NotFound(payload.url.clone()))?;

    if !state.pool.remove_backend(&url) {
        return Err(AdminError::NotFound(payload.url));
    }
    Ok("Backend removed")
}
