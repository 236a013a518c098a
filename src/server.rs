//! HTTP endpoint exposing the business date computation.
//!
//! MIT License
//!
//! Copyright (c) 2026 66f94eae
//!
//! Permission is hereby granted, free of charge, to any person obtaining a copy
//! of this software and associated documentation files (the "Software"), to deal
//! in the Software without restriction, including without limitation the rights
//! to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//! copies of the Software, and to permit persons to whom the Software is
//! furnished to do so, subject to the following conditions:
//!
//! The above copyright notice and this permission notice shall be included in all
//! copies or substantial portions of the Software.
//!
//! THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//! IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//! FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//! AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//! LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//! OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
//! SOFTWARE.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::{
    error::CalendarError,
    service::{format_instant, BusinessDateService, ComputeRequest},
};

/// Shared request state
pub struct AppState {
    /// `None` while holiday data is unavailable
    service: Option<BusinessDateService>,
    /// Why the service is missing, reported with 503 responses
    unavailable_reason: String,
}

impl AppState {
    pub fn ready(service: BusinessDateService) -> Self {
        Self {
            service: Some(service),
            unavailable_reason: String::new(),
        }
    }

    /// State answering every computation with 503
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            service: None,
            unavailable_reason: reason.into(),
        }
    }
}

/// Raw query string; counts stay strings so malformed numbers get our own 400 body
#[derive(Debug, Deserialize)]
pub struct ComputeQuery {
    days: Option<String>,
    hours: Option<String>,
    date: Option<String>,
}

impl ComputeQuery {
    fn into_request(self) -> Result<ComputeRequest, CalendarError> {
        Ok(ComputeRequest {
            days: parse_count("days", self.days.as_deref())?,
            hours: parse_count("hours", self.hours.as_deref())?,
            date: self.date,
        })
    }
}

/// Accepts ASCII digit strings only
fn parse_count(name: &str, value: Option<&str>) -> Result<Option<u32>, CalendarError> {
    let Some(value) = value else {
        return Ok(None);
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CalendarError::InvalidParameters(format!(
            "{} must be a non-negative integer, got '{}'",
            name, value
        )));
    }
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| CalendarError::InvalidParameters(format!("{} is too large", name)))
}

#[derive(Debug, Serialize)]
pub struct ComputeResponse {
    date: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    holidays: Option<usize>,
}

/// Error response with its HTTP status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl From<CalendarError> for ApiError {
    fn from(err: CalendarError) -> Self {
        let (status, kind) = match &err {
            CalendarError::InvalidInstant(_) | CalendarError::InvalidParameters(_) => {
                (StatusCode::BAD_REQUEST, "InvalidParameters")
            },
            CalendarError::HolidayDataUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UpstreamUnavailable")
            },
            _ => {
                error!(error = %err, "business date computation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalError")
            },
        };
        Self {
            status,
            body: ErrorResponse {
                error: kind,
                message: err.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// `GET /?days=N&hours=N&date=ISO`
pub async fn compute(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ComputeQuery>, QueryRejection>,
) -> Result<Json<ComputeResponse>, ApiError> {
    let Query(query) = query.map_err(|e| CalendarError::InvalidParameters(e.body_text()))?;
    let request = query.into_request()?;
    request.validate()?;

    let Some(service) = state.service.clone() else {
        return Err(CalendarError::HolidayDataUnavailable(state.unavailable_reason.clone()).into());
    };
    // Day and segment walks are CPU-bound, keep them off the async workers
    let result = tokio::task::spawn_blocking(move || service.execute(&request))
        .await
        .map_err(|e| CalendarError::Aborted(e.to_string()))??;
    Ok(Json(ComputeResponse {
        date: format_instant(result),
    }))
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let holidays = state.service.as_ref().map(|s| s.calendar().holidays().len());
    Json(HealthResponse {
        status: if holidays.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        holidays,
    })
}

/// Create the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(compute))
        .route("/health", get(health))
        .with_state(state)
}

/// Binds `host:port` and serves until Ctrl-C
pub async fn serve(host: &str, port: u16, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
