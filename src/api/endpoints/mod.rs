pub mod financial;
pub mod health;
pub mod patients;
pub mod webhook;

use axum::Json;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::db::repository::patient_exists;
use crate::report::Period;

/// Query parameters shared by the report endpoints.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub patient_id: Option<i64>,
    pub period: Option<String>,
    pub category: Option<String>,
}

/// Validate `patient_id`: present (400) and known (404).
pub(crate) fn require_patient(
    conn: &Connection,
    patient_id: Option<i64>,
) -> Result<i64, ApiError> {
    let id = patient_id.ok_or_else(|| ApiError::BadRequest("patient_id is required".into()))?;
    if !patient_exists(conn, id)? {
        return Err(ApiError::NotFound("Patient not found".into()));
    }
    Ok(id)
}

/// Summary endpoints default unknown periods to the monthly window.
pub(crate) fn period_or_month(period: Option<&str>) -> Period {
    period
        .and_then(|p| p.parse().ok())
        .unwrap_or(Period::Month)
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// `GET /api/status` — liveness probe.
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        message: "Serena API is running",
    })
}
