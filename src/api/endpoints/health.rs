//! Health dashboard endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Local;
use serde::Serialize;

use super::{period_or_month, require_patient, ReportQuery};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::report::{
    fetch_history, health_summary, metric_history, CategoryFilter, HealthMetric, HealthSummary,
    HistoryItem, MetricPoint, Period,
};

/// `GET /api/health/summary` — latest vitals and state for a period.
pub async fn summary(
    State(ctx): State<ApiContext>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<HealthSummary>, ApiError> {
    let conn = ctx.lock_db()?;
    let patient_id = require_patient(&conn, query.patient_id)?;
    let period = period_or_month(query.period.as_deref());

    let summary = health_summary(&conn, patient_id, period, Local::now().naive_local())?;
    Ok(Json(summary))
}

/// `GET /api/health/metrics/:metric_type` — time series for charting.
pub async fn metrics(
    State(ctx): State<ApiContext>,
    Path(metric_type): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<MetricPoint>>, ApiError> {
    let metric: HealthMetric = metric_type
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown metric type: {metric_type}")))?;

    let conn = ctx.lock_db()?;
    let patient_id = require_patient(&conn, query.patient_id)?;
    let period = period_or_month(query.period.as_deref());

    let points = metric_history(&conn, patient_id, metric, period, Local::now().naive_local())?;
    Ok(Json(points))
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryItem>,
}

/// `GET /api/health/history` — audit listing, newest first.
///
/// Unlike the summaries, this endpoint rejects unknown period strings and
/// defaults to the daily window.
pub async fn history(
    State(ctx): State<ApiContext>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let period = match query.period.as_deref() {
        None => Period::Day,
        Some(raw) => raw.parse().map_err(|_| {
            ApiError::BadRequest("Invalid period. Use day, week, fortnight or month".into())
        })?,
    };
    let category = match query.category.as_deref() {
        None => None,
        Some(raw) => Some(raw.parse::<CategoryFilter>().map_err(|_| {
            ApiError::BadRequest(
                "Invalid category. Use physical, cognitive, emotional or medication".into(),
            )
        })?),
    };

    let conn = ctx.lock_db()?;
    let patient_id = require_patient(&conn, query.patient_id)?;

    let items = fetch_history(&conn, patient_id, period, category, Local::now().naive_local())?;
    Ok(Json(HistoryResponse { history: items }))
}
