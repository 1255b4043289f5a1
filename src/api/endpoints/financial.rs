//! Financial report and manual transaction endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{period_or_month, require_patient, ReportQuery};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::report::{
    create_transaction, delete_transaction, expenses_by_category, financial_summary,
    update_transaction, CategoryTotal, FinancialSummary, NewTransactionEntry, TransactionPatch,
    TransactionRecord,
};

/// `GET /api/financial/summary` — expense totals for a period.
pub async fn summary(
    State(ctx): State<ApiContext>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<FinancialSummary>, ApiError> {
    let conn = ctx.lock_db()?;
    let patient_id = require_patient(&conn, query.patient_id)?;
    let period = period_or_month(query.period.as_deref());

    let summary = financial_summary(&conn, patient_id, period, Local::now().naive_local())?;
    Ok(Json(summary))
}

/// `GET /api/financial/expenses/categories` — the per-category list alone.
pub async fn categories(
    State(ctx): State<ApiContext>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<CategoryTotal>>, ApiError> {
    let conn = ctx.lock_db()?;
    let patient_id = require_patient(&conn, query.patient_id)?;
    let period = period_or_month(query.period.as_deref());

    let totals = expenses_by_category(&conn, patient_id, period, Local::now().naive_local())?;
    Ok(Json(totals))
}

#[derive(Deserialize)]
pub struct CreateTransactionRequest {
    pub patient_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<TransactionRecord>,
}

/// `POST /api/financial/transactions` — register a manual expense.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let patient_id = required(request.patient_id, "patient_id")?;
    let kind = required(request.kind, "type")?;
    let category = required(request.category, "category")?;
    let amount = required(request.amount, "amount")?;
    let date = required(request.date, "date")?;
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest("date must be YYYY-MM-DD".into()))?;

    let mut conn = ctx.lock_db()?;
    let record = create_transaction(
        &mut conn,
        &NewTransactionEntry {
            patient_id,
            kind: &kind,
            category: &category,
            amount,
            date,
        },
    )?;

    Ok(Json(TransactionResponse {
        success: true,
        message: "Transaction registered",
        transaction: Some(record),
    }))
}

#[derive(Deserialize)]
pub struct UpdateTransactionRequest {
    pub description: Option<String>,
    pub amount: Option<f64>,
}

/// `PUT /api/financial/transactions/:id` — patch amount and/or description.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    if request.description.is_none() && request.amount.is_none() {
        return Err(ApiError::BadRequest(
            "Provide description and/or amount to update".into(),
        ));
    }

    let mut conn = ctx.lock_db()?;
    let record = update_transaction(
        &mut conn,
        id,
        &TransactionPatch {
            description: request.description.as_deref(),
            amount: request.amount,
        },
    )?;

    Ok(Json(TransactionResponse {
        success: true,
        message: "Transaction updated",
        transaction: Some(record),
    }))
}

/// `DELETE /api/financial/transactions/:id`.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let mut conn = ctx.lock_db()?;
    delete_transaction(&mut conn, id)?;

    Ok(Json(TransactionResponse {
        success: true,
        message: "Transaction deleted",
        transaction: None,
    }))
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("Missing required field: {field}")))
}
