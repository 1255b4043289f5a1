//! Read-only patient endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::{get_patient, list_patients};
use crate::models::Patient;

#[derive(Serialize)]
pub struct PatientListItem {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub conditions: Option<String>,
    pub created_at: String,
}

/// `GET /api/patients` — full patient listing.
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<PatientListItem>>, ApiError> {
    let conn = ctx.lock_db()?;
    let patients = list_patients(&conn)?
        .into_iter()
        .map(|p| PatientListItem {
            id: p.id,
            name: p.name,
            age: p.age,
            conditions: p.conditions,
            created_at: p.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        })
        .collect();
    Ok(Json(patients))
}

#[derive(Serialize)]
pub struct PatientName {
    pub id: i64,
    pub name: String,
}

/// `GET /api/patients/list` — id/name pairs for selection widgets.
pub async fn list_names(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<PatientName>>, ApiError> {
    let conn = ctx.lock_db()?;
    let patients = list_patients(&conn)?
        .into_iter()
        .map(|p| PatientName { id: p.id, name: p.name })
        .collect();
    Ok(Json(patients))
}

/// `GET /api/patients/:id` — patient detail.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, ApiError> {
    let conn = ctx.lock_db()?;
    let patient =
        get_patient(&conn, id)?.ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    Ok(Json(patient))
}
