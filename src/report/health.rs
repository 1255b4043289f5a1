//! Health dashboard: latest vitals, sleep, and qualitative states for a
//! patient over a reporting window.
//!
//! Values are free text from the classifier; each dashboard field pairs a
//! keyword scan with one typed extraction rule. A field reports the most
//! recent reading only — once filled, older matches are ignored. When the
//! window holds no usable reading a field stays `null`; nothing is ever
//! fabricated.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use serde::Serialize;

use super::extract;
use super::period::Period;
use super::rating_from_confidence;
use crate::db::repository::DATETIME_FMT;
use crate::db::DatabaseError;
use crate::taxonomy;

/// Qualitative bucket derived from confidence or a measured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Normal,
    Moderate,
    Low,
}

/// Overall dashboard conclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Conclusion {
    Good,
    Fair,
    Poor,
}

/// Confidence ≥ 0.8 reads as a normal observation, ≥ 0.5 moderate.
pub fn status_from_confidence(confidence: f64) -> Status {
    if confidence >= 0.8 {
        Status::Normal
    } else if confidence >= 0.5 {
        Status::Moderate
    } else {
        Status::Low
    }
}

/// Sleep is classified by the measured hours, not by confidence.
pub fn status_from_sleep_hours(hours: f64) -> Status {
    if hours >= 7.0 {
        Status::Normal
    } else if hours >= 5.0 {
        Status::Moderate
    } else {
        Status::Low
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VitalReading {
    pub value: String,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize)]
pub struct SleepReading {
    pub hours: f64,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateReading {
    pub rating: u8,
    pub description: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalVars {
    pub blood_pressure: Option<VitalReading>,
    pub temperature: Option<VitalReading>,
    pub oxygen_saturation: Option<VitalReading>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub physical_vars: PhysicalVars,
    pub sleep: Option<SleepReading>,
    pub cognitive_state: Option<StateReading>,
    pub physical_state: Option<StateReading>,
    pub emotional_state: Option<StateReading>,
    pub general_conclusion: Option<Conclusion>,
}

/// Build the health summary for a patient over the window ending at `now`.
pub fn health_summary(
    conn: &Connection,
    patient_id: i64,
    period: Period,
    now: NaiveDateTime,
) -> Result<HealthSummary, DatabaseError> {
    let start = period.start_from(now);

    let mut physical_vars = PhysicalVars::default();
    for (value, confidence) in
        subcategory_rows(conn, patient_id, taxonomy::PHYSICAL_HEALTH, taxonomy::SYMPTOMS, start, now)?
    {
        scan_symptom_row(&mut physical_vars, &value, confidence);
    }

    let physical_state = subcategory_rows(
        conn,
        patient_id,
        taxonomy::PHYSICAL_HEALTH,
        taxonomy::MOBILITY,
        start,
        now,
    )?
    .into_iter()
    .next()
    .map(|(value, confidence)| StateReading {
        rating: rating_from_confidence(confidence),
        description: value,
    });

    let sleep = subcategory_rows(
        conn,
        patient_id,
        taxonomy::PHYSICAL_HEALTH,
        taxonomy::SLEEP,
        start,
        now,
    )?
    .into_iter()
    .find_map(|(value, _)| extract::sleep_hours(&value))
    .map(|hours| SleepReading {
        hours,
        status: status_from_sleep_hours(hours),
    });

    let cognitive_state = latest_category_state(conn, patient_id, taxonomy::COGNITIVE_HEALTH, start, now)?;
    let emotional_state = latest_category_state(conn, patient_id, taxonomy::EMOTIONAL_STATE, start, now)?;

    let ratings: Vec<u8> = [&cognitive_state, &physical_state, &emotional_state]
        .into_iter()
        .flatten()
        .map(|state| state.rating)
        .collect();
    let general_conclusion = conclusion_from_ratings(&ratings);

    Ok(HealthSummary {
        physical_vars,
        sleep,
        cognitive_state,
        physical_state,
        emotional_state,
        general_conclusion,
    })
}

/// Mean of the available ratings: ≥ 7 good, ≥ 5 fair, below that poor.
/// No ratings at all means no conclusion.
fn conclusion_from_ratings(ratings: &[u8]) -> Option<Conclusion> {
    if ratings.is_empty() {
        return None;
    }
    let mean = ratings.iter().map(|&r| r as f64).sum::<f64>() / ratings.len() as f64;
    Some(if mean >= 7.0 {
        Conclusion::Good
    } else if mean >= 5.0 {
        Conclusion::Fair
    } else {
        Conclusion::Poor
    })
}

/// Fill vitals from one symptom row. Rows arrive most-recent first, so a
/// field that is already set keeps its newer reading.
fn scan_symptom_row(vars: &mut PhysicalVars, value: &str, confidence: f64) {
    let lower = value.to_lowercase();

    if vars.temperature.is_none() && lower.contains("temperatura") {
        if let Some(degrees) = extract::temperature(&lower) {
            vars.temperature = Some(VitalReading {
                value: format!("{degrees}"),
                status: status_from_confidence(confidence),
            });
            return;
        }
    }
    if vars.blood_pressure.is_none()
        && (lower.contains("presión") || lower.contains("presion"))
    {
        if let Some((systolic, diastolic)) = extract::blood_pressure(&lower) {
            vars.blood_pressure = Some(VitalReading {
                value: format!("{systolic}/{diastolic}"),
                status: status_from_confidence(confidence),
            });
            return;
        }
    }
    if vars.oxygen_saturation.is_none()
        && (lower.contains("oxígeno") || lower.contains("oxigeno"))
    {
        if let Some(percent) = extract::oxygen_saturation(&lower) {
            vars.oxygen_saturation = Some(VitalReading {
                value: format!("{percent}"),
                status: status_from_confidence(confidence),
            });
        }
    }
}

/// Most recent value under any subcategory of `category`, as a rated state.
fn latest_category_state(
    conn: &Connection,
    patient_id: i64,
    category: &str,
    start: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<Option<StateReading>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT cv.value, cv.confidence
         FROM classified_values cv
         JOIN subcategories s ON cv.subcategory_id = s.id
         JOIN categories c ON s.category_id = c.id
         JOIN messages m ON cv.message_id = m.id
         WHERE c.name = ?1
           AND m.patient_id = ?2
           AND m.created_at >= ?3
           AND m.created_at <= ?4
         ORDER BY m.created_at DESC
         LIMIT 1",
    )?;
    let state = stmt
        .query_map(
            params![
                category,
                patient_id,
                start.format(DATETIME_FMT).to_string(),
                now.format(DATETIME_FMT).to_string(),
            ],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
        )?
        .next()
        .transpose()?
        .map(|(value, confidence)| StateReading {
            rating: rating_from_confidence(confidence),
            description: value,
        });
    Ok(state)
}

/// All values for one subcategory in the window, most recent first.
fn subcategory_rows(
    conn: &Connection,
    patient_id: i64,
    category: &str,
    subcategory: &str,
    start: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<Vec<(String, f64)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT cv.value, cv.confidence
         FROM classified_values cv
         JOIN subcategories s ON cv.subcategory_id = s.id
         JOIN categories c ON s.category_id = c.id
         JOIN messages m ON cv.message_id = m.id
         WHERE c.name = ?1
           AND s.name = ?2
           AND m.patient_id = ?3
           AND m.created_at >= ?4
           AND m.created_at <= ?5
         ORDER BY m.created_at DESC",
    )?;
    let rows = stmt.query_map(
        params![
            category,
            subcategory,
            patient_id,
            start.format(DATETIME_FMT).to_string(),
            now.format(DATETIME_FMT).to_string(),
        ],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
    )?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

/// Metric kinds the history chart endpoint serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthMetric {
    BloodPressure,
    Temperature,
}

impl FromStr for HealthMetric {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blood_pressure" => Ok(HealthMetric::BloodPressure),
            "temperature" => Ok(HealthMetric::Temperature),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricPoint {
    pub date: String,
    pub value: String,
    pub status: Status,
}

/// Time series of one vital for charting, oldest first.
pub fn metric_history(
    conn: &Connection,
    patient_id: i64,
    metric: HealthMetric,
    period: Period,
    now: NaiveDateTime,
) -> Result<Vec<MetricPoint>, DatabaseError> {
    let start = period.start_from(now);

    let mut stmt = conn.prepare(
        "SELECT cv.value, cv.confidence, m.created_at
         FROM classified_values cv
         JOIN subcategories s ON cv.subcategory_id = s.id
         JOIN categories c ON s.category_id = c.id
         JOIN messages m ON cv.message_id = m.id
         WHERE c.name = ?1
           AND s.name = ?2
           AND m.patient_id = ?3
           AND m.created_at >= ?4
           AND m.created_at <= ?5
         ORDER BY m.created_at ASC",
    )?;
    let rows = stmt.query_map(
        params![
            taxonomy::PHYSICAL_HEALTH,
            taxonomy::SYMPTOMS,
            patient_id,
            start.format(DATETIME_FMT).to_string(),
            now.format(DATETIME_FMT).to_string(),
        ],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
            ))
        },
    )?;

    let mut points = Vec::new();
    for row in rows {
        let (value, confidence, created_at) = row?;
        let lower = value.to_lowercase();
        let date = created_at.chars().take(10).collect::<String>();

        let reading = match metric {
            HealthMetric::BloodPressure if lower.contains("presión") || lower.contains("presion") => {
                extract::blood_pressure(&lower).map(|(s, d)| format!("{s}/{d}"))
            }
            HealthMetric::Temperature if lower.contains("temperatura") => {
                extract::temperature(&lower).map(|t| format!("{t}"))
            }
            _ => None,
        };

        if let Some(value) = reading {
            points.push(MetricPoint {
                date,
                value,
                status: status_from_confidence(confidence),
            });
        }
    }

    Ok(points)
}
