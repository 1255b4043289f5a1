use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::DATETIME_FMT;
use crate::db::DatabaseError;
use crate::models::ClassifiedValue;

pub struct NewClassifiedValue<'a> {
    pub message_id: i64,
    pub subcategory_id: i64,
    pub value: &'a str,
    pub confidence: f64,
}

/// Insert a classified value. Confidence is clamped into [0, 1]; the
/// classifier's floats are treated as untrusted input.
pub fn insert_classified_value(
    conn: &Connection,
    value: &NewClassifiedValue,
    created_at: NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO classified_values
         (message_id, subcategory_id, value, confidence, edited, created_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        params![
            value.message_id,
            value.subcategory_id,
            value.value,
            value.confidence.clamp(0.0, 1.0),
            created_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_classified_value(
    conn: &Connection,
    id: i64,
) -> Result<Option<ClassifiedValue>, DatabaseError> {
    conn.query_row(
        "SELECT id, message_id, subcategory_id, value, confidence, edited, created_at
         FROM classified_values WHERE id = ?1",
        params![id],
        row_to_value,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn get_values_by_message(
    conn: &Connection,
    message_id: i64,
) -> Result<Vec<ClassifiedValue>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, message_id, subcategory_id, value, confidence, edited, created_at
         FROM classified_values WHERE message_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![message_id], row_to_value)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

/// Caregiver edit flow: replace the stored value and mark the row edited.
pub fn update_value_text(
    conn: &Connection,
    id: i64,
    value: &str,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE classified_values SET value = ?2, edited = 1 WHERE id = ?1",
        params![id, value],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "classified_value".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_classified_value(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM classified_values WHERE id = ?1",
        params![id],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "classified_value".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn row_to_value(row: &rusqlite::Row) -> Result<ClassifiedValue, rusqlite::Error> {
    let created_str: String = row.get(6)?;
    Ok(ClassifiedValue {
        id: row.get(0)?,
        message_id: row.get(1)?,
        subcategory_id: row.get(2)?,
        value: row.get(3)?,
        confidence: row.get(4)?,
        edited: row.get(5)?,
        created_at: NaiveDateTime::parse_from_str(&created_str, DATETIME_FMT)
            .unwrap_or_default(),
    })
}
