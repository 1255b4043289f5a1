use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::DATETIME_FMT;
use crate::db::DatabaseError;
use crate::models::Message;

pub struct NewMessage<'a> {
    pub patient_id: i64,
    pub caregiver_id: Option<i64>,
    pub content: &'a str,
    pub external_message_id: Option<&'a str>,
    pub manual: bool,
}

/// Insert a message. A UNIQUE violation on `external_message_id` surfaces as
/// a `DatabaseError` for which `is_unique_violation()` is true.
pub fn insert_message(
    conn: &Connection,
    message: &NewMessage,
    created_at: NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO messages
         (patient_id, caregiver_id, content, external_message_id, manual, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            message.patient_id,
            message.caregiver_id,
            message.content,
            message.external_message_id,
            message.manual,
            created_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Dedup pre-check on the provider-supplied id.
pub fn message_exists_by_external_id(
    conn: &Connection,
    external_id: &str,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM messages WHERE external_message_id = ?1",
        params![external_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_message(conn: &Connection, id: i64) -> Result<Option<Message>, DatabaseError> {
    conn.query_row(
        "SELECT id, patient_id, caregiver_id, content, external_message_id, manual, created_at
         FROM messages WHERE id = ?1",
        params![id],
        row_to_message,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn update_message_content(
    conn: &Connection,
    id: i64,
    content: &str,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE messages SET content = ?2 WHERE id = ?1",
        params![id, content],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "message".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Delete a message; classified values cascade.
pub fn delete_message(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM messages WHERE id = ?1", params![id])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "message".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn row_to_message(row: &rusqlite::Row) -> Result<Message, rusqlite::Error> {
    let created_str: String = row.get(6)?;
    Ok(Message {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        caregiver_id: row.get(2)?,
        content: row.get(3)?,
        external_message_id: row.get(4)?,
        manual: row.get(5)?,
        created_at: NaiveDateTime::parse_from_str(&created_str, DATETIME_FMT)
            .unwrap_or_default(),
    })
}
