//! Manual financial entries.
//!
//! A manual transaction is stored exactly like a classified message: a
//! synthetic Message marked `manual` plus one ClassifiedValue under
//! Gastos → named subcategory, so the financial summary needs no special
//! case for it. The transaction id exposed to clients is the classified
//! value's id.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::extract::first_amount;
use crate::db::repository::{
    delete_classified_value, delete_message, get_classified_value, get_message, insert_classified_value,
    insert_message, get_category_by_name, get_subcategory_by_name, patient_exists,
    update_message_content, update_value_text, NewClassifiedValue, NewMessage,
};
use crate::db::DatabaseError;
use crate::taxonomy;

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Patient {0} not found")]
    UnknownPatient(i64),

    #[error("Transaction {0} not found")]
    NotFound(i64),

    #[error("Unsupported transaction type: {0}")]
    UnsupportedType(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// A new manual entry, validated at the API boundary.
pub struct NewTransactionEntry<'a> {
    pub patient_id: i64,
    pub kind: &'a str,
    pub category: &'a str,
    pub amount: f64,
    pub date: NaiveDate,
}

/// Partial update for an existing entry.
#[derive(Default)]
pub struct TransactionPatch<'a> {
    pub description: Option<&'a str>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub category: String,
    pub amount: f64,
    pub date: String,
}

const EDITED_MARKER: &str = "(editado)";

/// Register a manual expense.
///
/// Only `expense` entries are accepted: the taxonomy has no income category,
/// and an entry without a classified value would be invisible to every
/// report and impossible to edit or delete.
pub fn create_transaction(
    conn: &mut Connection,
    entry: &NewTransactionEntry,
) -> Result<TransactionRecord, TransactionError> {
    if entry.kind != "expense" {
        return Err(TransactionError::UnsupportedType(entry.kind.to_string()));
    }
    if !patient_exists(conn, entry.patient_id)? {
        return Err(TransactionError::UnknownPatient(entry.patient_id));
    }

    let expenses = get_category_by_name(conn, taxonomy::EXPENSES)?.ok_or_else(|| {
        DatabaseError::NotFound {
            entity_type: "category".into(),
            id: taxonomy::EXPENSES.into(),
        }
    })?;
    let subcategory = match get_subcategory_by_name(conn, expenses.id, entry.category)? {
        Some(subcategory) => subcategory,
        None => get_subcategory_by_name(conn, expenses.id, taxonomy::EXPENSES_FALLBACK)?
            .ok_or_else(|| DatabaseError::NotFound {
                entity_type: "subcategory".into(),
                id: taxonomy::EXPENSES_FALLBACK.into(),
            })?,
    };

    let created_at: NaiveDateTime = entry
        .date
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default();
    let content = format!(
        "Registro manual: {} de ${} en categoría {} del {}",
        entry.kind, entry.amount, subcategory.name, entry.date
    );
    let external_id = format!("manual:{}", Uuid::new_v4());

    let tx = conn.transaction().map_err(DatabaseError::from)?;
    let message_id = insert_message(
        &tx,
        &NewMessage {
            patient_id: entry.patient_id,
            caregiver_id: None,
            content: &content,
            external_message_id: Some(&external_id),
            manual: true,
        },
        created_at,
    )?;
    let value_id = insert_classified_value(
        &tx,
        &NewClassifiedValue {
            message_id,
            subcategory_id: subcategory.id,
            value: &entry.amount.to_string(),
            confidence: 1.0,
        },
        created_at,
    )?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(value_id, patient_id = entry.patient_id, "manual transaction registered");

    Ok(TransactionRecord {
        id: value_id,
        kind: "expense",
        category: subcategory.name,
        amount: entry.amount,
        date: entry.date.format("%Y-%m-%d").to_string(),
    })
}

/// Edit a manual entry: patch the amount and/or description. The message
/// text gains an edited marker and the value row is flagged.
pub fn update_transaction(
    conn: &mut Connection,
    id: i64,
    patch: &TransactionPatch,
) -> Result<TransactionRecord, TransactionError> {
    let value = get_classified_value(conn, id)?.ok_or(TransactionError::NotFound(id))?;
    let message = get_message(conn, value.message_id)?.ok_or(TransactionError::NotFound(id))?;

    let base = match patch.description {
        Some(description) => description.trim().to_string(),
        None => message
            .content
            .trim_end_matches(EDITED_MARKER)
            .trim_end()
            .to_string(),
    };
    let content = format!("{base} {EDITED_MARKER}");

    let tx = conn.transaction().map_err(DatabaseError::from)?;
    if let Some(amount) = patch.amount {
        update_value_text(&tx, id, &amount.to_string())?;
    } else {
        // Mark the row edited even when only the description changed.
        update_value_text(&tx, id, &value.value)?;
    }
    update_message_content(&tx, message.id, &content)?;
    tx.commit().map_err(DatabaseError::from)?;

    fetch_record(conn, id)
}

/// Remove a manual entry and its backing message in one unit.
pub fn delete_transaction(conn: &mut Connection, id: i64) -> Result<(), TransactionError> {
    let value = get_classified_value(conn, id)?.ok_or(TransactionError::NotFound(id))?;

    let tx = conn.transaction().map_err(DatabaseError::from)?;
    delete_classified_value(&tx, id)?;
    delete_message(&tx, value.message_id)?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(id, "manual transaction deleted");
    Ok(())
}

fn fetch_record(conn: &Connection, id: i64) -> Result<TransactionRecord, TransactionError> {
    let value = get_classified_value(conn, id)?.ok_or(TransactionError::NotFound(id))?;
    let message = get_message(conn, value.message_id)?.ok_or(TransactionError::NotFound(id))?;
    let category: String = conn
        .query_row(
            "SELECT name FROM subcategories WHERE id = ?1",
            [value.subcategory_id],
            |row| row.get(0),
        )
        .map_err(DatabaseError::from)?;

    Ok(TransactionRecord {
        id,
        kind: "expense",
        category,
        amount: first_amount(&value.value).unwrap_or(0.0),
        date: message.created_at.format("%Y-%m-%d").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{insert_patient, NewPatient};
    use crate::db::sqlite::open_memory_database;
    use crate::report::{financial_summary, Period};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn patient(conn: &Connection) -> i64 {
        insert_patient(
            conn,
            &NewPatient { name: "P", age: None, conditions: None, notes: None },
            chrono::Local::now().naive_local(),
        )
        .unwrap()
    }

    #[test]
    fn create_lands_in_financial_summary() {
        let mut conn = open_memory_database().unwrap();
        let patient_id = patient(&conn);

        let record = create_transaction(
            &mut conn,
            &NewTransactionEntry {
                patient_id,
                kind: "expense",
                category: "Supermercado",
                amount: 125.50,
                date: date(2026, 3, 10),
            },
        )
        .unwrap();
        assert_eq!(record.category, "Supermercado");
        assert_eq!(record.date, "2026-03-10");

        let now = date(2026, 3, 15).and_hms_opt(12, 0, 0).unwrap();
        let summary = financial_summary(&conn, patient_id, Period::Month, now).unwrap();
        assert!((summary.expenses - 125.50).abs() < 1e-9);
        assert_eq!(summary.categories[0].name, "Supermercado");
    }

    #[test]
    fn unmapped_category_falls_back_to_otros() {
        let mut conn = open_memory_database().unwrap();
        let patient_id = patient(&conn);

        let record = create_transaction(
            &mut conn,
            &NewTransactionEntry {
                patient_id,
                kind: "expense",
                category: "Jardinería",
                amount: 60.0,
                date: date(2026, 3, 10),
            },
        )
        .unwrap();
        assert_eq!(record.category, taxonomy::EXPENSES_FALLBACK);
    }

    #[test]
    fn income_is_rejected() {
        let mut conn = open_memory_database().unwrap();
        let patient_id = patient(&conn);

        let result = create_transaction(
            &mut conn,
            &NewTransactionEntry {
                patient_id,
                kind: "income",
                category: "Pensión",
                amount: 900.0,
                date: date(2026, 3, 1),
            },
        );
        assert!(matches!(result, Err(TransactionError::UnsupportedType(_))));
    }

    #[test]
    fn unknown_patient_is_rejected() {
        let mut conn = open_memory_database().unwrap();
        let result = create_transaction(
            &mut conn,
            &NewTransactionEntry {
                patient_id: 404,
                kind: "expense",
                category: "Salud",
                amount: 10.0,
                date: date(2026, 3, 1),
            },
        );
        assert!(matches!(result, Err(TransactionError::UnknownPatient(404))));
    }

    #[test]
    fn update_patches_amount_and_marks_edited() {
        let mut conn = open_memory_database().unwrap();
        let patient_id = patient(&conn);
        let record = create_transaction(
            &mut conn,
            &NewTransactionEntry {
                patient_id,
                kind: "expense",
                category: "Salud",
                amount: 40.0,
                date: date(2026, 3, 10),
            },
        )
        .unwrap();

        let updated = update_transaction(
            &mut conn,
            record.id,
            &TransactionPatch { description: None, amount: Some(55.0) },
        )
        .unwrap();
        assert!((updated.amount - 55.0).abs() < 1e-9);

        let value = get_classified_value(&conn, record.id).unwrap().unwrap();
        assert!(value.edited);
        let message = get_message(&conn, value.message_id).unwrap().unwrap();
        assert!(message.content.ends_with(EDITED_MARKER));
    }

    #[test]
    fn update_does_not_stack_edit_markers() {
        let mut conn = open_memory_database().unwrap();
        let patient_id = patient(&conn);
        let record = create_transaction(
            &mut conn,
            &NewTransactionEntry {
                patient_id,
                kind: "expense",
                category: "Salud",
                amount: 40.0,
                date: date(2026, 3, 10),
            },
        )
        .unwrap();

        for amount in [41.0, 42.0] {
            update_transaction(
                &mut conn,
                record.id,
                &TransactionPatch { description: None, amount: Some(amount) },
            )
            .unwrap();
        }

        let value = get_classified_value(&conn, record.id).unwrap().unwrap();
        let message = get_message(&conn, value.message_id).unwrap().unwrap();
        assert_eq!(message.content.matches(EDITED_MARKER).count(), 1);
    }

    #[test]
    fn delete_removes_value_and_message() {
        let mut conn = open_memory_database().unwrap();
        let patient_id = patient(&conn);
        let record = create_transaction(
            &mut conn,
            &NewTransactionEntry {
                patient_id,
                kind: "expense",
                category: "Transporte",
                amount: 20.0,
                date: date(2026, 3, 10),
            },
        )
        .unwrap();

        let message_id = get_classified_value(&conn, record.id)
            .unwrap()
            .unwrap()
            .message_id;
        delete_transaction(&mut conn, record.id).unwrap();

        assert!(get_classified_value(&conn, record.id).unwrap().is_none());
        assert!(get_message(&conn, message_id).unwrap().is_none());

        let result = delete_transaction(&mut conn, record.id);
        assert!(matches!(result, Err(TransactionError::NotFound(_))));
    }
}
