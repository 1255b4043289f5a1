//! Maps a classification result onto the taxonomy, producing zero or more
//! `ClassifiedValue` rows for one message.
//!
//! Mapping is best-effort per leaf: an unmatched category or subcategory is
//! recorded as a skip and never aborts the rest of the batch. The caller
//! provides transactional scope; every insert either lands or the whole
//! batch rolls back with it.

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::classifier::ClassificationResult;
use crate::db::repository::{
    get_category_by_name, get_subcategory_by_name, insert_classified_value, NewClassifiedValue,
};
use crate::db::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The AI named a category the taxonomy does not contain.
    UnknownCategory,
    /// The AI named a subcategory absent from the matched category.
    UnknownSubcategory,
    /// Detected leaf with an empty or whitespace-only value.
    EmptyValue,
}

/// One leaf of the classification result that could not be persisted.
#[derive(Debug, Clone)]
pub struct SkippedLeaf {
    pub category: String,
    pub subcategory: Option<String>,
    pub reason: SkipReason,
}

/// What one message's normalization produced.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub persisted: u32,
    pub skipped: Vec<SkippedLeaf>,
}

/// Normalize `result` into `ClassifiedValue` rows tied to `message_id`.
pub fn normalize(
    conn: &Connection,
    message_id: i64,
    result: &ClassificationResult,
    now: NaiveDateTime,
) -> Result<BatchOutcome, DatabaseError> {
    let mut outcome = BatchOutcome::default();

    for detected in result.categorias.iter().filter(|c| c.detectada) {
        let Some(category) = get_category_by_name(conn, &detected.nombre)? else {
            tracing::warn!(category = %detected.nombre, "unknown category in classification, skipping");
            outcome.skipped.push(SkippedLeaf {
                category: detected.nombre.clone(),
                subcategory: None,
                reason: SkipReason::UnknownCategory,
            });
            continue;
        };

        for leaf in detected.subcategorias.iter().filter(|s| s.detectada) {
            let value = leaf.valor.as_deref().unwrap_or("").trim();
            if value.is_empty() {
                outcome.skipped.push(SkippedLeaf {
                    category: category.name.clone(),
                    subcategory: Some(leaf.nombre.clone()),
                    reason: SkipReason::EmptyValue,
                });
                continue;
            }

            let Some(subcategory) = get_subcategory_by_name(conn, category.id, &leaf.nombre)?
            else {
                tracing::warn!(
                    category = %category.name,
                    subcategory = %leaf.nombre,
                    "unknown subcategory in classification, skipping"
                );
                outcome.skipped.push(SkippedLeaf {
                    category: category.name.clone(),
                    subcategory: Some(leaf.nombre.clone()),
                    reason: SkipReason::UnknownSubcategory,
                });
                continue;
            };

            insert_classified_value(
                conn,
                &NewClassifiedValue {
                    message_id,
                    subcategory_id: subcategory.id,
                    value,
                    confidence: leaf.confianza.clamp(0.0, 1.0),
                },
                now,
            )?;
            outcome.persisted += 1;
        }
    }

    Ok(outcome)
}
