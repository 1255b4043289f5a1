//! Audit history: every classified value in a window, joined back to its
//! message and taxonomy names, most recent first.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use serde::Serialize;

use super::period::Period;
use super::rating_from_confidence;
use crate::db::repository::DATETIME_FMT;
use crate::db::DatabaseError;
use crate::taxonomy;

/// Optional taxonomy filter accepted by the history endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    Physical,
    Cognitive,
    Emotional,
    Medication,
}

impl CategoryFilter {
    pub fn taxonomy_name(&self) -> &'static str {
        match self {
            CategoryFilter::Physical => taxonomy::PHYSICAL_HEALTH,
            CategoryFilter::Cognitive => taxonomy::COGNITIVE_HEALTH,
            CategoryFilter::Emotional => taxonomy::EMOTIONAL_STATE,
            CategoryFilter::Medication => taxonomy::MEDICATION,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "physical" => Ok(CategoryFilter::Physical),
            "cognitive" => Ok(CategoryFilter::Cognitive),
            "emotional" => Ok(CategoryFilter::Emotional),
            "medication" => Ok(CategoryFilter::Medication),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryItem {
    pub id: i64,
    /// DD/MM/YYYY of the originating message.
    pub date: String,
    /// HH:MM of the originating message.
    pub time: String,
    /// First 100 characters of the message, with an ellipsis when truncated.
    pub original_text: String,
    pub category: String,
    pub subcategory: String,
    pub value: String,
    pub rating: u8,
    pub confidence: f64,
}

/// List classified values for a patient in the window, newest first.
pub fn fetch_history(
    conn: &Connection,
    patient_id: i64,
    period: Period,
    category: Option<CategoryFilter>,
    now: NaiveDateTime,
) -> Result<Vec<HistoryItem>, DatabaseError> {
    let start = period.start_from(now);

    let mut sql = String::from(
        "SELECT cv.id, cv.value, cv.confidence, m.content, m.created_at, s.name, c.name
         FROM classified_values cv
         JOIN messages m ON cv.message_id = m.id
         JOIN subcategories s ON cv.subcategory_id = s.id
         JOIN categories c ON s.category_id = c.id
         WHERE m.patient_id = ?1
           AND m.created_at >= ?2
           AND m.created_at <= ?3",
    );
    if category.is_some() {
        sql.push_str(" AND c.name = ?4");
    }
    sql.push_str(" ORDER BY m.created_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let start_str = start.format(DATETIME_FMT).to_string();
    let now_str = now.format(DATETIME_FMT).to_string();

    let map_row = |row: &rusqlite::Row| -> Result<HistoryItem, rusqlite::Error> {
        let value: String = row.get(1)?;
        let confidence: f64 = row.get(2)?;
        let content: String = row.get(3)?;
        let created_str: String = row.get(4)?;
        let created = NaiveDateTime::parse_from_str(&created_str, DATETIME_FMT)
            .unwrap_or_default();

        Ok(HistoryItem {
            id: row.get(0)?,
            date: created.format("%d/%m/%Y").to_string(),
            time: created.format("%H:%M").to_string(),
            original_text: truncate_text(&content, 100),
            category: row.get(6)?,
            subcategory: row.get(5)?,
            value,
            rating: rating_from_confidence(confidence),
            confidence,
        })
    };

    let items = match category {
        Some(filter) => {
            let rows = stmt.query_map(
                params![patient_id, start_str, now_str, filter.taxonomy_name()],
                map_row,
            )?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let rows = stmt.query_map(params![patient_id, start_str, now_str], map_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(items)
}

/// Character-aware truncation with an ellipsis.
fn truncate_text(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(limit).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    use crate::db::repository::{
        get_category_by_name, get_subcategory_by_name, insert_classified_value, insert_message,
        insert_patient, NewClassifiedValue, NewMessage, NewPatient,
    };
    use crate::db::sqlite::open_memory_database;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn classified(
        conn: &Connection,
        patient_id: i64,
        category: &str,
        subcategory: &str,
        content: &str,
        value: &str,
        confidence: f64,
        at: NaiveDateTime,
    ) {
        let cat = get_category_by_name(conn, category).unwrap().unwrap();
        let sub = get_subcategory_by_name(conn, cat.id, subcategory).unwrap().unwrap();
        let message_id = insert_message(
            conn,
            &NewMessage {
                patient_id,
                caregiver_id: None,
                content,
                external_message_id: None,
                manual: false,
            },
            at,
        )
        .unwrap();
        insert_classified_value(
            conn,
            &NewClassifiedValue {
                message_id,
                subcategory_id: sub.id,
                value,
                confidence,
            },
            at,
        )
        .unwrap();
    }

    #[test]
    fn newest_first_with_joined_names() {
        let conn = open_memory_database().unwrap();
        let patient_id = insert_patient(
            &conn,
            &NewPatient { name: "P", age: None, conditions: None, notes: None },
            now(),
        )
        .unwrap();

        classified(
            &conn,
            patient_id,
            taxonomy::PHYSICAL_HEALTH,
            taxonomy::SLEEP,
            "Durmió 8 horas",
            "8 horas",
            0.85,
            now() - Duration::days(2),
        );
        classified(
            &conn,
            patient_id,
            taxonomy::EMOTIONAL_STATE,
            "Humor",
            "Estuvo alegre",
            "alegre",
            0.7,
            now() - Duration::days(1),
        );

        let items = fetch_history(&conn, patient_id, Period::Week, None, now()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, taxonomy::EMOTIONAL_STATE);
        assert_eq!(items[0].subcategory, "Humor");
        assert_eq!(items[0].rating, 7);
        assert_eq!(items[0].date, "14/03/2026");
        assert_eq!(items[0].time, "12:00");
        assert_eq!(items[1].subcategory, taxonomy::SLEEP);
        // 0.85 rounds up
        assert_eq!(items[1].rating, 9);
    }

    #[test]
    fn category_filter_narrows_results() {
        let conn = open_memory_database().unwrap();
        let patient_id = insert_patient(
            &conn,
            &NewPatient { name: "P", age: None, conditions: None, notes: None },
            now(),
        )
        .unwrap();

        classified(
            &conn,
            patient_id,
            taxonomy::PHYSICAL_HEALTH,
            taxonomy::SLEEP,
            "Durmió",
            "8 horas",
            0.8,
            now() - Duration::days(1),
        );
        classified(
            &conn,
            patient_id,
            taxonomy::MEDICATION,
            "Adherencia",
            "Tomó todo",
            "toma completa",
            0.9,
            now() - Duration::days(1),
        );

        let items = fetch_history(
            &conn,
            patient_id,
            Period::Week,
            Some(CategoryFilter::Medication),
            now(),
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, taxonomy::MEDICATION);
    }

    #[test]
    fn long_messages_truncated_with_ellipsis() {
        let conn = open_memory_database().unwrap();
        let patient_id = insert_patient(
            &conn,
            &NewPatient { name: "P", age: None, conditions: None, notes: None },
            now(),
        )
        .unwrap();

        let long = "á".repeat(150);
        classified(
            &conn,
            patient_id,
            taxonomy::PHYSICAL_HEALTH,
            taxonomy::SLEEP,
            &long,
            "8 horas",
            0.8,
            now() - Duration::days(1),
        );

        let items = fetch_history(&conn, patient_id, Period::Week, None, now()).unwrap();
        assert_eq!(items[0].original_text.chars().count(), 103);
        assert!(items[0].original_text.ends_with("..."));
    }

    #[test]
    fn filter_parsing() {
        assert_eq!("physical".parse::<CategoryFilter>().unwrap(), CategoryFilter::Physical);
        assert!("financial".parse::<CategoryFilter>().is_err());
    }
}
