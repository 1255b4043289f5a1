//! Financial summary: expense totals per category over a reporting window.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use serde::Serialize;

use super::extract::first_amount;
use super::period::Period;
use crate::db::repository::DATETIME_FMT;
use crate::db::DatabaseError;
use crate::taxonomy;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub amount: f64,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FinancialSummary {
    pub income: f64,
    pub expenses: f64,
    pub categories: Vec<CategoryTotal>,
    pub period: Period,
}

/// Expense totals for a patient over the window ending at `now`.
///
/// Every classified value under the Gastos category contributes the first
/// decimal number found in its text; values without digits contribute
/// nothing. Income is always 0 — the taxonomy has no income category.
pub fn financial_summary(
    conn: &Connection,
    patient_id: i64,
    period: Period,
    now: NaiveDateTime,
) -> Result<FinancialSummary, DatabaseError> {
    let categories = expenses_by_category(conn, patient_id, period, now)?;
    let expenses = categories.iter().map(|c| c.amount).sum();

    Ok(FinancialSummary {
        income: 0.0,
        expenses,
        categories,
        period,
    })
}

/// Per-subcategory expense totals, first-seen (most recent) order.
pub fn expenses_by_category(
    conn: &Connection,
    patient_id: i64,
    period: Period,
    now: NaiveDateTime,
) -> Result<Vec<CategoryTotal>, DatabaseError> {
    let start = period.start_from(now);

    let mut stmt = conn.prepare(
        "SELECT s.name, cv.value
         FROM classified_values cv
         JOIN subcategories s ON cv.subcategory_id = s.id
         JOIN categories c ON s.category_id = c.id
         JOIN messages m ON cv.message_id = m.id
         WHERE c.name = ?1
           AND m.patient_id = ?2
           AND m.created_at >= ?3
           AND m.created_at <= ?4
         ORDER BY m.created_at DESC",
    )?;
    let rows = stmt.query_map(
        params![
            taxonomy::EXPENSES,
            patient_id,
            start.format(DATETIME_FMT).to_string(),
            now.format(DATETIME_FMT).to_string(),
        ],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
    )?;

    let mut totals: Vec<CategoryTotal> = Vec::new();
    for row in rows {
        let (name, value) = row?;
        let Some(amount) = first_amount(&value) else {
            continue;
        };
        match totals.iter_mut().find(|t| t.name == name) {
            Some(total) => total.amount += amount,
            None => totals.push(CategoryTotal {
                color: category_color(&name),
                name,
                amount,
            }),
        }
    }

    Ok(totals)
}

/// Deterministic display color per expense category name.
pub fn category_color(category: &str) -> &'static str {
    match category {
        "Vivienda" => "#1e40af",
        "Servicios básicos" => "#3b82f6",
        "Cuidados" => "#ef4444",
        "Salud" => "#f97316",
        "Supermercado" => "#22c55e",
        "Transporte" => "#a855f7",
        "Medicamentos" => "#06b6d4",
        "Recreación" => "#f59e0b",
        _ => "#6b7280",
    }
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

    fn patient(conn: &Connection) -> i64 {
        insert_patient(
            conn,
            &NewPatient { name: "P", age: None, conditions: None, notes: None },
            now(),
        )
        .unwrap()
    }

    fn expense(
        conn: &Connection,
        patient_id: i64,
        subcategory: &str,
        value: &str,
        at: NaiveDateTime,
    ) {
        let expenses = get_category_by_name(conn, taxonomy::EXPENSES).unwrap().unwrap();
        let sub = get_subcategory_by_name(conn, expenses.id, subcategory)
            .unwrap()
            .unwrap();
        let message_id = insert_message(
            conn,
            &NewMessage {
                patient_id,
                caregiver_id: None,
                content: value,
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
                confidence: 0.9,
            },
            at,
        )
        .unwrap();
    }

    #[test]
    fn sums_per_category_and_grand_total() {
        let conn = open_memory_database().unwrap();
        let patient_id = patient(&conn);
        expense(&conn, patient_id, "Supermercado", "Supermercado: $125.50", now() - Duration::days(1));
        expense(&conn, patient_id, "Supermercado", "compra 24.50", now() - Duration::days(2));
        expense(&conn, patient_id, "Medicamentos", "45", now() - Duration::days(3));

        let summary = financial_summary(&conn, patient_id, Period::Month, now()).unwrap();
        assert!((summary.expenses - 195.0).abs() < 1e-9);
        assert_eq!(summary.income, 0.0);
        assert_eq!(summary.categories.len(), 2);

        let supermarket = summary
            .categories
            .iter()
            .find(|c| c.name == "Supermercado")
            .unwrap();
        assert!((supermarket.amount - 150.0).abs() < 1e-9);
        assert_eq!(supermarket.color, "#22c55e");
    }

    #[test]
    fn digitless_values_contribute_nothing() {
        let conn = open_memory_database().unwrap();
        let patient_id = patient(&conn);
        expense(&conn, patient_id, "Varios", "un gasto sin importe", now() - Duration::days(1));

        let summary = financial_summary(&conn, patient_id, Period::Month, now()).unwrap();
        assert_eq!(summary.expenses, 0.0);
        assert!(summary.categories.is_empty());
    }

    #[test]
    fn week_window_boundary() {
        let conn = open_memory_database().unwrap();
        let patient_id = patient(&conn);
        // 7 days and 1 second before now: excluded
        expense(
            &conn,
            patient_id,
            "Salud",
            "100",
            now() - Duration::days(7) - Duration::seconds(1),
        );
        // 6 days before now: included
        expense(&conn, patient_id, "Salud", "30", now() - Duration::days(6));

        let summary = financial_summary(&conn, patient_id, Period::Week, now()).unwrap();
        assert!((summary.expenses - 30.0).abs() < 1e-9);
    }

    #[test]
    fn other_patients_are_invisible() {
        let conn = open_memory_database().unwrap();
        let patient_a = patient(&conn);
        let patient_b = patient(&conn);
        expense(&conn, patient_a, "Salud", "100", now() - Duration::days(1));

        let summary = financial_summary(&conn, patient_b, Period::Month, now()).unwrap();
        assert_eq!(summary.expenses, 0.0);
    }

    #[test]
    fn unmapped_category_gets_default_color() {
        assert_eq!(category_color("Varios"), "#6b7280");
        assert_eq!(category_color("Otros"), "#6b7280");
        assert_eq!(category_color("Inexistente"), "#6b7280");
        assert_eq!(category_color("Vivienda"), "#1e40af");
    }
}
