use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::DATETIME_FMT;
use crate::db::DatabaseError;
use crate::models::Patient;

/// Fields for provisioning a new patient.
pub struct NewPatient<'a> {
    pub name: &'a str,
    pub age: Option<i64>,
    pub conditions: Option<&'a str>,
    pub notes: Option<&'a str>,
}

pub fn insert_patient(
    conn: &Connection,
    patient: &NewPatient,
    now: NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (name, age, conditions, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            patient.name,
            patient.age,
            patient.conditions,
            patient.notes,
            now.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, age, conditions, notes, created_at, updated_at
         FROM patients WHERE id = ?1",
        params![id],
        row_to_patient,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, age, conditions, notes, created_at, updated_at
         FROM patients ORDER BY id",
    )?;
    let rows = stmt.query_map([], row_to_patient)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

pub fn patient_exists(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM patients WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn row_to_patient(row: &rusqlite::Row) -> Result<Patient, rusqlite::Error> {
    let created_str: String = row.get(5)?;
    let updated_str: String = row.get(6)?;
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        conditions: row.get(3)?,
        notes: row.get(4)?,
        created_at: NaiveDateTime::parse_from_str(&created_str, DATETIME_FMT)
            .unwrap_or_default(),
        updated_at: NaiveDateTime::parse_from_str(&updated_str, DATETIME_FMT)
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn now() -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    #[test]
    fn insert_and_get_patient() {
        let conn = open_memory_database().unwrap();
        let id = insert_patient(
            &conn,
            &NewPatient {
                name: "María García",
                age: Some(78),
                conditions: Some("Alzheimer inicial, hipertensión"),
                notes: None,
            },
            now(),
        )
        .unwrap();

        let patient = get_patient(&conn, id).unwrap().unwrap();
        assert_eq!(patient.name, "María García");
        assert_eq!(patient.age, Some(78));
    }

    #[test]
    fn get_missing_patient_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_patient(&conn, 99).unwrap().is_none());
        assert!(!patient_exists(&conn, 99).unwrap());
    }

    #[test]
    fn list_patients_ordered() {
        let conn = open_memory_database().unwrap();
        for name in ["A", "B"] {
            insert_patient(
                &conn,
                &NewPatient { name, age: None, conditions: None, notes: None },
                now(),
            )
            .unwrap();
        }
        let all = list_patients(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "A");
    }
}
