use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::DATETIME_FMT;
use crate::db::DatabaseError;
use crate::models::Caregiver;

pub struct NewCaregiver<'a> {
    pub patient_id: i64,
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub role: Option<&'a str>,
}

pub fn insert_caregiver(
    conn: &Connection,
    caregiver: &NewCaregiver,
    now: NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO caregivers (patient_id, name, phone, email, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            caregiver.patient_id,
            caregiver.name,
            caregiver.phone,
            caregiver.email,
            caregiver.role,
            now.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Resolve an inbound sender identity to a caregiver.
pub fn get_caregiver_by_phone(
    conn: &Connection,
    phone: &str,
) -> Result<Option<Caregiver>, DatabaseError> {
    conn.query_row(
        "SELECT id, patient_id, name, phone, email, role, created_at
         FROM caregivers WHERE phone = ?1",
        params![phone],
        row_to_caregiver,
    )
    .optional()
    .map_err(DatabaseError::from)
}

fn row_to_caregiver(row: &rusqlite::Row) -> Result<Caregiver, rusqlite::Error> {
    let created_str: String = row.get(6)?;
    Ok(Caregiver {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        role: row.get(5)?,
        created_at: NaiveDateTime::parse_from_str(&created_str, DATETIME_FMT)
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::patient::{insert_patient, NewPatient};
    use crate::db::sqlite::open_memory_database;

    fn now() -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    #[test]
    fn lookup_by_phone() {
        let conn = open_memory_database().unwrap();
        let patient_id = insert_patient(
            &conn,
            &NewPatient { name: "P", age: None, conditions: None, notes: None },
            now(),
        )
        .unwrap();
        insert_caregiver(
            &conn,
            &NewCaregiver {
                patient_id,
                name: "Ana Pérez",
                phone: Some("+1234567890"),
                email: None,
                role: Some("Profesional"),
            },
            now(),
        )
        .unwrap();

        let found = get_caregiver_by_phone(&conn, "+1234567890").unwrap().unwrap();
        assert_eq!(found.name, "Ana Pérez");
        assert_eq!(found.patient_id, patient_id);

        assert!(get_caregiver_by_phone(&conn, "+0000000000").unwrap().is_none());
    }

    #[test]
    fn duplicate_phone_rejected() {
        let conn = open_memory_database().unwrap();
        let patient_id = insert_patient(
            &conn,
            &NewPatient { name: "P", age: None, conditions: None, notes: None },
            now(),
        )
        .unwrap();
        let caregiver = NewCaregiver {
            patient_id,
            name: "A",
            phone: Some("+111"),
            email: None,
            role: None,
        };
        insert_caregiver(&conn, &caregiver, now()).unwrap();
        let result = insert_caregiver(&conn, &caregiver, now());
        assert!(result.is_err());
        assert!(result.unwrap_err().is_unique_violation());
    }
}
