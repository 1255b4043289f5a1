use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A caregiver attached to exactly one patient. The phone number is the
/// identity inbound messages are resolved through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caregiver {
    pub id: i64,
    pub patient_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// "Profesional", "Familiar", ...
    pub role: Option<String>,
    pub created_at: NaiveDateTime,
}
