use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A person receiving care. Created via provisioning, rarely mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    /// Free-text medical conditions, e.g. "Alzheimer inicial, hipertensión".
    pub conditions: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
