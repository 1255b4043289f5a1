use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An inbound caregiver message, or a synthetic message backing a manual
/// transaction entry. `external_message_id` carries the provider-supplied id
/// and is unique, which is what makes ingestion idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub patient_id: i64,
    /// None for messages whose sender could not be attributed.
    pub caregiver_id: Option<i64>,
    pub content: String,
    pub external_message_id: Option<String>,
    pub manual: bool,
    pub created_at: NaiveDateTime,
}
