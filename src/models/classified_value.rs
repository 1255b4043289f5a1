use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One classified fact extracted from a message: a free-text value under a
/// taxonomy subcategory with the classifier's confidence.
///
/// Invariants enforced at creation: confidence is clamped into [0, 1] and
/// the subcategory is an active member of the fixed taxonomy. Rows are only
/// mutated through the caregiver edit flow, which sets `edited`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedValue {
    pub id: i64,
    pub message_id: i64,
    pub subcategory_id: i64,
    pub value: String,
    pub confidence: f64,
    pub edited: bool,
    pub created_at: NaiveDateTime,
}
