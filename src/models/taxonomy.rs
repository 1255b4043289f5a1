use serde::{Deserialize, Serialize};

/// A fixed top-level classification category, e.g. "Salud Física".
/// Names are unique and stable; they join the classifier's free-text labels
/// to stored rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub display_order: Option<i64>,
}

/// A subcategory within one category; name unique within its category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub display_order: Option<i64>,
}
