use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{Category, Subcategory};

/// Case-insensitive lookup of an active category by name. The classifier is
/// prompted with the canonical names but is free text underneath, so the
/// match tolerates case drift.
pub fn get_category_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<Category>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, description, active, display_order
         FROM categories WHERE name = ?1 COLLATE NOCASE AND active = 1",
        params![name.trim()],
        row_to_category,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Case-insensitive lookup of an active subcategory scoped to a category.
pub fn get_subcategory_by_name(
    conn: &Connection,
    category_id: i64,
    name: &str,
) -> Result<Option<Subcategory>, DatabaseError> {
    conn.query_row(
        "SELECT id, category_id, name, description, active, display_order
         FROM subcategories
         WHERE category_id = ?1 AND name = ?2 COLLATE NOCASE AND active = 1",
        params![category_id, name.trim()],
        row_to_subcategory,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn list_active_categories(conn: &Connection) -> Result<Vec<Category>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, active, display_order
         FROM categories WHERE active = 1 ORDER BY display_order",
    )?;
    let rows = stmt.query_map([], row_to_category)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

pub fn list_subcategories(
    conn: &Connection,
    category_id: i64,
) -> Result<Vec<Subcategory>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, category_id, name, description, active, display_order
         FROM subcategories
         WHERE category_id = ?1 AND active = 1
         ORDER BY display_order",
    )?;
    let rows = stmt.query_map(params![category_id], row_to_subcategory)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}

fn row_to_category(row: &rusqlite::Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        active: row.get(3)?,
        display_order: row.get(4)?,
    })
}

fn row_to_subcategory(row: &rusqlite::Row) -> Result<Subcategory, rusqlite::Error> {
    Ok(Subcategory {
        id: row.get(0)?,
        category_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        active: row.get(4)?,
        display_order: row.get(5)?,
    })
}
