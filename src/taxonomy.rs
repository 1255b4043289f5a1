//! The fixed classification taxonomy: categories, subcategories and the
//! short descriptions the classification prompt is built from.
//!
//! Category and subcategory names are the join keys between the AI's
//! free-text labels and the stored rows, so they are stable Spanish strings
//! matching the classifier wire contract. `seed_taxonomy` makes the database
//! mirror these definitions; it is idempotent and runs at startup.

use rusqlite::{params, Connection};

use crate::db::DatabaseError;

/// A fixed top-level category.
pub struct CategoryDef {
    pub name: &'static str,
    pub description: &'static str,
    pub subcategories: &'static [SubcategoryDef],
}

/// A subcategory within one category.
pub struct SubcategoryDef {
    pub name: &'static str,
    pub description: &'static str,
}

pub const PHYSICAL_HEALTH: &str = "Salud Física";
pub const COGNITIVE_HEALTH: &str = "Salud Cognitiva";
pub const EMOTIONAL_STATE: &str = "Estado Emocional";
pub const MEDICATION: &str = "Medicación";
pub const EXPENSES: &str = "Gastos";

/// Subcategory names the health summary scans for.
pub const SYMPTOMS: &str = "Síntomas";
pub const MOBILITY: &str = "Movilidad";
pub const SLEEP: &str = "Sueño";

/// Fallback subcategory for manual expense entries with an unmapped category.
pub const EXPENSES_FALLBACK: &str = "Otros";

pub const TAXONOMY: &[CategoryDef] = &[
    CategoryDef {
        name: PHYSICAL_HEALTH,
        description: "Estado físico general del paciente",
        subcategories: &[
            SubcategoryDef { name: MOBILITY, description: "pasos, distancia, desplazamientos" },
            SubcategoryDef { name: "Alimentación", description: "comidas, apetito" },
            SubcategoryDef { name: SLEEP, description: "horas y calidad de sueño" },
            SubcategoryDef { name: SYMPTOMS, description: "dolor, malestar, temperatura, presión, oxígeno" },
        ],
    },
    CategoryDef {
        name: COGNITIVE_HEALTH,
        description: "Estado cognitivo del paciente",
        subcategories: &[
            SubcategoryDef { name: "Memoria", description: "olvidos, reconocimiento" },
            SubcategoryDef { name: "Orientación", description: "tiempo, lugar" },
            SubcategoryDef { name: "Comunicación", description: "claridad, coherencia" },
        ],
    },
    CategoryDef {
        name: EMOTIONAL_STATE,
        description: "Estado emocional del paciente",
        subcategories: &[
            SubcategoryDef { name: "Humor", description: "alegría, tristeza, irritabilidad" },
            SubcategoryDef { name: "Sociabilidad", description: "interacción, aislamiento" },
            SubcategoryDef { name: "Agitación", description: "inquietud, ansiedad" },
        ],
    },
    CategoryDef {
        name: MEDICATION,
        description: "Medicación del paciente",
        subcategories: &[
            SubcategoryDef { name: "Adherencia", description: "toma, rechazo" },
            SubcategoryDef { name: "Efectos", description: "reacciones, eficacia" },
        ],
    },
    CategoryDef {
        name: EXPENSES,
        description: "Gastos relacionados con el cuidado",
        subcategories: &[
            SubcategoryDef { name: "Vivienda", description: "alquiler, hipoteca, mantenimiento" },
            SubcategoryDef { name: "Servicios básicos", description: "luz, agua, gas, teléfono" },
            SubcategoryDef { name: "Cuidados", description: "cuidadores, residencia, ayuda a domicilio" },
            SubcategoryDef { name: "Salud", description: "consultas, tratamientos" },
            SubcategoryDef { name: "Supermercado", description: "compra de alimentos" },
            SubcategoryDef { name: "Transporte", description: "traslados, ambulancia, taxi" },
            SubcategoryDef { name: "Medicamentos", description: "costos de medicación" },
            SubcategoryDef { name: "Recreación", description: "ocio, actividades" },
            SubcategoryDef { name: "Varios", description: "otros gastos detallados" },
            SubcategoryDef { name: EXPENSES_FALLBACK, description: "gastos sin categoría clara" },
        ],
    },
];

/// Insert any taxonomy rows missing from the database. Existing rows are
/// left untouched, so renames require a migration rather than a reseed.
pub fn seed_taxonomy(conn: &Connection) -> Result<(), DatabaseError> {
    for (cat_order, cat) in TAXONOMY.iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO categories (name, description, active, display_order)
             VALUES (?1, ?2, 1, ?3)",
            params![cat.name, cat.description, cat_order as i64],
        )?;
        let category_id: i64 = conn.query_row(
            "SELECT id FROM categories WHERE name = ?1",
            params![cat.name],
            |row| row.get(0),
        )?;
        for (sub_order, sub) in cat.subcategories.iter().enumerate() {
            conn.execute(
                "INSERT OR IGNORE INTO subcategories
                 (category_id, name, description, active, display_order)
                 VALUES (?1, ?2, ?3, 1, ?4)",
                params![category_id, sub.name, sub.description, sub_order as i64],
            )?;
        }
    }
    Ok(())
}
