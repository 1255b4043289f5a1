use std::fmt::Write;

use crate::taxonomy::TAXONOMY;

pub const CLASSIFICATION_SYSTEM_PROMPT: &str = "\
Actúas como un sistema de clasificación de mensajes para cuidadores de \
personas mayores o con condiciones neurodegenerativas. Analizas cada mensaje \
y extraes información estructurada según las categorías indicadas. Devuelves \
SOLO un objeto JSON válido, sin explicaciones adicionales.";

/// Build the classification prompt: the taxonomy definition (category names,
/// subcategory names and what each captures) followed by the caregiver
/// message and the expected JSON shape.
pub fn build_classification_prompt(message_text: &str) -> String {
    let mut prompt = String::from(
        "Analiza el siguiente mensaje y extrae información estructurada según estas categorías:\n\n",
    );

    for (index, category) in TAXONOMY.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}:", index + 1, category.name);
        for subcategory in category.subcategories {
            let _ = writeln!(prompt, "   - {} ({})", subcategory.name, subcategory.description);
        }
        prompt.push('\n');
    }

    let _ = write!(
        prompt,
        r#"Mensaje del cuidador:
"{message_text}"

Devuelve SOLO un objeto JSON con esta estructura, sin explicaciones adicionales:
{{
    "categorias": [
        {{
            "nombre": "Salud Física",
            "detectada": true,
            "subcategorias": [
                {{
                    "nombre": "Movilidad",
                    "detectada": true,
                    "valor": "texto extraído",
                    "confianza": 0.9
                }}
            ]
        }}
    ],
    "resumen": "Breve resumen del estado general del paciente basado en el mensaje"
}}

Incluye una entrada por categoría con "detectada" en false cuando el mensaje no la mencione.
"confianza" es un número entre 0 y 1.
"#
    );

    prompt
}
