use super::types::ClassificationResult;
use super::ClassifierError;

/// Parse the model's free-text response into a `ClassificationResult`.
///
/// Models routinely wrap the JSON object in a fenced block even when told
/// not to; the wrapper is stripped before decoding. Any decode failure is a
/// recoverable `ClassifierError` — the fallback chain decides what happens
/// next.
pub fn parse_classification_response(
    response: &str,
) -> Result<ClassificationResult, ClassifierError> {
    let json_str = strip_code_fences(response);
    if json_str.trim().is_empty() {
        return Err(ClassifierError::MalformedResponse("empty response".into()));
    }
    serde_json::from_str(json_str.trim())
        .map_err(|e| ClassifierError::JsonParsing(e.to_string()))
}

/// Strip an optional ```json ... ``` (or bare ``` ... ```) wrapper.
fn strip_code_fences(response: &str) -> &str {
    if let Some(start) = response.find("```json") {
        let inner = &response[start + 7..];
        return inner.split("```").next().unwrap_or(inner);
    }
    if let Some(start) = response.find("```") {
        let inner = &response[start + 3..];
        return inner.split("```").next().unwrap_or(inner);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str = r#"{
        "categorias": [
            {
                "nombre": "Gastos",
                "detectada": true,
                "subcategorias": [
                    {"nombre": "Medicamentos", "detectada": true, "valor": "45", "confianza": 0.9}
                ]
            }
        ],
        "resumen": "Gasto en medicación"
    }"#;

    #[test]
    fn parses_plain_json() {
        let result = parse_classification_response(PLAIN).unwrap();
        assert_eq!(result.categorias.len(), 1);
        assert_eq!(result.categorias[0].nombre, "Gastos");
        assert!(result.categorias[0].detectada);
        let sub = &result.categorias[0].subcategorias[0];
        assert_eq!(sub.valor.as_deref(), Some("45"));
        assert!((sub.confianza - 0.9).abs() < f64::EPSILON);
        assert_eq!(result.resumen, "Gasto en medicación");
    }

    #[test]
    fn strips_json_fence() {
        let fenced = format!("Aquí está el resultado:\n```json\n{PLAIN}\n```\nEspero que ayude.");
        let result = parse_classification_response(&fenced).unwrap();
        assert_eq!(result.categorias.len(), 1);
    }

    #[test]
    fn strips_bare_fence() {
        let fenced = format!("```\n{PLAIN}\n```");
        let result = parse_classification_response(&fenced).unwrap();
        assert_eq!(result.resumen, "Gasto en medicación");
    }

    #[test]
    fn malformed_json_is_recoverable_error() {
        let result = parse_classification_response("```json\n{not json}\n```");
        assert!(matches!(result, Err(ClassifierError::JsonParsing(_))));
    }

    #[test]
    fn empty_response_is_error() {
        assert!(matches!(
            parse_classification_response("```json\n\n```"),
            Err(ClassifierError::MalformedResponse(_))
        ));
    }

    #[test]
    fn missing_fields_default() {
        let result = parse_classification_response(r#"{"categorias": []}"#).unwrap();
        assert!(result.categorias.is_empty());
        assert!(result.resumen.is_empty());
        assert!(!result.is_failure());
    }
}
