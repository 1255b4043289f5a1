use serde::{Deserialize, Serialize};

use super::ClassifierError;

/// Structured output of the external classifier for one message.
///
/// Field names are the Spanish wire contract the model is prompted to emit;
/// they are kept verbatim so the serde derive is the schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(default)]
    pub categorias: Vec<DetectedCategory>,
    #[serde(default)]
    pub resumen: String,
    /// Set on the sentinel "classification failed" result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClassificationResult {
    /// Sentinel result used when every model candidate failed. Carries no
    /// categories and no summary; ingestion proceeds without classification.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            categorias: Vec::new(),
            resumen: String::new(),
            error: Some(reason.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectedCategory {
    pub nombre: String,
    #[serde(default)]
    pub detectada: bool,
    #[serde(default)]
    pub subcategorias: Vec<DetectedSubcategory>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectedSubcategory {
    pub nombre: String,
    #[serde(default)]
    pub detectada: bool,
    #[serde(default)]
    pub valor: Option<String>,
    #[serde(default)]
    pub confianza: f64,
}

/// Text-generation client abstraction (allows mocking).
pub trait TextModelClient: Send + Sync {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, ClassifierError>;
}

/// Mock client for testing — per-model canned responses or failures.
pub struct MockModelClient {
    responses: std::collections::HashMap<String, Result<String, String>>,
    default: Option<String>,
}

impl MockModelClient {
    /// Every model answers with the same response.
    pub fn answering(response: &str) -> Self {
        Self {
            responses: std::collections::HashMap::new(),
            default: Some(response.to_string()),
        }
    }

    /// Every model fails.
    pub fn failing() -> Self {
        Self {
            responses: std::collections::HashMap::new(),
            default: None,
        }
    }

    /// Pin a specific model's behaviour.
    pub fn with_model(mut self, model: &str, response: Result<&str, &str>) -> Self {
        self.responses.insert(
            model.to_string(),
            response.map(str::to_string).map_err(str::to_string),
        );
        self
    }
}

impl TextModelClient for MockModelClient {
    fn generate(
        &self,
        model: &str,
        _prompt: &str,
        _system: &str,
    ) -> Result<String, ClassifierError> {
        match self.responses.get(model) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(reason)) => Err(ClassifierError::Service {
                status: 500,
                body: reason.clone(),
            }),
            None => match &self.default {
                Some(response) => Ok(response.clone()),
                None => Err(ClassifierError::Connection("mock".into())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_result_is_empty_and_flagged() {
        let result = ClassificationResult::failed("all candidates exhausted");
        assert!(result.is_failure());
        assert!(result.categorias.is_empty());
        assert!(result.resumen.is_empty());
    }

    #[test]
    fn mock_client_per_model_behaviour() {
        let client = MockModelClient::failing().with_model("good", Ok("{}"));
        assert!(client.generate("good", "p", "s").is_ok());
        assert!(client.generate("bad", "p", "s").is_err());
    }

    #[test]
    fn wire_fields_deserialize_with_defaults() {
        let json = r#"{"categorias":[{"nombre":"Gastos"}]}"#;
        let result: ClassificationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.categorias.len(), 1);
        assert!(!result.categorias[0].detectada);
        assert!(result.resumen.is_empty());
        assert!(!result.is_failure());
    }
}
