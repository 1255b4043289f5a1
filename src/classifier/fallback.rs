//! Classification with model fallback.
//!
//! The classifier holds an ordered, immutable list of candidate model
//! identifiers. Each call tries the caller's preferred model first (when it
//! is a known candidate), then the remaining candidates in configured order,
//! and reports which one answered. Exhausting the list yields the sentinel
//! failed result, never an error — ingestion must not abort because the AI
//! is down.

use super::parser::parse_classification_response;
use super::prompt::{build_classification_prompt, CLASSIFICATION_SYSTEM_PROMPT};
use super::types::{ClassificationResult, TextModelClient};

pub struct Classifier {
    client: Box<dyn TextModelClient>,
    models: Vec<String>,
}

/// What one classification attempt produced.
pub struct ClassificationOutcome {
    pub result: ClassificationResult,
    /// The candidate that answered; `None` when all candidates failed.
    /// Callers may hold on to this as a soft preference for the next call.
    pub model: Option<String>,
}

impl Classifier {
    pub fn new(client: Box<dyn TextModelClient>, models: Vec<String>) -> Self {
        Self { client, models }
    }

    pub fn candidates(&self) -> &[String] {
        &self.models
    }

    /// Classify one message, trying `preferred` first when it is a known
    /// candidate.
    pub fn classify(&self, text: &str, preferred: Option<&str>) -> ClassificationOutcome {
        let prompt = build_classification_prompt(text);
        let mut last_error = String::from("no model candidates configured");

        for model in self.candidate_order(preferred) {
            match self
                .client
                .generate(model, &prompt, CLASSIFICATION_SYSTEM_PROMPT)
                .and_then(|response| parse_classification_response(&response))
            {
                Ok(result) => {
                    tracing::debug!(model, "classification succeeded");
                    return ClassificationOutcome {
                        result,
                        model: Some(model.to_string()),
                    };
                }
                Err(e) => {
                    tracing::warn!(model, error = %e, "classification attempt failed");
                    last_error = e.to_string();
                }
            }
        }

        tracing::error!(error = %last_error, "all classification candidates exhausted");
        ClassificationOutcome {
            result: ClassificationResult::failed(last_error),
            model: None,
        }
    }

    /// Candidates with `preferred` moved to the front. A preference that is
    /// not in the configured list is ignored.
    fn candidate_order<'a>(&'a self, preferred: Option<&str>) -> Vec<&'a str> {
        let mut order: Vec<&str> = Vec::with_capacity(self.models.len());
        if let Some(preferred) = preferred {
            if let Some(hit) = self.models.iter().find(|m| m.as_str() == preferred) {
                order.push(hit.as_str());
            }
        }
        for model in &self.models {
            if Some(model.as_str()) != order.first().copied() {
                order.push(model.as_str());
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::types::MockModelClient;

    const VALID: &str = r#"{"categorias":[{"nombre":"Gastos","detectada":true,
        "subcategorias":[{"nombre":"Medicamentos","detectada":true,"valor":"45","confianza":0.9}]}],
        "resumen":"ok"}"#;

    fn models() -> Vec<String> {
        vec!["primary".into(), "fallback-a".into(), "fallback-b".into()]
    }

    #[test]
    fn primary_success_uses_primary() {
        let classifier = Classifier::new(Box::new(MockModelClient::answering(VALID)), models());
        let outcome = classifier.classify("Gastamos 45€ en medicinas", None);
        assert_eq!(outcome.model.as_deref(), Some("primary"));
        assert!(!outcome.result.is_failure());
        assert_eq!(outcome.result.categorias.len(), 1);
    }

    #[test]
    fn falls_back_in_order_on_failure() {
        let client = MockModelClient::answering(VALID)
            .with_model("primary", Err("boom"))
            .with_model("fallback-a", Err("boom"));
        let classifier = Classifier::new(Box::new(client), models());
        let outcome = classifier.classify("x", None);
        assert_eq!(outcome.model.as_deref(), Some("fallback-b"));
    }

    #[test]
    fn malformed_response_triggers_fallback() {
        let client = MockModelClient::answering(VALID).with_model("primary", Ok("not json at all"));
        let classifier = Classifier::new(Box::new(client), models());
        let outcome = classifier.classify("x", None);
        assert_eq!(outcome.model.as_deref(), Some("fallback-a"));
    }

    #[test]
    fn exhaustion_returns_sentinel_not_error() {
        let classifier = Classifier::new(Box::new(MockModelClient::failing()), models());
        let outcome = classifier.classify("x", None);
        assert!(outcome.model.is_none());
        assert!(outcome.result.is_failure());
        assert!(outcome.result.categorias.is_empty());
        assert!(outcome.result.resumen.is_empty());
    }

    #[test]
    fn preferred_candidate_tried_first() {
        let client = MockModelClient::failing().with_model("fallback-b", Ok(VALID));
        let classifier = Classifier::new(Box::new(client), models());
        let outcome = classifier.classify("x", Some("fallback-b"));
        assert_eq!(outcome.model.as_deref(), Some("fallback-b"));
    }

    #[test]
    fn unknown_preference_is_ignored() {
        let classifier = Classifier::new(Box::new(MockModelClient::answering(VALID)), models());
        let outcome = classifier.classify("x", Some("not-a-candidate"));
        assert_eq!(outcome.model.as_deref(), Some("primary"));
    }

    #[test]
    fn empty_candidate_list_fails_cleanly() {
        let classifier = Classifier::new(Box::new(MockModelClient::answering(VALID)), vec![]);
        let outcome = classifier.classify("x", None);
        assert!(outcome.result.is_failure());
    }
}
