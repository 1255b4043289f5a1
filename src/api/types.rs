//! Shared state for the API router.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::classifier::Classifier;

/// Context cloned into every handler: the database connection, the
/// classifier with its candidate list, and the caller-held model affinity.
#[derive(Clone)]
pub struct ApiContext {
    db: Arc<Mutex<Connection>>,
    pub classifier: Arc<Classifier>,
    /// Candidate that last answered; tried first on the next call.
    preferred_model: Arc<Mutex<Option<String>>>,
    pub verify_token: Arc<String>,
}

impl ApiContext {
    pub fn new(conn: Connection, classifier: Classifier, verify_token: String) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            classifier: Arc::new(classifier),
            preferred_model: Arc::new(Mutex::new(None)),
            verify_token: Arc::new(verify_token),
        }
    }

    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))
    }

    pub fn preferred_model(&self) -> Option<String> {
        self.preferred_model.lock().ok().and_then(|g| g.clone())
    }

    /// Promote the candidate that just answered. `None` leaves the current
    /// preference untouched — a failed call says nothing about ordering.
    pub fn promote_model(&self, model: Option<String>) {
        if model.is_none() {
            return;
        }
        if let Ok(mut guard) = self.preferred_model.lock() {
            *guard = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::MockModelClient;
    use crate::db::sqlite::open_memory_database;

    fn ctx() -> ApiContext {
        ApiContext::new(
            open_memory_database().unwrap(),
            Classifier::new(Box::new(MockModelClient::answering("{}")), vec!["m".into()]),
            "token".into(),
        )
    }

    #[test]
    fn promote_ignores_none() {
        let ctx = ctx();
        ctx.promote_model(Some("fallback".into()));
        assert_eq!(ctx.preferred_model().as_deref(), Some("fallback"));
        ctx.promote_model(None);
        assert_eq!(ctx.preferred_model().as_deref(), Some("fallback"));
    }
}
