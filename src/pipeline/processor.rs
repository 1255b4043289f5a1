//! One inbound message, end to end: caregiver resolution, dedup,
//! classification, and the transactional normalization batch.

use chrono::NaiveDateTime;
use rusqlite::Connection;
use uuid::Uuid;

use super::normalizer::normalize;
use super::PipelineError;
use crate::classifier::Classifier;
use crate::db::repository::{
    get_caregiver_by_phone, insert_message, message_exists_by_external_id, NewMessage,
};
use crate::webhook::InboundMessage;

/// How an inbound message was handled.
#[derive(Debug)]
pub enum ProcessOutcome {
    Processed {
        message_id: i64,
        persisted: u32,
        skipped: usize,
        summary: String,
        /// True when every model candidate failed and the message was stored
        /// without classified values.
        classification_failed: bool,
        /// Candidate that answered, for the caller's soft model affinity.
        model: Option<String>,
    },
    /// The external message id was already ingested.
    Duplicate,
    /// The sender's phone is not a registered caregiver.
    UnknownCaregiver { sender: String },
    /// The payload carried no sender identity; nothing to attribute.
    MissingSender,
}

/// Process one normalized inbound message.
///
/// The classification call happens outside the write transaction — it is a
/// slow network round trip and must not hold the database. Everything the
/// message produces (the row itself plus its classified values) commits as
/// one unit.
pub fn process_inbound(
    conn: &mut Connection,
    classifier: &Classifier,
    preferred_model: Option<&str>,
    inbound: &InboundMessage,
    now: NaiveDateTime,
) -> Result<ProcessOutcome, PipelineError> {
    let Some(sender) = inbound.sender.as_deref() else {
        tracing::warn!("inbound message without sender identity, skipping attribution");
        return Ok(ProcessOutcome::MissingSender);
    };

    let Some(caregiver) = get_caregiver_by_phone(conn, sender)? else {
        tracing::warn!(sender, "no caregiver registered for sender");
        return Ok(ProcessOutcome::UnknownCaregiver {
            sender: sender.to_string(),
        });
    };

    // Generic payloads may carry no id; synthesize one (forfeits dedup).
    let external_id = inbound
        .external_id
        .clone()
        .unwrap_or_else(|| format!("gen:{}", Uuid::new_v4()));

    // Dedup before paying for a classification round trip.
    if message_exists_by_external_id(conn, &external_id)? {
        tracing::info!(external_id, "duplicate message, already processed");
        return Ok(ProcessOutcome::Duplicate);
    }

    let outcome = classifier.classify(&inbound.text, preferred_model);

    let tx = conn.transaction().map_err(crate::db::DatabaseError::from)?;
    let message_id = match insert_message(
        &tx,
        &NewMessage {
            patient_id: caregiver.patient_id,
            caregiver_id: Some(caregiver.id),
            content: &inbound.text,
            external_message_id: Some(&external_id),
            manual: false,
        },
        now,
    ) {
        Ok(id) => id,
        // A concurrent ingest of the same id won the race between our
        // pre-check and this insert.
        Err(e) if e.is_unique_violation() => return Ok(ProcessOutcome::Duplicate),
        Err(e) => return Err(e.into()),
    };

    let batch = normalize(&tx, message_id, &outcome.result, now)?;
    tx.commit().map_err(crate::db::DatabaseError::from)?;

    tracing::info!(
        message_id,
        persisted = batch.persisted,
        skipped = batch.skipped.len(),
        "message classified and stored"
    );

    Ok(ProcessOutcome::Processed {
        message_id,
        persisted: batch.persisted,
        skipped: batch.skipped.len(),
        summary: outcome.result.resumen.clone(),
        classification_failed: outcome.result.is_failure(),
        model: outcome.model,
    })
}
