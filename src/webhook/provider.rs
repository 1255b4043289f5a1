//! Provider adapter: turns an inbound webhook request of unknown shape into
//! a normalized `(text, external_id, sender)` triple.
//!
//! Detection runs in priority order: header signature, then shape sniffing
//! of provider-specific payload keys, then a best-effort generic extractor
//! over common field aliases. Pure and stateless; the caller decides what a
//! miss means.

use std::collections::HashMap;

use axum::http::header::{CONTENT_TYPE, USER_AGENT};
use axum::http::HeaderMap;
use serde_json::Value;

/// Messaging providers this deployment recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Twilio,
    WhatsAppCloud,
    Generic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Twilio => "twilio",
            Provider::WhatsAppCloud => "whatsapp_cloud",
            Provider::Generic => "generic",
        }
    }
}

/// Normalized inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub text: String,
    /// Provider-supplied id used for deduplication; absent for payloads
    /// that carry none (the pipeline synthesizes one).
    pub external_id: Option<String>,
    /// Sender identity (phone number). Absent senders skip caregiver
    /// resolution downstream.
    pub sender: Option<String>,
}

/// Outcome of provider detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderPayload {
    Recognized {
        provider: Provider,
        message: InboundMessage,
    },
    /// No variant matched and the generic extractor found no text.
    Unrecognized,
}

/// Detect the provider for an inbound request and extract its message.
pub fn detect(headers: &HeaderMap, body: &[u8]) -> ProviderPayload {
    // 1. Header signature
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if user_agent.contains("TwilioProxy") {
        if let Some(message) = extract_twilio(body) {
            return ProviderPayload::Recognized {
                provider: Provider::Twilio,
                message,
            };
        }
    }

    // 2. Shape sniffing
    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("application/x-www-form-urlencoded"))
        .unwrap_or(false);
    if is_form {
        if let Some(message) = extract_twilio(body) {
            return ProviderPayload::Recognized {
                provider: Provider::Twilio,
                message,
            };
        }
    }

    if let Ok(json) = serde_json::from_slice::<Value>(body) {
        if json.get("entry").map(Value::is_array).unwrap_or(false) {
            if let Some(message) = extract_whatsapp_cloud(&json) {
                return ProviderPayload::Recognized {
                    provider: Provider::WhatsAppCloud,
                    message,
                };
            }
        }

        // 3. Generic fallback over field aliases
        if let Some(message) = extract_generic(&json) {
            return ProviderPayload::Recognized {
                provider: Provider::Generic,
                message,
            };
        }
    }

    ProviderPayload::Unrecognized
}

/// Twilio form payload: `From` / `Body` / `MessageSid`.
fn extract_twilio(body: &[u8]) -> Option<InboundMessage> {
    let form: HashMap<String, String> = serde_urlencoded::from_bytes(body).ok()?;
    if !form.contains_key("MessageSid") && !form.contains_key("Body") {
        return None;
    }
    let text = form.get("Body")?.trim().to_string();
    if text.is_empty() {
        return None;
    }
    let sender = form
        .get("From")
        .map(|from| strip_whatsapp_prefix(from).to_string())
        .filter(|s| !s.is_empty());
    Some(InboundMessage {
        text,
        external_id: form.get("MessageSid").cloned().filter(|s| !s.is_empty()),
        sender,
    })
}

/// WhatsApp Cloud payload: `entry[].changes[].value.messages[]`.
fn extract_whatsapp_cloud(json: &Value) -> Option<InboundMessage> {
    let message = json
        .get("entry")?
        .as_array()?
        .first()?
        .get("changes")?
        .as_array()?
        .first()?
        .get("value")?
        .get("messages")?
        .as_array()?
        .first()?;

    let text = message
        .get("text")?
        .get("body")?
        .as_str()?
        .trim()
        .to_string();
    if text.is_empty() {
        return None;
    }
    Some(InboundMessage {
        text,
        external_id: message
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string),
        sender: message
            .get("from")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

const TEXT_ALIASES: &[&str] = &["text", "message", "body"];
const SENDER_ALIASES: &[&str] = &["from", "sender", "phone", "number"];
const ID_ALIASES: &[&str] = &["id", "message_id"];

/// Best-effort extractor scanning common aliases, including one level of
/// nesting. Text is mandatory; sender and id are not.
fn extract_generic(json: &Value) -> Option<InboundMessage> {
    let object = json.as_object()?;
    let text = find_alias(object, TEXT_ALIASES)?;
    let text = text.trim().to_string();
    if text.is_empty() {
        return None;
    }
    Some(InboundMessage {
        text,
        external_id: find_alias(object, ID_ALIASES),
        sender: find_alias(object, SENDER_ALIASES)
            .map(|s| strip_whatsapp_prefix(&s).to_string()),
    })
}

fn find_alias(
    object: &serde_json::Map<String, Value>,
    aliases: &[&str],
) -> Option<String> {
    for alias in aliases {
        if let Some(value) = object.get(*alias).and_then(scalar_to_string) {
            return Some(value);
        }
    }
    // One level down
    for nested in object.values().filter_map(Value::as_object) {
        for alias in aliases {
            if let Some(value) = nested.get(*alias).and_then(scalar_to_string) {
                return Some(value);
            }
        }
    }
    None
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn strip_whatsapp_prefix(sender: &str) -> &str {
    sender.strip_prefix("whatsapp:").unwrap_or(sender)
}
