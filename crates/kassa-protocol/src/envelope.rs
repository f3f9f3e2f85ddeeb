// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Envelope codec.
//
// Envelopes travel as JSON text in both directions. There is no binary
// framing: one message on the channel is one envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The `{intent, content}` unit exchanged over the bridge channel.
///
/// `content` is omitted from the encoded text when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub intent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

/// Why an inbound text could not be turned into a message.
///
/// The router drops all of these without any user-visible effect.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("envelope is not a JSON object")]
    NotAnObject,

    #[error("envelope has no string `intent`")]
    MissingIntent,

    #[error("unknown intent `{0}`")]
    UnknownIntent(String),

    #[error("`{intent}` expects {expected} content")]
    PayloadMismatch {
        intent: &'static str,
        expected: &'static str,
    },
}

impl Envelope {
    pub fn new(intent: impl Into<String>, content: Option<Value>) -> Self {
        Self {
            intent: intent.into(),
            content,
        }
    }

    /// Encode as JSON text, `intent` first.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse an envelope from JSON text.
    ///
    /// An explicit `"content": null` is treated the same as no content.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(mut fields) = value else {
            return Err(DecodeError::NotAnObject);
        };
        let intent = match fields.remove("intent") {
            Some(Value::String(intent)) => intent,
            _ => return Err(DecodeError::MissingIntent),
        };
        let content = match fields.remove("content") {
            None | Some(Value::Null) => None,
            Some(content) => Some(content),
        };
        Ok(Self { intent, content })
    }
}

/// Encode an `(intent, content)` pair in one step.
pub fn encode(intent: &str, content: Option<Value>) -> serde_json::Result<String> {
    Envelope::new(intent, content).encode()
}
