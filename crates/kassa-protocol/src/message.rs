// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed messages, one payload shape per intent.
//
// Inbound content is validated while decoding: an envelope whose content does
// not match its intent is rejected the same way as malformed text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use kassa_core::types::{Platform, Purchase, StoreErrorInfo};

use crate::envelope::{DecodeError, Envelope};
use crate::intent;

/// Messages sent by the web document to the native host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Buy the product with this store identifier.
    Payment { product_id: String },
    /// Show or hide the promotional banner.
    Ad { visible: bool },
    /// Surface a native alert (diagnostics only).
    Test { message: String },
}

impl Inbound {
    pub fn intent(&self) -> &'static str {
        match self {
            Self::Payment { .. } => intent::PAYMENT,
            Self::Ad { .. } => intent::AD,
            Self::Test { .. } => intent::TEST,
        }
    }

    /// Decode and validate an inbound text message.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        Self::from_envelope(Envelope::decode(text)?)
    }

    pub fn from_envelope(envelope: Envelope) -> Result<Self, DecodeError> {
        match envelope.intent.as_str() {
            intent::PAYMENT => match envelope.content {
                Some(Value::String(product_id)) => Ok(Self::Payment { product_id }),
                _ => Err(DecodeError::PayloadMismatch {
                    intent: intent::PAYMENT,
                    expected: "a product identifier string",
                }),
            },
            intent::AD => match envelope.content {
                Some(Value::Bool(visible)) => Ok(Self::Ad { visible }),
                _ => Err(DecodeError::PayloadMismatch {
                    intent: intent::AD,
                    expected: "boolean",
                }),
            },
            intent::TEST => match envelope.content {
                Some(Value::String(message)) => Ok(Self::Test { message }),
                _ => Err(DecodeError::PayloadMismatch {
                    intent: intent::TEST,
                    expected: "string",
                }),
            },
            _ => Err(DecodeError::UnknownIntent(envelope.intent)),
        }
    }

    pub fn to_envelope(&self) -> Envelope {
        let content = match self {
            Self::Payment { product_id } => Value::String(product_id.clone()),
            Self::Ad { visible } => Value::Bool(*visible),
            Self::Test { message } => Value::String(message.clone()),
        };
        Envelope::new(self.intent(), Some(content))
    }
}

/// Content of an outbound `payment` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentContent {
    pub payload: Purchase,
    pub platform: Platform,
}

/// Messages pushed by the native host to the web document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Host platform, sent once after the initial document load.
    Platform(Platform),
    /// A transaction was finalized with the store.
    Payment(PaymentContent),
    /// A purchase attempt failed. Carries the store's code/message when the
    /// store reported the failure.
    PurchaseError(Option<StoreErrorInfo>),
}

impl Outbound {
    pub fn payment(purchase: Purchase, platform: Platform) -> Self {
        Self::Payment(PaymentContent {
            payload: purchase,
            platform,
        })
    }

    pub fn intent(&self) -> &'static str {
        match self {
            Self::Platform(_) => intent::PLATFORM,
            Self::Payment(_) => intent::PAYMENT,
            Self::PurchaseError(_) => intent::PURCHASE_ERROR,
        }
    }

    pub fn to_envelope(&self) -> serde_json::Result<Envelope> {
        let content = match self {
            Self::Platform(platform) => Some(Value::String(platform.as_str().to_owned())),
            Self::Payment(content) => Some(serde_json::to_value(content)?),
            Self::PurchaseError(info) => info.as_ref().map(serde_json::to_value).transpose()?,
        };
        Ok(Envelope::new(self.intent(), content))
    }

    /// Encode as the text posted to the web document.
    pub fn encode(&self) -> serde_json::Result<String> {
        self.to_envelope()?.encode()
    }

    /// Parse an outbound message, as the web document would.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let envelope = Envelope::decode(text)?;
        match envelope.intent.as_str() {
            intent::PLATFORM => {
                let platform = envelope
                    .content
                    .and_then(|c| serde_json::from_value(c).ok())
                    .ok_or(DecodeError::PayloadMismatch {
                        intent: intent::PLATFORM,
                        expected: "platform name",
                    })?;
                Ok(Self::Platform(platform))
            }
            intent::PAYMENT => {
                let content = envelope
                    .content
                    .and_then(|c| serde_json::from_value(c).ok())
                    .ok_or(DecodeError::PayloadMismatch {
                        intent: intent::PAYMENT,
                        expected: "{payload, platform}",
                    })?;
                Ok(Self::Payment(content))
            }
            intent::PURCHASE_ERROR => match envelope.content {
                None => Ok(Self::PurchaseError(None)),
                Some(content) => serde_json::from_value(content)
                    .map(|info| Self::PurchaseError(Some(info)))
                    .map_err(|_| DecodeError::PayloadMismatch {
                        intent: intent::PURCHASE_ERROR,
                        expected: "{code, message} or no",
                    }),
            },
            _ => Err(DecodeError::UnknownIntent(envelope.intent)),
        }
    }
}
