// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Kassa.

use thiserror::Error;

use crate::types::StoreErrorInfo;

/// Top-level error type for all Kassa operations.
#[derive(Debug, Error)]
pub enum KassaError {
    // -- Store connection --
    #[error("store connection failed: {0}")]
    Connection(String),

    // -- Catalog --
    #[error("product not found in store catalog: {0}")]
    ProductNotFound(String),

    // -- Store-reported failures (carry the store's code/message pair) --
    #[error("store error [{code}]: {message}")]
    Store { code: String, message: String },

    // -- Receipt acknowledgement --
    #[error("failed to finalize transaction {transaction_id}: {source}")]
    Finalize {
        transaction_id: String,
        #[source]
        source: Box<KassaError>,
    },

    // -- Host / platform bridge --
    #[error("host bridge error: {0}")]
    Bridge(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KassaError {
    /// Build a store-originated error from its code and message.
    pub fn store(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The store's `(code, message)` pair, if this error came from the store.
    ///
    /// Finalization failures report the pair of the underlying store error.
    pub fn store_error(&self) -> Option<StoreErrorInfo> {
        match self {
            Self::Store { code, message } => Some(StoreErrorInfo {
                code: code.clone(),
                message: message.clone(),
            }),
            Self::Finalize { source, .. } => source.store_error(),
            _ => None,
        }
    }
}

impl From<StoreErrorInfo> for KassaError {
    fn from(info: StoreErrorInfo) -> Self {
        Self::Store {
            code: info.code,
            message: info.message,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KassaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_exposes_code_and_message() {
        let err = KassaError::store("E_USER_CANCELLED", "user cancelled");
        let info = err.store_error().unwrap();
        assert_eq!(info.code, "E_USER_CANCELLED");
        assert_eq!(info.message, "user cancelled");
        assert_eq!(err.to_string(), "store error [E_USER_CANCELLED]: user cancelled");
    }

    #[test]
    fn finalize_error_carries_inner_store_pair() {
        let err = KassaError::Finalize {
            transaction_id: "GPA.1234".into(),
            source: Box::new(KassaError::store("E_SERVICE_ERROR", "billing unavailable")),
        };
        assert_eq!(err.store_error().unwrap().code, "E_SERVICE_ERROR");
        assert!(err.to_string().contains("GPA.1234"));
    }

    #[test]
    fn generic_failures_have_no_store_pair() {
        assert!(KassaError::ProductNotFound("sku_missing".into()).store_error().is_none());
        assert!(KassaError::Connection("no billing client".into()).store_error().is_none());
    }
}
