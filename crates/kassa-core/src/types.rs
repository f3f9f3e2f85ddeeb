// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Kassa purchase bridge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Host operating system the bridge is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    /// Desktop / CI builds without a native store.
    Other,
}

impl Platform {
    /// Platform of the current build target.
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Self::Android
        } else if cfg!(target_os = "ios") {
            Self::Ios
        } else {
            Self::Other
        }
    }

    /// Name reported to the web document in the `platform` message.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Other => "other",
        }
    }

    /// Parse a platform name as used on the command line and in config.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "android" => Some(Self::Android),
            "ios" => Some(Self::Ios),
            "other" | "desktop" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product as listed in the store's live catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub title: String,
    pub description: String,
    /// Localised price string as displayed by the store (e.g. "$0.99").
    pub localized_price: String,
    pub currency: String,
}

impl Product {
    /// Minimal product entry with only an identifier.
    pub fn with_id(product_id: impl Into<String>) -> Self {
        let product_id = product_id.into();
        Self {
            title: product_id.clone(),
            product_id,
            description: String::new(),
            localized_price: String::new(),
            currency: String::new(),
        }
    }
}

/// A completed or restored transaction delivered by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub product_id: String,
    pub transaction_id: String,
    pub transaction_date: DateTime<Utc>,
    /// Store receipt; empty while the transaction is deferred.
    #[serde(default)]
    pub transaction_receipt: String,
    /// Raw purchase JSON (Android only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_json: Option<String>,
}

impl Purchase {
    /// The receipt that must be finalized, if any.
    ///
    /// Falls back to `original_json` when the store left the receipt empty.
    pub fn receipt(&self) -> Option<&str> {
        if !self.transaction_receipt.is_empty() {
            return Some(&self.transaction_receipt);
        }
        self.original_json.as_deref().filter(|json| !json.is_empty())
    }
}

/// Platform-specific shape of a purchase request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PurchaseRequest {
    /// iOS: a single SKU.
    Sku { sku: String },
    /// Android: a list of SKUs.
    Skus { skus: Vec<String> },
}

impl PurchaseRequest {
    /// Every SKU the request covers.
    pub fn skus(&self) -> Vec<&str> {
        match self {
            Self::Sku { sku } => vec![sku.as_str()],
            Self::Skus { skus } => skus.iter().map(String::as_str).collect(),
        }
    }
}

/// The `(code, message)` pair attached to store-reported failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreErrorInfo {
    pub code: String,
    pub message: String,
}

impl StoreErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StoreErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.code, self.message)
    }
}

/// Lifecycle states of a single purchase attempt.
///
/// `Requested → (Updated | Errored)`, then `Updated → Finalizing →
/// (Finalized | FinalizeFailed)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseState {
    /// Purchase request issued to the store.
    Requested,
    /// Store delivered a transaction for the request.
    Updated,
    /// Store reported failure or cancellation, or the product was missing.
    Errored,
    /// Receipt acknowledgement in progress.
    Finalizing,
    /// Receipt acknowledged; terminal success.
    Finalized,
    /// Receipt acknowledgement failed; the store will redeliver.
    FinalizeFailed,
}

impl PurchaseState {
    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: PurchaseState) -> bool {
        matches!(
            (self, next),
            (Self::Requested, Self::Updated)
                | (Self::Requested, Self::Errored)
                | (Self::Updated, Self::Finalizing)
                | (Self::Finalizing, Self::Finalized)
                | (Self::Finalizing, Self::FinalizeFailed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized | Self::FinalizeFailed | Self::Errored)
    }

    /// Terminal failures produce a `purchase_error` toward the web side.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::FinalizeFailed | Self::Errored)
    }
}

/// Snapshot of the embedded document's navigation state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub can_go_back: bool,
    #[serde(default)]
    pub can_go_forward: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub loading: bool,
}

impl NavigationState {
    /// Snapshot carrying only the back-history flag.
    pub fn with_back(can_go_back: bool) -> Self {
        Self {
            can_go_back,
            ..Default::default()
        }
    }
}

/// Banner sizes the ad surface can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BannerSize {
    Banner,
    FullBanner,
    LargeBanner,
    AnchoredAdaptiveBanner,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(receipt: &str, original_json: Option<&str>) -> Purchase {
        Purchase {
            product_id: "coins_100".into(),
            transaction_id: "1000000123".into(),
            transaction_date: Utc::now(),
            transaction_receipt: receipt.into(),
            original_json: original_json.map(str::to_owned),
        }
    }

    #[test]
    fn receipt_prefers_transaction_receipt() {
        let p = purchase("MIIT...", Some("{\"orderId\":\"GPA.1\"}"));
        assert_eq!(p.receipt(), Some("MIIT..."));
    }

    #[test]
    fn receipt_falls_back_to_original_json() {
        let p = purchase("", Some("{\"orderId\":\"GPA.1\"}"));
        assert_eq!(p.receipt(), Some("{\"orderId\":\"GPA.1\"}"));
    }

    #[test]
    fn empty_receipt_and_json_means_no_receipt() {
        assert_eq!(purchase("", None).receipt(), None);
        assert_eq!(purchase("", Some("")).receipt(), None);
    }

    #[test]
    fn purchase_state_machine_edges() {
        use PurchaseState::*;
        assert!(Requested.can_transition_to(Updated));
        assert!(Requested.can_transition_to(Errored));
        assert!(Updated.can_transition_to(Finalizing));
        assert!(Finalizing.can_transition_to(FinalizeFailed));
        assert!(!Requested.can_transition_to(Finalized));
        assert!(!Errored.can_transition_to(Updated));
        assert!(!Finalized.can_transition_to(Finalizing));
    }

    #[test]
    fn failure_states_are_terminal() {
        for state in [PurchaseState::Errored, PurchaseState::FinalizeFailed] {
            assert!(state.is_terminal());
            assert!(state.is_failure());
        }
        assert!(PurchaseState::Finalized.is_terminal());
        assert!(!PurchaseState::Finalized.is_failure());
        assert!(!PurchaseState::Finalizing.is_terminal());
    }

    #[test]
    fn platform_names() {
        assert_eq!(Platform::Android.as_str(), "android");
        assert_eq!(Platform::from_name("iOS"), Some(Platform::Ios));
        assert_eq!(Platform::from_name("blackberry"), None);
        assert_eq!(serde_json::to_string(&Platform::Ios).unwrap(), "\"ios\"");
    }

    #[test]
    fn purchase_serializes_camel_case() {
        let json = serde_json::to_value(purchase("r", None)).unwrap();
        assert_eq!(json["productId"], "coins_100");
        assert_eq!(json["transactionReceipt"], "r");
        assert!(json.get("originalJson").is_none());
    }

    #[test]
    fn request_shapes_serialize_like_the_store_expects() {
        let ios = PurchaseRequest::Sku { sku: "a".into() };
        let android = PurchaseRequest::Skus { skus: vec!["a".into()] };
        assert_eq!(serde_json::to_string(&ios).unwrap(), r#"{"sku":"a"}"#);
        assert_eq!(serde_json::to_string(&android).unwrap(), r#"{"skus":["a"]}"#);
        assert_eq!(android.skus(), vec!["a"]);
    }
}
