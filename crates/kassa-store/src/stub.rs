// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory store for desktop/CI builds where no native store exists.
//
// The stub keeps a catalog, records every call it receives, and can be told
// how the next purchase request should end. Store events can also be injected
// directly to simulate redelivered transactions.

use std::cell::{Cell, RefCell};

use chrono::Utc;
use uuid::Uuid;

use kassa_core::error::{KassaError, Result};
use kassa_core::types::{Platform, Product, Purchase, PurchaseRequest, StoreErrorInfo};

use crate::traits::*;

/// Purchase capability paired with the stub store.
pub struct StubPurchases;

impl PlatformPurchases for StubPurchases {
    fn platform(&self) -> Platform {
        Platform::Other
    }

    fn purchase_request(&self, product: &Product) -> PurchaseRequest {
        PurchaseRequest::Sku {
            sku: product.product_id.clone(),
        }
    }

    fn startup_hygiene(&self) -> StartupHygiene {
        StartupHygiene::Nothing
    }
}

/// How the stub answers a purchase request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubOutcome {
    /// Deliver a purchase with a receipt to the update listeners.
    Complete,
    /// Deliver a purchase with an empty receipt (deferred / ask-to-buy).
    Deferred,
    /// Report this error to the error listeners.
    Fail(StoreErrorInfo),
    /// Reject the request call itself.
    Reject(StoreErrorInfo),
    /// Never answer.
    Pend,
}

/// Store calls observed by the stub, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubCall {
    InitConnection,
    FlushFailedPending,
    ClearTransactions,
    Products(Vec<String>),
    RequestPurchase(PurchaseRequest),
    FinishTransaction(String),
    EndConnection,
    AddListener(ListenerId),
    RemoveListener(ListenerId),
}

/// In-memory `PurchaseStore`.
pub struct StubStore {
    catalog: RefCell<Vec<Product>>,
    connected: Cell<bool>,
    next_listener: Cell<u64>,
    update_listeners: RefCell<Vec<(ListenerId, PurchaseUpdatedCallback)>>,
    error_listeners: RefCell<Vec<(ListenerId, PurchaseErrorCallback)>>,
    outcome: RefCell<StubOutcome>,
    init_failure: RefCell<Option<String>>,
    finish_failure: RefCell<Option<StoreErrorInfo>>,
    hygiene_failure: RefCell<Option<StoreErrorInfo>>,
    calls: RefCell<Vec<StubCall>>,
}

impl StubStore {
    /// Create a stub offering the given SKUs.
    pub fn new<I, S>(skus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            catalog: RefCell::new(skus.into_iter().map(Product::with_id).collect()),
            connected: Cell::new(false),
            next_listener: Cell::new(1),
            update_listeners: RefCell::new(Vec::new()),
            error_listeners: RefCell::new(Vec::new()),
            outcome: RefCell::new(StubOutcome::Complete),
            init_failure: RefCell::new(None),
            finish_failure: RefCell::new(None),
            hygiene_failure: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Decide how subsequent purchase requests end.
    pub fn set_outcome(&self, outcome: StubOutcome) {
        *self.outcome.borrow_mut() = outcome;
    }

    /// Make `init_connection` fail with this message.
    pub fn fail_init(&self, message: impl Into<String>) {
        *self.init_failure.borrow_mut() = Some(message.into());
    }

    /// Make `finish_transaction` fail (`None` restores success).
    pub fn fail_finish(&self, error: Option<StoreErrorInfo>) {
        *self.finish_failure.borrow_mut() = error;
    }

    /// Make the startup flush/clear calls fail (`None` restores success).
    pub fn fail_hygiene(&self, error: Option<StoreErrorInfo>) {
        *self.hygiene_failure.borrow_mut() = error;
    }

    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }

    pub fn listener_count(&self) -> usize {
        self.update_listeners.borrow().len() + self.error_listeners.borrow().len()
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.borrow().clone()
    }

    /// Number of purchase requests received.
    pub fn purchase_requests(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, StubCall::RequestPurchase(_)))
            .count()
    }

    /// Deliver a transaction to every registered update listener.
    pub fn emit_purchase(&self, purchase: Purchase) {
        for (_, callback) in self.update_listeners.borrow().iter() {
            callback(purchase.clone());
        }
    }

    /// Deliver an error to every registered error listener.
    pub fn emit_error(&self, error: StoreErrorInfo) {
        for (_, callback) in self.error_listeners.borrow().iter() {
            callback(error.clone());
        }
    }

    /// A purchase of `product_id` as the stub would deliver it.
    pub fn make_purchase(product_id: &str, with_receipt: bool) -> Purchase {
        let transaction_id = Uuid::new_v4().to_string();
        Purchase {
            product_id: product_id.to_owned(),
            transaction_receipt: if with_receipt {
                format!("stub-receipt-{transaction_id}")
            } else {
                String::new()
            },
            transaction_id,
            transaction_date: Utc::now(),
            original_json: None,
        }
    }

    fn record(&self, call: StubCall) {
        self.calls.borrow_mut().push(call);
    }

    fn ensure_connected(&self, operation: &str) -> Result<()> {
        if self.connected.get() {
            Ok(())
        } else {
            tracing::warn!(operation, "stub store called without a connection");
            Err(KassaError::Connection(format!("{operation}: not connected")))
        }
    }

    fn hygiene(&self, operation: &str) -> Result<()> {
        self.ensure_connected(operation)?;
        match self.hygiene_failure.borrow().clone() {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> ListenerId {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        ListenerId(id)
    }
}

impl PurchaseStore for StubStore {
    async fn init_connection(&self) -> Result<()> {
        self.record(StubCall::InitConnection);
        if let Some(message) = self.init_failure.borrow().clone() {
            return Err(KassaError::Connection(message));
        }
        self.connected.set(true);
        Ok(())
    }

    async fn flush_failed_purchases_cached_as_pending(&self) -> Result<()> {
        self.record(StubCall::FlushFailedPending);
        self.hygiene("flush_failed_purchases_cached_as_pending")
    }

    async fn clear_transactions(&self) -> Result<()> {
        self.record(StubCall::ClearTransactions);
        self.hygiene("clear_transactions")
    }

    async fn products(&self, skus: &[String]) -> Result<Vec<Product>> {
        self.record(StubCall::Products(skus.to_vec()));
        self.ensure_connected("products")?;
        Ok(self
            .catalog
            .borrow()
            .iter()
            .filter(|product| skus.contains(&product.product_id))
            .cloned()
            .collect())
    }

    async fn request_purchase(&self, request: PurchaseRequest) -> Result<()> {
        self.record(StubCall::RequestPurchase(request.clone()));
        self.ensure_connected("request_purchase")?;

        let Some(sku) = request.skus().first().map(|s| s.to_string()) else {
            return Err(KassaError::store("E_DEVELOPER_ERROR", "empty purchase request"));
        };
        let outcome = self.outcome.borrow().clone();
        match outcome {
            StubOutcome::Complete => self.emit_purchase(Self::make_purchase(&sku, true)),
            StubOutcome::Deferred => self.emit_purchase(Self::make_purchase(&sku, false)),
            StubOutcome::Fail(error) => self.emit_error(error),
            StubOutcome::Reject(error) => return Err(error.into()),
            StubOutcome::Pend => {}
        }
        Ok(())
    }

    async fn finish_transaction(&self, purchase: &Purchase) -> Result<()> {
        self.record(StubCall::FinishTransaction(purchase.transaction_id.clone()));
        self.ensure_connected("finish_transaction")?;
        match self.finish_failure.borrow().clone() {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    async fn end_connection(&self) -> Result<()> {
        self.record(StubCall::EndConnection);
        let active = self.listener_count();
        self.connected.set(false);
        if active > 0 {
            tracing::warn!(active, "store connection closed with listeners still registered");
            return Err(KassaError::Bridge(format!(
                "{active} listener(s) still registered at end_connection"
            )));
        }
        Ok(())
    }

    fn add_purchase_updated_listener(&self, callback: PurchaseUpdatedCallback) -> ListenerId {
        let id = self.next_id();
        self.record(StubCall::AddListener(id));
        self.update_listeners.borrow_mut().push((id, callback));
        id
    }

    fn add_purchase_error_listener(&self, callback: PurchaseErrorCallback) -> ListenerId {
        let id = self.next_id();
        self.record(StubCall::AddListener(id));
        self.error_listeners.borrow_mut().push((id, callback));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.record(StubCall::RemoveListener(id));
        self.update_listeners.borrow_mut().retain(|(l, _)| *l != id);
        self.error_listeners.borrow_mut().retain(|(l, _)| *l != id);
    }
}
