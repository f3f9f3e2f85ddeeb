// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native store.
//
// The host runs a single-threaded event loop, so none of these futures or
// callbacks need to be `Send`.

use kassa_core::error::Result;
use kassa_core::types::{Platform, Product, Purchase, PurchaseRequest, StoreErrorInfo};

/// Callback fired once per completed or restored transaction.
pub type PurchaseUpdatedCallback = Box<dyn Fn(Purchase)>;

/// Callback fired once per failed or cancelled purchase attempt.
pub type PurchaseErrorCallback = Box<dyn Fn(StoreErrorInfo)>;

/// Handle to one registered store listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Connection to the platform's in-app purchase service.
///
/// Listeners must be removed before `end_connection` is called.
#[allow(async_fn_in_trait)]
pub trait PurchaseStore {
    /// Open the store connection.
    async fn init_connection(&self) -> Result<()>;

    /// Android: drop failed purchases the billing cache still reports as pending.
    async fn flush_failed_purchases_cached_as_pending(&self) -> Result<()>;

    /// iOS: clear transactions left unfinished by a previous session.
    async fn clear_transactions(&self) -> Result<()>;

    /// Look up products in the store's live catalog. Unknown SKUs are
    /// simply absent from the result.
    async fn products(&self, skus: &[String]) -> Result<Vec<Product>>;

    /// Start a purchase. The outcome arrives later through the listeners.
    async fn request_purchase(&self, request: PurchaseRequest) -> Result<()>;

    /// Acknowledge a transaction so the store stops redelivering it.
    async fn finish_transaction(&self, purchase: &Purchase) -> Result<()>;

    /// Close the store connection.
    async fn end_connection(&self) -> Result<()>;

    fn add_purchase_updated_listener(&self, callback: PurchaseUpdatedCallback) -> ListenerId;

    fn add_purchase_error_listener(&self, callback: PurchaseErrorCallback) -> ListenerId;

    /// Unregister a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}

/// Session cleanup a platform needs right after the connection opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupHygiene {
    FlushFailedPending,
    ClearTransactions,
    Nothing,
}

/// Per-platform purchase behaviour, selected once at startup.
pub trait PlatformPurchases {
    fn platform(&self) -> Platform;

    /// Shape the store request for a resolved catalog product.
    fn purchase_request(&self, product: &Product) -> PurchaseRequest;

    fn startup_hygiene(&self) -> StartupHygiene;
}
