// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Purchase gateway — owns the store connection and the transaction lifecycle.
//
// The gateway is cheap to clone (everything is `Rc`-shared) so purchase and
// finalization flows can run as local tasks while the host loop keeps
// handling events. Listener registrations are handed out as a `ListenerPair`
// owned by the caller; closing the connection requires giving that pair back,
// so listeners are always disposed before the connection goes away.

use std::rc::Rc;

use tracing::{debug, error, info, instrument, warn};

use kassa_core::error::{KassaError, Result};
use kassa_core::types::{Platform, Purchase, StoreErrorInfo};
use kassa_store::{ListenerId, PlatformPurchases, PurchaseStore, StartupHygiene};

/// Log a failure the way every gateway operation does: store errors with
/// their code/message pair, everything else with the operation name.
pub(crate) fn log_failure(operation: &'static str, err: &KassaError) {
    match err.store_error() {
        Some(StoreErrorInfo { code, message }) => {
            error!(operation, %code, reason = %message, "store reported an error");
        }
        None => error!(operation, error = %err, "operation failed"),
    }
}

/// The active "purchase updated" and "purchase error" subscriptions.
///
/// Dropping the pair removes both listeners from the store.
#[must_use = "dropping a ListenerPair unregisters its listeners"]
pub struct ListenerPair<S: PurchaseStore> {
    store: Rc<S>,
    update: ListenerId,
    error: ListenerId,
}

impl<S: PurchaseStore> ListenerPair<S> {
    /// Unregister both listeners.
    pub fn dispose(self) {
        drop(self);
    }

    pub fn ids(&self) -> (ListenerId, ListenerId) {
        (self.update, self.error)
    }
}

impl<S: PurchaseStore> Drop for ListenerPair<S> {
    fn drop(&mut self) {
        self.store.remove_listener(self.update);
        self.store.remove_listener(self.error);
        debug!("purchase listeners disposed");
    }
}

/// Native-side owner of the store connection.
pub struct PurchaseGateway<S: PurchaseStore> {
    store: Rc<S>,
    platform: Rc<dyn PlatformPurchases>,
}

impl<S: PurchaseStore> Clone for PurchaseGateway<S> {
    fn clone(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
            platform: Rc::clone(&self.platform),
        }
    }
}

impl<S: PurchaseStore + 'static> PurchaseGateway<S> {
    pub fn new(store: Rc<S>, platform: Box<dyn PlatformPurchases>) -> Self {
        Self {
            store,
            platform: Rc::from(platform),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform.platform()
    }

    /// Open the store connection and clean up what a previous session left
    /// behind.
    ///
    /// Errors are logged here; callers treat them as non-fatal and keep the
    /// bridge running for the other intents.
    #[instrument(skip_all, fields(platform = %self.platform()))]
    pub async fn initialize(&self) -> Result<()> {
        if let Err(e) = self.store.init_connection().await {
            log_failure("init_connection", &e);
            return Err(e);
        }

        let hygiene = match self.platform.startup_hygiene() {
            StartupHygiene::FlushFailedPending => Some((
                "flush_failed_purchases_cached_as_pending",
                self.store.flush_failed_purchases_cached_as_pending().await,
            )),
            StartupHygiene::ClearTransactions => {
                Some(("clear_transactions", self.store.clear_transactions().await))
            }
            StartupHygiene::Nothing => None,
        };
        if let Some((operation, Err(e))) = hygiene {
            // The connection itself is up; stale transactions will simply be
            // redelivered to the listeners.
            log_failure(operation, &e);
        }

        info!("store connection ready");
        Ok(())
    }

    /// Subscribe to transaction updates and purchase errors.
    pub fn register_listeners<U, E>(&self, on_update: U, on_error: E) -> ListenerPair<S>
    where
        U: Fn(Purchase) + 'static,
        E: Fn(StoreErrorInfo) + 'static,
    {
        let update = self.store.add_purchase_updated_listener(Box::new(on_update));
        let error = self.store.add_purchase_error_listener(Box::new(on_error));
        debug!(?update, ?error, "purchase listeners registered");
        ListenerPair {
            store: Rc::clone(&self.store),
            update,
            error,
        }
    }

    /// Resolve `product_id` against the live catalog and start the purchase.
    ///
    /// Unknown products yield `ProductNotFound` without contacting the
    /// purchase flow. The outcome of an issued request arrives through the
    /// listeners.
    #[instrument(skip(self))]
    pub async fn request_purchase(&self, product_id: &str) -> Result<()> {
        let products = self.store.products(&[product_id.to_owned()]).await?;
        let Some(product) = products.into_iter().find(|p| p.product_id == product_id) else {
            warn!("product not in store catalog");
            return Err(KassaError::ProductNotFound(product_id.to_owned()));
        };

        let request = self.platform.purchase_request(&product);
        debug!(?request, "issuing purchase request");
        self.store.request_purchase(request).await
    }

    /// Acknowledge a transaction so the store stops redelivering it.
    #[instrument(skip_all, fields(product_id = %purchase.product_id, transaction_id = %purchase.transaction_id))]
    pub async fn finalize_transaction(&self, purchase: &Purchase) -> Result<()> {
        if purchase.receipt().is_none() {
            return Err(KassaError::Bridge(format!(
                "transaction {} has no receipt to finalize",
                purchase.transaction_id
            )));
        }
        self.store
            .finish_transaction(purchase)
            .await
            .map_err(|e| KassaError::Finalize {
                transaction_id: purchase.transaction_id.clone(),
                source: Box::new(e),
            })?;
        info!("transaction finalized");
        Ok(())
    }

    /// Dispose the listener pair, then close the store connection.
    pub async fn teardown(&self, listeners: ListenerPair<S>) -> Result<()> {
        listeners.dispose();
        self.store.end_connection().await.inspect_err(|e| log_failure("end_connection", e))?;
        info!("store connection closed");
        Ok(())
    }
}
