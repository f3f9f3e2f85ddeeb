// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge router — dispatches decoded web messages to the purchase gateway,
// the ad controller, or the shell, and turns native events into outbound
// envelopes.
//
// Nothing here blocks: the ad flag and alerts complete within the turn, and
// purchases run as local tasks that report back as `Continuation`s.
// Outbound messages are held until the document's initial load completes so
// the `platform` message is always the first thing the document receives.

use std::collections::VecDeque;
use std::rc::Rc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use kassa_core::error::KassaError;
use kassa_core::types::{Purchase, StoreErrorInfo};
use kassa_protocol::{DecodeError, Inbound, Outbound};
use kassa_store::PurchaseStore;

use crate::ad::AdVisibilityController;
use crate::attempts::{Admission, PurchaseAttempts, Resolution};
use crate::gateway::{PurchaseGateway, log_failure};
use crate::shell::{HostShell, WebDocument};

/// Results of asynchronous store work, fed back into the host loop.
#[derive(Debug)]
pub enum Continuation {
    /// A listener delivered a transaction.
    PurchaseUpdated(Purchase),
    /// A listener delivered a purchase failure.
    PurchaseFailed(StoreErrorInfo),
    /// The purchase request failed before the store took it.
    RequestFailed { product_id: String, error: KassaError },
    Finalized(Purchase),
    FinalizeFailed { purchase: Purchase, error: KassaError },
}

/// Routes envelopes between the web document and the native capabilities.
pub struct BridgeRouter<S: PurchaseStore, W: WebDocument> {
    gateway: PurchaseGateway<S>,
    document: Rc<W>,
    shell: Box<dyn HostShell>,
    ads: AdVisibilityController,
    attempts: PurchaseAttempts,
    continuations: mpsc::UnboundedSender<Continuation>,
    loaded: bool,
    held: VecDeque<Outbound>,
}

impl<S: PurchaseStore + 'static, W: WebDocument> BridgeRouter<S, W> {
    pub fn new(
        gateway: PurchaseGateway<S>,
        document: Rc<W>,
        shell: Box<dyn HostShell>,
        ads: AdVisibilityController,
        continuations: mpsc::UnboundedSender<Continuation>,
    ) -> Self {
        Self {
            gateway,
            document,
            shell,
            ads,
            attempts: PurchaseAttempts::new(),
            continuations,
            loaded: false,
            held: VecDeque::new(),
        }
    }

    pub fn ads(&self) -> &AdVisibilityController {
        &self.ads
    }

    pub fn attempts(&self) -> &PurchaseAttempts {
        &self.attempts
    }

    /// Mount the banner surface in its initial state.
    pub fn render_banner(&self) {
        self.shell.update_banner(self.ads.banner());
    }

    /// Handle one text message from the web document.
    ///
    /// Undecodable messages and unknown intents are dropped.
    pub fn handle_web_message(&mut self, text: &str) {
        let message = match Inbound::decode(text) {
            Ok(message) => message,
            Err(DecodeError::UnknownIntent(intent)) => {
                debug!(%intent, "ignoring unknown intent");
                return;
            }
            Err(e) => {
                debug!(error = %e, "dropping undecodable message");
                return;
            }
        };

        match message {
            Inbound::Payment { product_id } => {
                info!(%product_id, "purchase requested by document");
                match self.attempts.request(product_id.clone()) {
                    Admission::Start(next) => self.start_purchase(next),
                    Admission::Queued => {
                        debug!(queued = self.attempts.queued(), "purchase queued behind outstanding attempt")
                    }
                    Admission::Duplicate => {
                        warn!(%product_id, "purchase already in progress; request refused");
                        self.send(Outbound::PurchaseError(None));
                    }
                    Admission::Full => {
                        warn!(%product_id, "too many purchases waiting; request refused");
                        self.send(Outbound::PurchaseError(None));
                    }
                }
            }
            Inbound::Ad { visible } => {
                if self.ads.set_visible(visible) {
                    debug!(visible, "ad visibility changed");
                    self.shell.update_banner(self.ads.banner());
                }
            }
            Inbound::Test { message } => self.shell.show_alert(&message),
        }
    }

    /// The document finished loading. The first completion announces the
    /// platform and releases anything held back until then.
    pub fn handle_load_end(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        self.post(&Outbound::Platform(self.gateway.platform()));
        while let Some(message) = self.held.pop_front() {
            self.post(&message);
        }
    }

    pub fn handle_continuation(&mut self, continuation: Continuation) {
        match continuation {
            Continuation::PurchaseUpdated(purchase) => self.on_purchase_updated(purchase),
            Continuation::PurchaseFailed(info) => {
                error!(code = %info.code, reason = %info.message, "purchase failed");
                match self.attempts.store_error() {
                    Resolution::Resolved { next } => {
                        self.send(Outbound::PurchaseError(Some(info)));
                        self.start_next(next);
                    }
                    Resolution::Unsolicited => self.send(Outbound::PurchaseError(Some(info))),
                    Resolution::Unrelated => {
                        warn!(code = %info.code, "store error while a transaction is finalizing");
                        self.send(Outbound::PurchaseError(Some(info)));
                    }
                }
            }
            Continuation::RequestFailed { product_id, error } => {
                log_failure("request_purchase", &error);
                let resolution = self.attempts.request_failed(&product_id);
                self.send(Outbound::PurchaseError(error.store_error()));
                if let Resolution::Resolved { next } = resolution {
                    self.start_next(next);
                }
            }
            Continuation::Finalized(purchase) => {
                let resolution = self.attempts.finalized(&purchase.transaction_id, true);
                let platform = self.gateway.platform();
                self.send(Outbound::payment(purchase, platform));
                if let Resolution::Resolved { next } = resolution {
                    self.start_next(next);
                }
            }
            Continuation::FinalizeFailed { purchase, error } => {
                // The store keeps the transaction pending and redelivers it
                // on the next listener registration.
                error!(
                    product_id = %purchase.product_id,
                    transaction_id = %purchase.transaction_id,
                    transaction_date = %purchase.transaction_date,
                    error = %error,
                    "finalization failed; transaction left pending at the store"
                );
                let resolution = self.attempts.finalized(&purchase.transaction_id, false);
                self.send(Outbound::PurchaseError(error.store_error()));
                if let Resolution::Resolved { next } = resolution {
                    self.start_next(next);
                }
            }
        }
    }

    fn on_purchase_updated(&mut self, purchase: Purchase) {
        if purchase.receipt().is_none() {
            debug!(
                product_id = %purchase.product_id,
                transaction_id = %purchase.transaction_id,
                "transaction without receipt; waiting for the store"
            );
            if let Resolution::Resolved { next } = self.attempts.deferred(&purchase) {
                info!(product_id = %purchase.product_id, "purchase deferred by the store");
                self.start_next(next);
            }
            return;
        }
        if !self.attempts.claim_update(&purchase) {
            info!(
                product_id = %purchase.product_id,
                transaction_id = %purchase.transaction_id,
                "finalizing unsolicited transaction"
            );
        }

        let gateway = self.gateway.clone();
        let continuations = self.continuations.clone();
        tokio::task::spawn_local(async move {
            let continuation = match gateway.finalize_transaction(&purchase).await {
                Ok(()) => Continuation::Finalized(purchase),
                Err(error) => Continuation::FinalizeFailed { purchase, error },
            };
            if continuations.send(continuation).is_err() {
                debug!("host loop gone; finalization result dropped");
            }
        });
    }

    fn start_next(&mut self, next: Option<String>) {
        if let Some(product_id) = next {
            self.start_purchase(product_id);
        }
    }

    fn start_purchase(&mut self, product_id: String) {
        let gateway = self.gateway.clone();
        let continuations = self.continuations.clone();
        tokio::task::spawn_local(async move {
            if let Err(error) = gateway.request_purchase(&product_id).await {
                if continuations
                    .send(Continuation::RequestFailed { product_id, error })
                    .is_err()
                {
                    debug!("host loop gone; purchase failure dropped");
                }
            }
        });
    }

    /// Queue or post one outbound message.
    fn send(&mut self, message: Outbound) {
        if self.loaded {
            self.post(&message);
        } else {
            self.held.push_back(message);
        }
    }

    fn post(&self, message: &Outbound) {
        match message.encode() {
            Ok(text) => self.document.post_message(&text),
            Err(e) => error!(intent = message.intent(), error = %e, "failed to encode outbound message"),
        }
    }
}
