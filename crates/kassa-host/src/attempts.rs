// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Purchase attempt serialisation.
//
// Outbound purchase messages carry no correlation id, so only one attempt is
// outstanding at a time. Further requests wait in FIFO order and start once
// the outstanding attempt reaches a terminal state or the store defers it.
// The wait list is bounded and holds each product at most once.

use std::collections::VecDeque;

use tracing::warn;

use kassa_core::types::{Purchase, PurchaseState};

/// The outstanding purchase attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub product_id: String,
    pub state: PurchaseState,
    /// Set once a transaction has been claimed for finalization.
    pub transaction_id: Option<String>,
}

impl Attempt {
    fn requested(product_id: String) -> Self {
        Self {
            product_id,
            state: PurchaseState::Requested,
            transaction_id: None,
        }
    }

    fn advance(&mut self, next: PurchaseState) {
        if !self.state.can_transition_to(next) {
            warn!(
                product_id = %self.product_id,
                from = ?self.state,
                to = ?next,
                "illegal purchase state transition"
            );
        }
        self.state = next;
    }
}

/// Most requests that may wait behind the outstanding attempt.
pub const MAX_QUEUED: usize = 4;

/// What happened to a new purchase request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The pipeline was idle; start this product now.
    Start(String),
    /// Waiting behind the outstanding attempt.
    Queued,
    /// The product is already outstanding or waiting.
    Duplicate,
    /// The wait list is full.
    Full,
}

/// How a store event relates to the outstanding attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The event ended the outstanding attempt; `next` should start now.
    Resolved { next: Option<String> },
    /// No attempt is outstanding (restored or redelivered transaction).
    Unsolicited,
    /// An attempt is outstanding but the event does not belong to it.
    Unrelated,
}

/// Queue of purchase requests with at most one attempt in flight.
#[derive(Debug, Default)]
pub struct PurchaseAttempts {
    current: Option<Attempt>,
    queued: VecDeque<String>,
}

impl PurchaseAttempts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Attempt> {
        self.current.as_ref()
    }

    pub fn queued(&self) -> usize {
        self.queued.len()
    }

    /// Admit a request into the pipeline.
    pub fn request(&mut self, product_id: String) -> Admission {
        let outstanding = self.current.as_ref().map(|attempt| attempt.product_id.as_str());
        if outstanding == Some(product_id.as_str()) || self.queued.contains(&product_id) {
            return Admission::Duplicate;
        }
        if self.queued.len() >= MAX_QUEUED {
            return Admission::Full;
        }
        self.queued.push_back(product_id);
        match self.start_next() {
            Some(product_id) => Admission::Start(product_id),
            None => Admission::Queued,
        }
    }

    /// Claim a delivered transaction for the outstanding attempt.
    ///
    /// Succeeds only while the attempt is `Requested` and the product
    /// matches; the attempt then moves to `Finalizing`.
    pub fn claim_update(&mut self, purchase: &Purchase) -> bool {
        match self.current.as_mut() {
            Some(attempt)
                if attempt.state == PurchaseState::Requested
                    && attempt.product_id == purchase.product_id =>
            {
                attempt.advance(PurchaseState::Updated);
                attempt.advance(PurchaseState::Finalizing);
                attempt.transaction_id = Some(purchase.transaction_id.clone());
                true
            }
            _ => false,
        }
    }

    /// The store parked the outstanding attempt (deferred or ask-to-buy,
    /// delivered without a receipt). The attempt is released so waiting
    /// requests can proceed; its transaction arrives later as unsolicited.
    pub fn deferred(&mut self, purchase: &Purchase) -> Resolution {
        match self.current.as_mut() {
            None => Resolution::Unsolicited,
            Some(attempt)
                if attempt.state == PurchaseState::Requested
                    && attempt.product_id == purchase.product_id =>
            {
                attempt.advance(PurchaseState::Updated);
                self.finish()
            }
            Some(_) => Resolution::Unrelated,
        }
    }

    /// The request for `product_id` failed before reaching the store's
    /// listeners (unknown product, rejected call).
    pub fn request_failed(&mut self, product_id: &str) -> Resolution {
        match self.current.as_mut() {
            None => Resolution::Unsolicited,
            Some(attempt)
                if attempt.state == PurchaseState::Requested && attempt.product_id == product_id =>
            {
                attempt.advance(PurchaseState::Errored);
                self.finish()
            }
            Some(_) => Resolution::Unrelated,
        }
    }

    /// The store reported a failed or cancelled purchase.
    pub fn store_error(&mut self) -> Resolution {
        match self.current.as_mut() {
            None => Resolution::Unsolicited,
            Some(attempt) if attempt.state == PurchaseState::Requested => {
                attempt.advance(PurchaseState::Errored);
                self.finish()
            }
            Some(_) => Resolution::Unrelated,
        }
    }

    /// Finalization of `transaction_id` completed.
    pub fn finalized(&mut self, transaction_id: &str, success: bool) -> Resolution {
        match self.current.as_mut() {
            None => Resolution::Unsolicited,
            Some(attempt)
                if attempt.state == PurchaseState::Finalizing
                    && attempt.transaction_id.as_deref() == Some(transaction_id) =>
            {
                attempt.advance(if success {
                    PurchaseState::Finalized
                } else {
                    PurchaseState::FinalizeFailed
                });
                self.finish()
            }
            Some(_) => Resolution::Unrelated,
        }
    }

    fn finish(&mut self) -> Resolution {
        self.current = None;
        Resolution::Resolved {
            next: self.start_next(),
        }
    }

    fn start_next(&mut self) -> Option<String> {
        if self.current.is_some() {
            return None;
        }
        let product_id = self.queued.pop_front()?;
        self.current = Some(Attempt::requested(product_id.clone()));
        Some(product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassa_store::StubStore;

    fn purchase(product_id: &str, transaction_id: &str) -> Purchase {
        let mut purchase = StubStore::make_purchase(product_id, true);
        purchase.transaction_id = transaction_id.to_owned();
        purchase
    }

    #[test]
    fn first_request_starts_immediately() {
        let mut attempts = PurchaseAttempts::new();
        assert_eq!(
            attempts.request("coins_100".into()),
            Admission::Start("coins_100".into())
        );
        assert_eq!(attempts.current().unwrap().state, PurchaseState::Requested);
    }

    #[test]
    fn second_request_waits_for_the_first() {
        let mut attempts = PurchaseAttempts::new();
        attempts.request("coins_100".into());
        assert_eq!(attempts.request("remove_ads".into()), Admission::Queued);
        assert_eq!(attempts.queued(), 1);

        assert_eq!(
            attempts.store_error(),
            Resolution::Resolved { next: Some("remove_ads".into()) }
        );
        assert_eq!(attempts.current().unwrap().product_id, "remove_ads");
    }

    #[test]
    fn repeated_product_is_not_queued_twice() {
        let mut attempts = PurchaseAttempts::new();
        attempts.request("coins_100".into());
        assert_eq!(attempts.request("coins_100".into()), Admission::Duplicate);

        attempts.request("remove_ads".into());
        assert_eq!(attempts.request("remove_ads".into()), Admission::Duplicate);
        assert_eq!(attempts.queued(), 1);
    }

    #[test]
    fn wait_list_is_bounded() {
        let mut attempts = PurchaseAttempts::new();
        attempts.request("coins_100".into());
        for n in 0..MAX_QUEUED {
            assert_eq!(attempts.request(format!("sku_{n}")), Admission::Queued);
        }
        assert_eq!(attempts.request("one_too_many".into()), Admission::Full);
        assert_eq!(attempts.queued(), MAX_QUEUED);
    }

    #[test]
    fn deferral_releases_the_pipeline() {
        let mut attempts = PurchaseAttempts::new();
        attempts.request("coins_100".into());
        attempts.request("remove_ads".into());

        let parked = StubStore::make_purchase("coins_100", false);
        assert_eq!(
            attempts.deferred(&parked),
            Resolution::Resolved { next: Some("remove_ads".into()) }
        );
        assert_eq!(attempts.deferred(&parked), Resolution::Unrelated);
    }

    #[test]
    fn update_then_finalize_resolves() {
        let mut attempts = PurchaseAttempts::new();
        attempts.request("coins_100".into());

        assert!(attempts.claim_update(&purchase("coins_100", "t-1")));
        assert_eq!(attempts.current().unwrap().state, PurchaseState::Finalizing);

        assert_eq!(attempts.finalized("t-2", true), Resolution::Unrelated);
        assert_eq!(attempts.finalized("t-1", true), Resolution::Resolved { next: None });
        assert!(attempts.current().is_none());
    }

    #[test]
    fn update_for_other_product_is_not_claimed() {
        let mut attempts = PurchaseAttempts::new();
        attempts.request("coins_100".into());
        assert!(!attempts.claim_update(&purchase("remove_ads", "t-9")));
        assert_eq!(attempts.current().unwrap().state, PurchaseState::Requested);
    }

    #[test]
    fn store_error_while_finalizing_is_unrelated() {
        let mut attempts = PurchaseAttempts::new();
        attempts.request("coins_100".into());
        attempts.claim_update(&purchase("coins_100", "t-1"));
        assert_eq!(attempts.store_error(), Resolution::Unrelated);
    }

    #[test]
    fn events_without_attempt_are_unsolicited() {
        let mut attempts = PurchaseAttempts::new();
        assert_eq!(attempts.store_error(), Resolution::Unsolicited);
        assert_eq!(attempts.finalized("t-1", false), Resolution::Unsolicited);
        assert_eq!(attempts.request_failed("coins_100"), Resolution::Unsolicited);
    }

    #[test]
    fn request_failure_resolves_matching_attempt() {
        let mut attempts = PurchaseAttempts::new();
        attempts.request("sku_missing".into());
        assert_eq!(
            attempts.request_failed("sku_missing"),
            Resolution::Resolved { next: None }
        );
    }
}
