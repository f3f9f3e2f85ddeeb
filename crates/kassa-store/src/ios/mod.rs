// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS purchase capability (StoreKit).
//
// StoreKit purchases a single product per request. Transactions left
// unfinished by an earlier session are cleared on start so they are not
// replayed into a fresh listener pair.

use kassa_core::types::{Platform, Product, PurchaseRequest};

use crate::traits::{PlatformPurchases, StartupHygiene};

/// iOS implementation of the purchase capability.
pub struct IosPurchases;

impl PlatformPurchases for IosPurchases {
    fn platform(&self) -> Platform {
        Platform::Ios
    }

    fn purchase_request(&self, product: &Product) -> PurchaseRequest {
        PurchaseRequest::Sku {
            sku: product.product_id.clone(),
        }
    }

    fn startup_hygiene(&self) -> StartupHygiene {
        StartupHygiene::ClearTransactions
    }
}
