// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android purchase capability (Google Play Billing).
//
// Play Billing purchase flows take a list of SKUs, and failed purchases can
// linger in the billing cache as "pending" across sessions, so they are
// flushed when the connection opens.

use kassa_core::types::{Platform, Product, PurchaseRequest};

use crate::traits::{PlatformPurchases, StartupHygiene};

/// Android implementation of the purchase capability.
pub struct AndroidPurchases;

impl PlatformPurchases for AndroidPurchases {
    fn platform(&self) -> Platform {
        Platform::Android
    }

    fn purchase_request(&self, product: &Product) -> PurchaseRequest {
        PurchaseRequest::Skus {
            skus: vec![product.product_id.clone()],
        }
    }

    fn startup_hygiene(&self) -> StartupHygiene {
        StartupHygiene::FlushFailedPending
    }
}
