// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Kassa — Native store abstractions.
//!
//! Defines the store connection the host talks to (`PurchaseStore`) and the
//! per-platform purchase capability (`PlatformPurchases`) that decides how a
//! purchase request is shaped and how a session is cleaned up on start.
//! The platform implementation is picked once at startup.

pub mod android;
pub mod ios;
pub mod stub;
pub mod traits;

use kassa_core::types::Platform;

pub use stub::StubStore;
pub use traits::{ListenerId, PlatformPurchases, PurchaseStore, StartupHygiene};

/// Selects the purchase capability for the given platform.
///
/// RETURNS: A boxed trait object so call sites never branch on platform.
pub fn platform_purchases(platform: Platform) -> Box<dyn PlatformPurchases> {
    match platform {
        // Google Play Billing takes a SKU list.
        Platform::Android => Box::new(android::AndroidPurchases),
        // StoreKit takes a single SKU.
        Platform::Ios => Box::new(ios::IosPurchases),
        // DESKTOP/CI: pairs with the in-memory stub store.
        Platform::Other => Box::new(stub::StubPurchases),
    }
}
