// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kassa Protocol — the `{intent, content}` envelope exchanged over the single
// duplex text channel between the embedded web document and the native host,
// and the typed messages carried in each direction.

pub mod envelope;
pub mod message;

pub use envelope::{DecodeError, Envelope};
pub use message::{Inbound, Outbound, PaymentContent};

/// Intent tags understood on the wire.
pub mod intent {
    /// web → native: start a purchase; native → web: purchase finalized.
    pub const PAYMENT: &str = "payment";
    /// web → native: toggle the promotional banner.
    pub const AD: &str = "ad";
    /// web → native: diagnostic alert.
    pub const TEST: &str = "test";
    /// native → web: host platform name, sent after the initial load.
    pub const PLATFORM: &str = "platform";
    /// native → web: a purchase attempt or its finalization failed.
    pub const PURCHASE_ERROR: &str = "purchase_error";
}
