// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kassa Host — the native side of the bridge. Owns the store connection and
// its listener pair, routes envelopes between the embedded web document and
// the native capabilities, and intercepts the hardware back signal.

pub mod ad;
pub mod attempts;
pub mod gateway;
pub mod navigation;
pub mod router;
pub mod screen;
pub mod shell;

#[cfg(test)]
pub(crate) mod testing;

pub use ad::{AdBanner, AdVisibilityController};
pub use gateway::{ListenerPair, PurchaseGateway};
pub use navigation::NavigationController;
pub use router::BridgeRouter;
pub use screen::{HostEvent, Screen, ScreenHandle};
pub use shell::{HostShell, WebDocument};
