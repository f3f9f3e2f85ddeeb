// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host-side surfaces the bridge drives: the embedded web document and the
// native shell around it.

use crate::ad::AdBanner;

/// The embedded web document.
pub trait WebDocument {
    /// Deliver one text message to the document (`postMessage`).
    fn post_message(&self, text: &str);

    /// Navigate back within the document's own history.
    fn go_back(&self);
}

/// The native shell hosting the document.
pub trait HostShell {
    /// Present a native alert.
    fn show_alert(&self, message: &str);

    /// Mount the banner surface (`Some`) or unmount it (`None`).
    fn update_banner(&self, banner: Option<&AdBanner>);
}
