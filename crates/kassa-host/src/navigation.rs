// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Navigation / back controller.
//
// The latest navigation snapshot lives in a `watch` channel. The back
// handler reads it at the moment the signal arrives, so it never acts on a
// snapshot captured when the handler was installed.

use tokio::sync::watch;
use tracing::debug;

use kassa_core::types::NavigationState;

use crate::shell::WebDocument;

/// Tracks the document's navigation state and answers the hardware back
/// signal.
pub struct NavigationController {
    state: watch::Sender<NavigationState>,
}

impl NavigationController {
    pub fn new() -> Self {
        let (state, _) = watch::channel(NavigationState::default());
        Self { state }
    }

    /// Record a navigation event from the document.
    pub fn observe(&self, next: NavigationState) {
        let previous = self.state.send_replace(next);
        let can_go_back = self.state.borrow().can_go_back;
        if previous.can_go_back != can_go_back {
            debug!(can_go_back, "back history changed");
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.state.borrow().can_go_back
    }

    /// Handle the hardware back signal.
    ///
    /// Returns `true` (handled, suppress the host default such as exiting)
    /// after navigating the document back when it has back history;
    /// `false` otherwise, without touching the document.
    pub fn handle_back_signal<W: WebDocument + ?Sized>(&self, document: &W) -> bool {
        if self.can_go_back() {
            document.go_back();
            true
        } else {
            false
        }
    }
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ChannelDocument;

    #[test]
    fn back_with_history_navigates_document() {
        let (document, _rx) = ChannelDocument::new();
        let navigation = NavigationController::new();
        navigation.observe(NavigationState::with_back(true));

        assert!(navigation.handle_back_signal(&*document));
        assert_eq!(document.back_count(), 1);
    }

    #[test]
    fn back_without_history_is_not_handled() {
        let (document, _rx) = ChannelDocument::new();
        let navigation = NavigationController::new();

        assert!(!navigation.handle_back_signal(&*document));
        assert_eq!(document.back_count(), 0);
    }

    #[test]
    fn handler_follows_latest_snapshot() {
        let (document, _rx) = ChannelDocument::new();
        let navigation = NavigationController::new();

        navigation.observe(NavigationState::with_back(true));
        navigation.observe(NavigationState::with_back(false));
        assert!(!navigation.handle_back_signal(&*document));

        navigation.observe(NavigationState::with_back(true));
        assert!(navigation.handle_back_signal(&*document));
        assert_eq!(document.back_count(), 1);
    }
}
