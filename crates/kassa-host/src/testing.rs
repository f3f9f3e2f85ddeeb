// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles for the host surfaces.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::ad::AdBanner;
use crate::shell::{HostShell, WebDocument};

/// Document that forwards every posted message to a channel.
pub(crate) struct ChannelDocument {
    sent: mpsc::UnboundedSender<String>,
    back: Cell<u32>,
}

impl ChannelDocument {
    pub(crate) fn new() -> (Rc<Self>, mpsc::UnboundedReceiver<String>) {
        let (sent, rx) = mpsc::unbounded_channel();
        (
            Rc::new(Self {
                sent,
                back: Cell::new(0),
            }),
            rx,
        )
    }

    pub(crate) fn back_count(&self) -> u32 {
        self.back.get()
    }
}

impl WebDocument for ChannelDocument {
    fn post_message(&self, text: &str) {
        let _ = self.sent.send(text.to_owned());
    }

    fn go_back(&self) {
        self.back.set(self.back.get() + 1);
    }
}

/// Shell that records alerts and banner changes.
#[derive(Clone, Default)]
pub(crate) struct RecordingShell {
    pub(crate) alerts: Rc<RefCell<Vec<String>>>,
    pub(crate) banners: Rc<RefCell<Vec<Option<AdBanner>>>>,
}

impl HostShell for RecordingShell {
    fn show_alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_owned());
    }

    fn update_banner(&self, banner: Option<&AdBanner>) {
        self.banners.borrow_mut().push(banner.cloned());
    }
}

/// Wait for the next message posted to the document.
pub(crate) async fn next_message(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for an outbound message")
        .expect("document channel closed")
}
