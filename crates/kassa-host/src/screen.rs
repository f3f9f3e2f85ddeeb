// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host screen — the event loop around the bridge.
//
// Every input (document messages, load/navigation events, the back signal,
// store callbacks, results of store calls) becomes one turn of a single
// loop. Store listeners only enqueue; store calls run as local tasks and
// come back as continuations. The screen owns the listener pair and gives it
// back to the gateway on unmount, which disposes it before closing the
// connection.

use std::rc::Rc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use kassa_core::AppConfig;
use kassa_core::types::NavigationState;
use kassa_store::{PlatformPurchases, PurchaseStore};

use crate::ad::{AdBanner, AdVisibilityController};
use crate::gateway::{ListenerPair, PurchaseGateway};
use crate::navigation::NavigationController;
use crate::router::{BridgeRouter, Continuation};
use crate::shell::{HostShell, WebDocument};

/// Events delivered to the screen by the host.
#[derive(Debug)]
pub enum HostEvent {
    /// Text posted by the web document.
    WebMessage(String),
    /// The document finished loading.
    LoadEnd,
    /// The document's navigation state changed.
    NavigationChanged(NavigationState),
    /// Hardware back button; the reply says whether it was handled.
    BackPressed(oneshot::Sender<bool>),
    /// The screen is going away.
    Unmount,
}

/// Cloneable sender side of a running screen.
#[derive(Clone)]
pub struct ScreenHandle {
    events: mpsc::UnboundedSender<HostEvent>,
}

impl ScreenHandle {
    pub fn web_message(&self, text: impl Into<String>) {
        self.dispatch(HostEvent::WebMessage(text.into()));
    }

    pub fn load_end(&self) {
        self.dispatch(HostEvent::LoadEnd);
    }

    pub fn navigation_changed(&self, state: NavigationState) {
        self.dispatch(HostEvent::NavigationChanged(state));
    }

    /// Deliver the back signal and wait for the verdict. A screen that is
    /// gone never handles it.
    pub async fn back_pressed(&self) -> bool {
        let (reply, verdict) = oneshot::channel();
        self.dispatch(HostEvent::BackPressed(reply));
        verdict.await.unwrap_or(false)
    }

    pub fn unmount(&self) {
        self.dispatch(HostEvent::Unmount);
    }

    fn dispatch(&self, event: HostEvent) {
        if let Err(e) = self.events.send(event) {
            debug!(event = ?e.0, "screen no longer running; event dropped");
        }
    }
}

/// The screen hosting the embedded document.
pub struct Screen<S: PurchaseStore, W: WebDocument> {
    gateway: PurchaseGateway<S>,
    router: BridgeRouter<S, W>,
    navigation: NavigationController,
    document: Rc<W>,
    listeners: Option<ListenerPair<S>>,
    events: mpsc::UnboundedReceiver<HostEvent>,
    continuations: mpsc::UnboundedReceiver<Continuation>,
    continuation_tx: mpsc::UnboundedSender<Continuation>,
}

impl<S: PurchaseStore + 'static, W: WebDocument + 'static> Screen<S, W> {
    pub fn new(
        store: Rc<S>,
        platform: Box<dyn PlatformPurchases>,
        document: Rc<W>,
        shell: Box<dyn HostShell>,
        config: &AppConfig,
    ) -> (Self, ScreenHandle) {
        let gateway = PurchaseGateway::new(store, platform);
        let ads = AdVisibilityController::new(AdBanner::from_config(config, gateway.platform()));
        let (continuation_tx, continuations) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();

        let router = BridgeRouter::new(
            gateway.clone(),
            Rc::clone(&document),
            shell,
            ads,
            continuation_tx.clone(),
        );

        let screen = Self {
            gateway,
            router,
            navigation: NavigationController::new(),
            document,
            listeners: None,
            events,
            continuations,
            continuation_tx,
        };
        (screen, ScreenHandle { events: events_tx })
    }

    /// Mount, handle events until unmounted (or every handle is dropped),
    /// then tear down.
    ///
    /// Must be driven inside a `tokio::task::LocalSet`.
    pub async fn run(mut self) {
        self.mount().await;

        loop {
            tokio::select! {
                Some(continuation) = self.continuations.recv() => {
                    self.router.handle_continuation(continuation);
                }
                event = self.events.recv() => match event {
                    Some(HostEvent::Unmount) | None => break,
                    Some(event) => self.handle_event(event),
                },
            }
        }

        self.unmount().await;
    }

    async fn mount(&mut self) {
        if self.gateway.initialize().await.is_err() {
            warn!("store unavailable; purchases will fail until the screen is mounted again");
        }
        self.router.render_banner();

        let on_update = self.continuation_tx.clone();
        let on_error = self.continuation_tx.clone();
        self.listeners = Some(self.gateway.register_listeners(
            move |purchase| {
                let _ = on_update.send(Continuation::PurchaseUpdated(purchase));
            },
            move |error| {
                let _ = on_error.send(Continuation::PurchaseFailed(error));
            },
        ));
        info!(platform = %self.gateway.platform(), "screen mounted");
    }

    fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::WebMessage(text) => self.router.handle_web_message(&text),
            HostEvent::LoadEnd => self.router.handle_load_end(),
            HostEvent::NavigationChanged(state) => self.navigation.observe(state),
            HostEvent::BackPressed(reply) => {
                let handled = self.navigation.handle_back_signal(&*self.document);
                let _ = reply.send(handled);
            }
            HostEvent::Unmount => {}
        }
    }

    async fn unmount(&mut self) {
        if let Some(listeners) = self.listeners.take() {
            // The gateway has already logged the cause.
            if let Err(e) = self.gateway.teardown(listeners).await {
                debug!(error = %e, "teardown incomplete; screen unmounted anyway");
            }
        }
        info!("screen unmounted");
    }
}
