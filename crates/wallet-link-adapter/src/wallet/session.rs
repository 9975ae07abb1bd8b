/*
[INPUT]:  Wallet registry and user wallet selections
[OUTPUT]: The single active wallet plus normalized lifecycle events
[POS]:    Wallet layer - active provider ownership and event subscription
[UPDATE]: When switching rules or event normalization change
*/

use std::sync::{Arc, Weak};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::http::{LinkError, Result};
use crate::types::WalletPublicKey;

use super::capability::{WalletCapability, WalletEvent, WalletEventKind};
use super::registry::{WalletDescriptor, WalletRegistry};

/// Provider-independent lifecycle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEventKind {
    Connected(WalletPublicKey),
    Disconnected,
    Error(String),
}

/// Lifecycle event tagged with the selection it was subscribed under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub selection: u64,
    pub wallet: String,
    pub kind: SessionEventKind,
}

/// Owns the one active wallet and its event subscriptions
#[derive(Debug)]
pub struct WalletSession {
    registry: WalletRegistry,
    current: Option<WalletDescriptor>,
    selection: u64,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<SessionEvent>>,
}

impl WalletSession {
    pub fn new(registry: WalletRegistry) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            registry,
            current: None,
            selection: 0,
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    /// Get the event receiver
    pub fn take_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<SessionEvent>> {
        self.event_rx.take()
    }

    pub fn registry(&self) -> &WalletRegistry {
        &self.registry
    }

    pub fn current(&self) -> Option<&WalletDescriptor> {
        self.current.as_ref()
    }

    /// Counter bumped on every switch; events from older selections are stale
    pub fn selection(&self) -> u64 {
        self.selection
    }

    /// Switch the active wallet.
    ///
    /// Unknown names leave the current selection untouched. Re-selecting the
    /// active wallet is a no-op, so rapid repeats never stack subscriptions.
    pub async fn select(&mut self, name: &str) -> Result<()> {
        if self.current.as_ref().is_some_and(|current| current.name == name) {
            debug!(wallet = %name, "wallet already active");
            return Ok(());
        }

        let next = self
            .registry
            .get(name)
            .cloned()
            .ok_or_else(|| LinkError::UnknownWallet(name.to_string()))?;

        if let Some(previous) = self.current.take() {
            previous.capability.remove_all_listeners();
            if previous.capability.connected() {
                if let Err(err) = previous.capability.disconnect().await {
                    warn!(
                        wallet = %previous.name,
                        error = %err,
                        "failed to disconnect previous wallet"
                    );
                }
            }
        }

        self.selection += 1;
        self.subscribe(&next);
        info!(wallet = %next.name, selection = self.selection, "wallet selected");
        self.current = Some(next);
        Ok(())
    }

    fn subscribe(&self, descriptor: &WalletDescriptor) {
        let weak: Weak<dyn WalletCapability> = Arc::downgrade(&descriptor.capability);
        for kind in [
            WalletEventKind::Connect,
            WalletEventKind::Disconnect,
            WalletEventKind::Error,
        ] {
            let tx = self.event_tx.clone();
            let weak = weak.clone();
            let selection = self.selection;
            let wallet = descriptor.name.clone();
            descriptor.capability.on(
                kind,
                Arc::new(move |event| {
                    let Some(kind) = normalize(&weak, event) else {
                        warn!(wallet = %wallet, "connect event without public key ignored");
                        return;
                    };
                    // Receiver gone means the flow was torn down.
                    let _ = tx.send(SessionEvent {
                        selection,
                        wallet: wallet.clone(),
                        kind,
                    });
                }),
            );
        }
    }
}

fn normalize(
    capability: &Weak<dyn WalletCapability>,
    event: WalletEvent,
) -> Option<SessionEventKind> {
    match event {
        WalletEvent::Connect => capability
            .upgrade()
            .and_then(|capability| capability.public_key())
            .map(SessionEventKind::Connected),
        WalletEvent::Disconnect => Some(SessionEventKind::Disconnected),
        WalletEvent::Error(reason) => Some(SessionEventKind::Error(reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::MockWallet;

    fn setup() -> (Arc<MockWallet>, Arc<MockWallet>, WalletSession) {
        let phantom = Arc::new(MockWallet::new("Phantom", WalletPublicKey::from_bytes([1u8; 32])));
        let solflare =
            Arc::new(MockWallet::new("Solflare", WalletPublicKey::from_bytes([2u8; 32])));
        let registry = WalletRegistry::new([
            phantom.clone() as Arc<dyn WalletCapability>,
            solflare.clone() as Arc<dyn WalletCapability>,
        ]);
        (phantom, solflare, WalletSession::new(registry))
    }

    #[tokio::test]
    async fn test_select_subscribes_three_listeners() {
        let (phantom, _, mut session) = setup();
        session.select("Phantom").await.unwrap();

        assert_eq!(session.current().unwrap().name, "Phantom");
        assert_eq!(phantom.listener_count(), 3);
        assert_eq!(session.selection(), 1);
    }

    #[tokio::test]
    async fn test_switch_tears_down_previous_wallet() {
        let (phantom, solflare, mut session) = setup();
        let mut events = session.take_receiver().unwrap();

        session.select("Phantom").await.unwrap();
        phantom.connect().await.unwrap();
        session.select("Solflare").await.unwrap();

        assert_eq!(phantom.disconnect_calls(), 1);
        assert_eq!(phantom.listener_count(), 0);
        assert!(!phantom.connected());
        assert_eq!(solflare.listener_count(), 3);

        // Only the connect from the first selection was delivered; the
        // disconnect happened after its listeners were removed.
        let event = events.try_recv().unwrap();
        assert_eq!(event.selection, 1);
        assert_eq!(event.kind, SessionEventKind::Connected(WalletPublicKey::from_bytes([1u8; 32])));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_switch_survives_failed_disconnect() {
        let (phantom, solflare, mut session) = setup();
        session.select("Phantom").await.unwrap();
        phantom.connect().await.unwrap();
        phantom.fail_disconnect("extension unresponsive");

        session.select("Solflare").await.unwrap();

        assert_eq!(session.current().unwrap().name, "Solflare");
        assert_eq!(phantom.disconnect_calls(), 1);
        assert_eq!(phantom.listener_count(), 0);
        assert_eq!(solflare.listener_count(), 3);
    }

    #[tokio::test]
    async fn test_rapid_switching_leaves_single_subscription_set() {
        let (phantom, solflare, mut session) = setup();
        session.select("Phantom").await.unwrap();
        session.select("Solflare").await.unwrap();
        session.select("Phantom").await.unwrap();
        session.select("Phantom").await.unwrap();

        assert_eq!(phantom.listener_count(), 3);
        assert_eq!(solflare.listener_count(), 0);
        assert_eq!(session.selection(), 3);
    }

    #[tokio::test]
    async fn test_unknown_wallet_keeps_current() {
        let (phantom, _, mut session) = setup();
        session.select("Phantom").await.unwrap();

        let err = session.select("Backpack").await.unwrap_err();
        assert!(matches!(err, LinkError::UnknownWallet(name) if name == "Backpack"));
        assert_eq!(session.current().unwrap().name, "Phantom");
        assert_eq!(phantom.listener_count(), 3);
    }

    #[tokio::test]
    async fn test_events_are_normalized() {
        let (phantom, _, mut session) = setup();
        let mut events = session.take_receiver().unwrap();
        session.select("Phantom").await.unwrap();

        phantom.connect().await.unwrap();
        phantom.emit_error("extension crashed");
        phantom.emit_disconnect();

        let kinds: Vec<SessionEventKind> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|event| event.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                SessionEventKind::Connected(WalletPublicKey::from_bytes([1u8; 32])),
                SessionEventKind::Error("extension crashed".to_string()),
                SessionEventKind::Disconnected,
            ]
        );
    }

    #[tokio::test]
    async fn test_receiver_can_only_be_taken_once() {
        let (_, _, mut session) = setup();
        assert!(session.take_receiver().is_some());
        assert!(session.take_receiver().is_none());
    }
}
