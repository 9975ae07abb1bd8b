/*
[INPUT]:  Wallet provider implementations (extensions, hardware, local keys)
[OUTPUT]: Uniform connect/disconnect/sign/event contract
[POS]:    Wallet layer - provider abstraction
[UPDATE]: When adding capabilities to the provider contract
*/

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::http::Result;
use crate::types::{ReadyState, WalletPublicKey};

/// Lifecycle events a provider may emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletEventKind {
    Connect,
    Disconnect,
    Error,
}

/// Raw provider event as delivered to listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    Connect,
    Disconnect,
    Error(String),
}

impl WalletEvent {
    pub fn kind(&self) -> WalletEventKind {
        match self {
            WalletEvent::Connect => WalletEventKind::Connect,
            WalletEvent::Disconnect => WalletEventKind::Disconnect,
            WalletEvent::Error(_) => WalletEventKind::Error,
        }
    }
}

/// Callback registered with a provider
pub type WalletListener = Arc<dyn Fn(WalletEvent) + Send + Sync>;

/// Contract every wallet provider adapter satisfies.
///
/// Implementations own their connection state. Callers only observe it
/// through `connected()`/`public_key()` and the event listeners, and change
/// it through `connect()`/`disconnect()`.
#[async_trait]
pub trait WalletCapability: Send + Sync {
    /// Display name, unique within a registry
    fn name(&self) -> &str;

    /// Whether the provider is installed/loadable
    fn ready_state(&self) -> ReadyState;

    fn connected(&self) -> bool;

    /// Present iff connected
    fn public_key(&self) -> Option<WalletPublicKey>;

    async fn connect(&self) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;

    /// Sign raw message bytes and return the signature bytes
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>>;

    /// Register a listener for one event kind
    fn on(&self, kind: WalletEventKind, listener: WalletListener);

    /// Drop every registered listener
    fn remove_all_listeners(&self);
}

/// Listener bookkeeping shared by adapter implementations
#[derive(Default)]
pub struct WalletListeners {
    entries: Mutex<Vec<(WalletEventKind, WalletListener)>>,
}

impl WalletListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, kind: WalletEventKind, listener: WalletListener) {
        self.lock().push((kind, listener));
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver an event to every listener registered for its kind
    pub fn emit(&self, event: WalletEvent) {
        let kind = event.kind();
        // Listeners may re-enter the provider, so call them without the lock held.
        let targets: Vec<WalletListener> = self
            .lock()
            .iter()
            .filter(|(registered, _)| *registered == kind)
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in targets {
            listener(event.clone());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(WalletEventKind, WalletListener)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for WalletListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletListeners")
            .field("count", &self.len())
            .finish()
    }
}
