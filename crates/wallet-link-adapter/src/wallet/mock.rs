/*
[INPUT]:  Scripted connect/sign outcomes
[OUTPUT]: Observable wallet capability for tests and demos
[POS]:    Wallet layer - mock provider implementation
[UPDATE]: When tests need new provider behaviours
*/

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::http::{LinkError, Result};
use crate::types::{ReadyState, WalletPublicKey};

use super::capability::{
    WalletCapability, WalletEvent, WalletEventKind, WalletListener, WalletListeners,
};

/// Mock wallet provider for testing
#[derive(Debug)]
pub struct MockWallet {
    name: String,
    public_key: WalletPublicKey,
    ready_state: ReadyState,
    connected: AtomicBool,
    connect_error: Mutex<Option<String>>,
    disconnect_error: Mutex<Option<String>>,
    sign_outcome: Mutex<std::result::Result<Vec<u8>, String>>,
    signed_messages: Mutex<Vec<Vec<u8>>>,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
    listeners: WalletListeners,
}

impl MockWallet {
    /// Create a mock that connects successfully and signs with 64 zero bytes
    pub fn new(name: impl Into<String>, public_key: WalletPublicKey) -> Self {
        Self {
            name: name.into(),
            public_key,
            ready_state: ReadyState::Installed,
            connected: AtomicBool::new(false),
            connect_error: Mutex::new(None),
            disconnect_error: Mutex::new(None),
            sign_outcome: Mutex::new(Ok(vec![0u8; 64])),
            signed_messages: Mutex::new(Vec::new()),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            listeners: WalletListeners::new(),
        }
    }

    pub fn with_ready_state(mut self, ready_state: ReadyState) -> Self {
        self.ready_state = ready_state;
        self
    }

    /// Make `connect()` fail with the given reason
    pub fn fail_connect(&self, reason: impl Into<String>) {
        *lock(&self.connect_error) = Some(reason.into());
    }

    /// Make `disconnect()` fail; the wallet stays connected
    pub fn fail_disconnect(&self, reason: impl Into<String>) {
        *lock(&self.disconnect_error) = Some(reason.into());
    }

    /// Make `sign_message()` return the given bytes
    pub fn set_signature(&self, signature: Vec<u8>) {
        *lock(&self.sign_outcome) = Ok(signature);
    }

    /// Make `sign_message()` fail, as when the user rejects the prompt
    pub fn fail_sign(&self, reason: impl Into<String>) {
        *lock(&self.sign_outcome) = Err(reason.into());
    }

    /// Simulate a provider-initiated disconnect (e.g. locked extension)
    pub fn emit_disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.listeners.emit(WalletEvent::Disconnect);
    }

    /// Simulate a provider error event
    pub fn emit_error(&self, reason: impl Into<String>) {
        self.listeners.emit(WalletEvent::Error(reason.into()));
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    /// Number of live listeners across all event kinds
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Every message passed to `sign_message()`, in call order
    pub fn signed_messages(&self) -> Vec<Vec<u8>> {
        lock(&self.signed_messages).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl WalletCapability for MockWallet {
    fn name(&self) -> &str {
        &self.name
    }

    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn public_key(&self) -> Option<WalletPublicKey> {
        self.connected().then_some(self.public_key)
    }

    async fn connect(&self) -> Result<()> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let failure = lock(&self.connect_error).clone();
        if let Some(reason) = failure {
            self.listeners.emit(WalletEvent::Error(reason.clone()));
            return Err(LinkError::WalletConnection(reason));
        }
        if !self.connected.swap(true, Ordering::SeqCst) {
            self.listeners.emit(WalletEvent::Connect);
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        let failure = lock(&self.disconnect_error).clone();
        if let Some(reason) = failure {
            return Err(LinkError::WalletDisconnection(reason));
        }
        if self.connected.swap(false, Ordering::SeqCst) {
            self.listeners.emit(WalletEvent::Disconnect);
        }
        Ok(())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        if !self.connected() {
            return Err(LinkError::WalletNotConnected);
        }
        lock(&self.signed_messages).push(message.to_vec());
        let outcome = lock(&self.sign_outcome).clone();
        outcome.map_err(|reason| {
            self.listeners.emit(WalletEvent::Error(reason.clone()));
            LinkError::WalletSignMessage(reason)
        })
    }

    fn on(&self, kind: WalletEventKind, listener: WalletListener) {
        self.listeners.add(kind, listener);
    }

    fn remove_all_listeners(&self) {
        self.listeners.clear();
    }
}
