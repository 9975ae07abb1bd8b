/*
[INPUT]:  Ed25519 private key (base58 seed or keypair) and message bytes
[OUTPUT]: Wallet capability backed by a local signing key
[POS]:    Wallet layer - key-backed provider implementation
[UPDATE]: When key formats or connection semantics change
*/

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use tracing::debug;

use crate::http::{LinkError, Result};
use crate::types::{ReadyState, WalletPublicKey};

use super::capability::{
    WalletCapability, WalletEvent, WalletEventKind, WalletListener, WalletListeners,
};

/// Wallet provider holding an Ed25519 key in process memory
pub struct KeypairWallet {
    name: String,
    signing_key: SigningKey,
    ready_state: ReadyState,
    connected: AtomicBool,
    listeners: WalletListeners,
}

impl KeypairWallet {
    /// Create a wallet from a base58-encoded private key
    /// Supports 64-byte keypair or 32-byte seed
    pub fn from_base58(name: impl Into<String>, private_key_base58: &str) -> Result<Self> {
        let bytes = bs58::decode(private_key_base58.trim())
            .into_vec()
            .map_err(|e| LinkError::Config(format!("Invalid base58 private key: {e}")))?;

        let signing_key = match bytes.len() {
            64 => {
                let mut keypair = [0u8; 64];
                keypair.copy_from_slice(&bytes);
                SigningKey::from_keypair_bytes(&keypair)
                    .map_err(|e| LinkError::Config(format!("Invalid keypair bytes: {e}")))?
            }
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                SigningKey::from_bytes(&seed)
            }
            other => {
                return Err(LinkError::Config(format!(
                    "Invalid private key length: expected 32 or 64 bytes, got {other}"
                )));
            }
        };

        Ok(Self::from_signing_key(name, signing_key))
    }

    /// Create a wallet with a freshly generated key
    pub fn generate(name: impl Into<String>) -> Self {
        Self::from_signing_key(name, SigningKey::generate(&mut OsRng))
    }

    fn from_signing_key(name: impl Into<String>, signing_key: SigningKey) -> Self {
        Self {
            name: name.into(),
            signing_key,
            ready_state: ReadyState::Installed,
            connected: AtomicBool::new(false),
            listeners: WalletListeners::new(),
        }
    }

    pub fn with_ready_state(mut self, ready_state: ReadyState) -> Self {
        self.ready_state = ready_state;
        self
    }

    /// Base58 address, available whether or not the wallet is connected
    pub fn address(&self) -> String {
        bs58::encode(self.signing_key.verifying_key().as_bytes()).into_string()
    }
}

impl fmt::Debug for KeypairWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeypairWallet")
            .field("name", &self.name)
            .field("address", &self.address())
            .field("ready_state", &self.ready_state)
            .field("connected", &self.connected())
            .finish()
    }
}

#[async_trait]
impl WalletCapability for KeypairWallet {
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
        self.connected()
            .then(|| WalletPublicKey::from_bytes(self.signing_key.verifying_key().to_bytes()))
    }

    async fn connect(&self) -> Result<()> {
        if !self.ready_state.is_usable() {
            return Err(LinkError::WalletNotReady(self.name.clone()));
        }
        if self.connected.swap(true, Ordering::SeqCst) {
            debug!(wallet = %self.name, "connect requested while already connected");
            return Ok(());
        }
        self.listeners.emit(WalletEvent::Connect);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.listeners.emit(WalletEvent::Disconnect);
        }
        Ok(())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        if !self.connected() {
            return Err(LinkError::WalletNotConnected);
        }
        let signature = self.signing_key.sign(message);
        Ok(signature.to_bytes().to_vec())
    }

    fn on(&self, kind: WalletEventKind, listener: WalletListener) {
        self.listeners.add(kind, listener);
    }

    fn remove_all_listeners(&self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_keypair_wallet_from_seed_signs_verifiably() {
        // A dummy 32-byte seed in base58 (all zeros)
        let wallet =
            KeypairWallet::from_base58("Local", "11111111111111111111111111111111").unwrap();
        wallet.connect().await.unwrap();

        let public_key = wallet.public_key().unwrap();
        assert_eq!(public_key.to_base58(), wallet.address());

        let message = "auth:abc123";
        let signature = wallet.sign_message(message.as_bytes()).await.unwrap();
        assert_eq!(signature.len(), 64);

        let verifying_key = VerifyingKey::from_bytes(public_key.as_bytes()).unwrap();
        let signature = Signature::from_slice(&signature).unwrap();
        assert!(verifying_key.verify(message.as_bytes(), &signature).is_ok());
    }

    #[tokio::test]
    async fn test_keypair_wallet_invalid_key() {
        assert!(KeypairWallet::from_base58("Local", "invalid_base58_!@#").is_err());
        assert!(KeypairWallet::from_base58("Local", "bs58tooShort").is_err());
    }

    #[tokio::test]
    async fn test_keypair_wallet_sign_requires_connection() {
        let wallet = KeypairWallet::generate("Local");
        assert!(wallet.public_key().is_none());

        let err = wallet.sign_message(b"hello").await.unwrap_err();
        assert!(matches!(err, LinkError::WalletNotConnected));
    }

    #[tokio::test]
    async fn test_keypair_wallet_emits_lifecycle_events() {
        let wallet = KeypairWallet::generate("Local");
        let seen = Arc::new(Mutex::new(Vec::new()));

        for kind in [WalletEventKind::Connect, WalletEventKind::Disconnect] {
            let sink = seen.clone();
            wallet.on(kind, Arc::new(move |event| sink.lock().unwrap().push(event)));
        }

        wallet.connect().await.unwrap();
        wallet.connect().await.unwrap();
        wallet.disconnect().await.unwrap();
        wallet.disconnect().await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![WalletEvent::Connect, WalletEvent::Disconnect]
        );
    }

    #[tokio::test]
    async fn test_keypair_wallet_not_detected_refuses_connect() {
        let wallet = KeypairWallet::generate("Ledger").with_ready_state(ReadyState::NotDetected);
        let err = wallet.connect().await.unwrap_err();
        assert!(matches!(err, LinkError::WalletNotReady(name) if name == "Ledger"));
        assert!(!wallet.connected());
    }
}
