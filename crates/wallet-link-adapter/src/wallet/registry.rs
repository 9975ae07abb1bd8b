/*
[INPUT]:  Wallet provider instances discovered at startup
[OUTPUT]: Ordered, name-keyed wallet descriptors
[POS]:    Wallet layer - provider enumeration
[UPDATE]: When provider discovery rules change
*/

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::capability::WalletCapability;

/// A registered provider and its display name
#[derive(Clone)]
pub struct WalletDescriptor {
    pub name: String,
    pub capability: Arc<dyn WalletCapability>,
}

impl fmt::Debug for WalletDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletDescriptor")
            .field("name", &self.name)
            .field("ready_state", &self.capability.ready_state())
            .field("connected", &self.capability.connected())
            .finish()
    }
}

/// Fixed set of wallet providers, in enumeration order
#[derive(Debug, Clone, Default)]
pub struct WalletRegistry {
    wallets: Vec<WalletDescriptor>,
}

impl WalletRegistry {
    /// Build the registry once at startup.
    ///
    /// Names must be unique; later duplicates are dropped.
    pub fn new(capabilities: impl IntoIterator<Item = Arc<dyn WalletCapability>>) -> Self {
        let mut wallets: Vec<WalletDescriptor> = Vec::new();
        for capability in capabilities {
            let name = capability.name().to_string();
            if wallets.iter().any(|existing| existing.name == name) {
                warn!(wallet = %name, "duplicate wallet name ignored");
                continue;
            }
            wallets.push(WalletDescriptor { name, capability });
        }
        Self { wallets }
    }

    pub fn list(&self) -> &[WalletDescriptor] {
        &self.wallets
    }

    pub fn get(&self, name: &str) -> Option<&WalletDescriptor> {
        self.wallets.iter().find(|wallet| wallet.name == name)
    }

    /// Default selection
    pub fn first(&self) -> Option<&WalletDescriptor> {
        self.wallets.first()
    }

    pub fn names(&self) -> Vec<&str> {
        self.wallets.iter().map(|wallet| wallet.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}
