/*
[INPUT]:  YAML configuration file and page entry arguments
[OUTPUT]: Parsed link configuration, wallet registry and session identifier
[POS]:    Configuration layer - backend and wallet setup
[UPDATE]: When adding new configuration options
*/

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::warn;
use wallet_link_adapter::{
    ClientConfig, KeypairWallet, ReadyState, SessionId, WalletCapability, WalletRegistry,
};

/// Top-level configuration for the wallet link CLI
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkConfig {
    /// Base URL of the challenge/verification backend
    pub backend_url: String,
    /// Overall request timeout; unset leaves it to the transport
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Wallet to select after startup instead of the first entry
    #[serde(default)]
    pub default_wallet: Option<String>,
    /// Wallet providers, in display order
    #[serde(default)]
    pub wallets: Vec<WalletConfig>,
}

/// A key-backed wallet provider entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WalletConfig {
    /// Display name
    pub name: String,
    /// Base58 private key (32-byte seed or 64-byte keypair)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Environment variable holding the base58 private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_env: Option<String>,
    /// Readiness reported to the flow
    #[serde(default)]
    pub ready: ReadyState,
}

impl LinkConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        if config.backend_url.trim().is_empty() {
            bail!("backend_url must not be empty");
        }
        Ok(config)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: self.request_timeout_secs.map(Duration::from_secs),
            connect_timeout: None,
        }
    }

    /// Build the wallet registry in configured order
    pub fn build_registry(&self) -> Result<WalletRegistry> {
        let wallets = self
            .wallets
            .iter()
            .map(WalletConfig::build)
            .collect::<Result<Vec<_>>>()?;
        Ok(WalletRegistry::new(wallets))
    }
}

impl WalletConfig {
    fn private_key(&self) -> Result<Option<String>> {
        if let Some(key) = &self.private_key {
            return Ok(Some(key.clone()));
        }
        match &self.private_key_env {
            Some(var) => match std::env::var(var) {
                Ok(key) => Ok(Some(key)),
                Err(std::env::VarError::NotPresent) => Ok(None),
                Err(err) => Err(err).with_context(|| format!("read {var}")),
            },
            None => Ok(None),
        }
    }

    /// Wallets without key material are listed but cannot connect
    fn build(&self) -> Result<Arc<dyn WalletCapability>> {
        let wallet = match self.private_key()? {
            Some(key) => KeypairWallet::from_base58(&self.name, &key)
                .with_context(|| format!("load key for wallet {}", self.name))?
                .with_ready_state(self.ready),
            None => {
                if self.ready.is_usable() {
                    warn!(
                        wallet = %self.name,
                        "no key material configured; wallet marked not detected"
                    );
                }
                KeypairWallet::generate(&self.name).with_ready_state(ReadyState::NotDetected)
            }
        };
        Ok(Arc::new(wallet))
    }
}

/// Resolve the session identifier from `--url` or `--session-id`.
///
/// `Ok(None)` is a valid outcome: the flow reports the missing session itself.
pub fn resolve_session_id(
    url: Option<&str>,
    session_id: Option<&str>,
) -> Result<Option<SessionId>> {
    match (url, session_id) {
        (Some(_), Some(_)) => bail!("pass either --url or --session-id, not both"),
        (Some(url), None) => SessionId::from_page_url(url).context("parse page url"),
        (None, Some(id)) => Ok(SessionId::new(id)),
        (None, None) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
backend_url: http://127.0.0.1:8000
request_timeout_secs: 15
default_wallet: Solflare
wallets:
  - name: Phantom
    private_key: "11111111111111111111111111111111"
  - name: Solflare
    private_key: "11111111111111111111111111111111"
    ready: loadable
  - name: Ledger
"#;

    #[test]
    fn test_parse_config() {
        let config = LinkConfig::from_yaml_str(CONFIG).unwrap();
        assert_eq!(config.wallets.len(), 3);
        assert_eq!(config.default_wallet.as_deref(), Some("Solflare"));
        assert_eq!(config.wallets[1].ready, ReadyState::Loadable);
        assert_eq!(config.wallets[2].ready, ReadyState::Installed);
        assert_eq!(config.client_config().timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_build_registry() {
        let config = LinkConfig::from_yaml_str(CONFIG).unwrap();
        let registry = config.build_registry().unwrap();

        assert_eq!(registry.names(), vec!["Phantom", "Solflare", "Ledger"]);
        let ledger = registry.get("Ledger").unwrap();
        assert_eq!(ledger.capability.ready_state(), ReadyState::NotDetected);
        let solflare = registry.get("Solflare").unwrap();
        assert_eq!(solflare.capability.ready_state(), ReadyState::Loadable);
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let config = LinkConfig::from_yaml_str(
            "backend_url: http://127.0.0.1:8000\n\
             wallets:\n  - name: Phantom\n    private_key: bs58tooShort\n",
        )
        .unwrap();
        assert!(config.build_registry().is_err());
    }

    #[test]
    fn test_empty_backend_url_is_rejected() {
        assert!(LinkConfig::from_yaml_str("backend_url: ''").is_err());
    }

    #[test]
    fn test_default_timeout_is_unset() {
        let config = LinkConfig::from_yaml_str("backend_url: http://127.0.0.1:8000").unwrap();
        assert!(config.client_config().timeout.is_none());
        assert!(config.wallets.is_empty());
    }

    #[test]
    fn test_resolve_session_id() {
        let id = resolve_session_id(Some("https://link.example.com/?session_id=abc123"), None)
            .unwrap()
            .unwrap();
        assert_eq!(id.as_str(), "abc123");

        let id = resolve_session_id(None, Some("abc123")).unwrap().unwrap();
        assert_eq!(id.as_str(), "abc123");

        assert!(resolve_session_id(None, None).unwrap().is_none());
        assert!(resolve_session_id(Some("https://link.example.com/"), None).unwrap().is_none());
        assert!(resolve_session_id(Some("https://x/"), Some("abc")).is_err());
        assert!(resolve_session_id(Some("not a url"), None).is_err());
    }
}
