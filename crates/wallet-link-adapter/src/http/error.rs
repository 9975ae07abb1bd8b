/*
[INPUT]:  Error sources (HTTP, backend detail, serialization, wallet providers)
[OUTPUT]: Structured error types with user-facing detail messages
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or wallet failure modes
*/

use thiserror::Error;

/// Main error type for the wallet link adapter
#[derive(Error, Debug)]
pub enum LinkError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend refused to issue a challenge
    #[error("Challenge unavailable: {0}")]
    ChallengeUnavailable(String),

    /// Backend rejected the signature or failed to verify it
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No wallet registered under the requested name
    #[error("Unknown wallet: {0}")]
    UnknownWallet(String),

    /// Provider is not installed or cannot be loaded
    #[error("{0} wallet is not available")]
    WalletNotReady(String),

    /// Provider rejected or failed the connection request
    #[error("Wallet connection failed: {0}")]
    WalletConnection(String),

    /// Operation requires a connected wallet
    #[error("Wallet not connected")]
    WalletNotConnected,

    /// User cancelled signing or the provider refused
    #[error("Message signing failed: {0}")]
    WalletSignMessage(String),

    /// Provider failed to disconnect
    #[error("Wallet disconnection failed: {0}")]
    WalletDisconnection(String),
}

impl LinkError {
    /// Message suitable for showing to the user.
    ///
    /// Backend failures carry the server-supplied detail verbatim; everything
    /// else falls back to the `Display` form.
    pub fn detail(&self) -> String {
        match self {
            LinkError::ChallengeUnavailable(detail) | LinkError::VerificationFailed(detail) => {
                detail.clone()
            }
            other => other.to_string(),
        }
    }

    /// Check if the error means the wallet has to be (re)connected first
    pub fn is_not_connected(&self) -> bool {
        matches!(
            self,
            LinkError::WalletNotConnected | LinkError::WalletConnection(_)
        )
    }
}

/// Result type alias for wallet link operations
pub type Result<T> = std::result::Result<T, LinkError>;
