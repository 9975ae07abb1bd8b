/*
[INPUT]:  Page URL, wallet public keys, backend challenge messages
[OUTPUT]: Session identifiers, key/challenge newtypes and the flow state enum
[POS]:    Data layer - domain models
[UPDATE]: When flow states or identifier formats change
*/

use std::fmt;

use url::Url;

use crate::http::{LinkError, Result};

use super::enums::{FailureKind, UnselectedReason};

/// Query parameter carrying the session identifier on the page URL
pub const SESSION_ID_PARAM: &str = "session_id";

/// Opaque token linking this flow to a pending identity-link request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a raw identifier verbatim; only an empty value counts as absent
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    /// Extract the identifier from the page's incoming location
    pub fn from_url(url: &Url) -> Option<Self> {
        url.query_pairs()
            .find(|(key, _)| key == SESSION_ID_PARAM)
            .and_then(|(_, value)| Self::new(value.into_owned()))
    }

    /// Parse a full page URL and extract the identifier
    pub fn from_page_url(raw: &str) -> Result<Option<Self>> {
        let url = Url::parse(raw)?;
        Ok(Self::from_url(&url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ed25519 public key of a connected wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WalletPublicKey([u8; 32]);

impl WalletPublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Decode a base58 address
    pub fn from_base58(encoded: &str) -> Result<Self> {
        let bytes = bs58::decode(encoded.trim())
            .into_vec()
            .map_err(|e| LinkError::Config(format!("Invalid base58 public key: {e}")))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            LinkError::Config(format!(
                "Invalid public key length: expected 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Base58 encoding used on the wire and in the UI
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl fmt::Display for WalletPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

/// One-time message issued by the backend for a session.
///
/// Not `Clone`: a challenge is consumed by exactly one signing attempt.
#[derive(Debug, PartialEq, Eq)]
pub struct Challenge(String);

impl Challenge {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }

    /// UTF-8 bytes handed to the wallet for signing
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// A failed step together with the message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl FlowFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Authentication flow state, owned by the flow controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFlowState {
    AwaitingSessionId,
    WalletUnselected(UnselectedReason),
    WalletSelected { wallet: String },
    Connecting { wallet: String },
    ConnectedIdle {
        wallet: String,
        public_key: WalletPublicKey,
    },
    FetchingChallenge,
    AwaitingSignature,
    Verifying,
    Succeeded { message: String },
    Failed(FlowFailure),
}

impl AuthFlowState {
    /// An async step is in flight and controls must stay disabled
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            AuthFlowState::Connecting { .. }
                | AuthFlowState::FetchingChallenge
                | AuthFlowState::AwaitingSignature
                | AuthFlowState::Verifying
        )
    }

    /// No further transition is possible from this state
    pub fn is_terminal(&self) -> bool {
        match self {
            AuthFlowState::Succeeded { .. } => true,
            AuthFlowState::Failed(failure) => failure.kind.is_terminal(),
            _ => false,
        }
    }

    pub fn failure(&self) -> Option<&FlowFailure> {
        match self {
            AuthFlowState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Short name for structured logs
    pub fn label(&self) -> &'static str {
        match self {
            AuthFlowState::AwaitingSessionId => "awaiting_session_id",
            AuthFlowState::WalletUnselected(_) => "wallet_unselected",
            AuthFlowState::WalletSelected { .. } => "wallet_selected",
            AuthFlowState::Connecting { .. } => "connecting",
            AuthFlowState::ConnectedIdle { .. } => "connected_idle",
            AuthFlowState::FetchingChallenge => "fetching_challenge",
            AuthFlowState::AwaitingSignature => "awaiting_signature",
            AuthFlowState::Verifying => "verifying",
            AuthFlowState::Succeeded { .. } => "succeeded",
            AuthFlowState::Failed(_) => "failed",
        }
    }
}
