/*
[INPUT]:  Wallet provider readiness and flow failure classification
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - shared enumerations
[UPDATE]: When adding provider readiness states or failure kinds
*/

use serde::{Deserialize, Serialize};

/// Whether a wallet provider can be used on this machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    /// Provider is present and ready to connect
    #[default]
    Installed,
    /// Provider can be loaded on demand (e.g. hardware wallets)
    Loadable,
    /// Provider was not found
    NotDetected,
    /// Provider cannot run in this environment
    Unsupported,
}

impl ReadyState {
    /// Check if `connect()` may be attempted
    pub fn is_usable(&self) -> bool {
        matches!(self, ReadyState::Installed | ReadyState::Loadable)
    }
}

/// Classification of a failed flow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Page was opened without a session identifier
    MissingSession,
    /// Registry enumerated no wallet providers
    NoWallets,
    /// Requested wallet name is not registered
    Selection,
    /// Provider connect rejected or threw
    Connect,
    /// Backend refused to issue a challenge
    Challenge,
    /// User cancelled signing or the provider refused
    Sign,
    /// Backend rejected the signature
    Verify,
}

impl FailureKind {
    /// Terminal failures disable every control for the rest of the page lifetime
    pub fn is_terminal(&self) -> bool {
        matches!(self, FailureKind::MissingSession | FailureKind::NoWallets)
    }
}

/// Why the flow is sitting without an active connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnselectedReason {
    /// Nothing has been selected yet
    Startup,
    /// The named wallet disconnected mid-flow
    Disconnected(String),
}
