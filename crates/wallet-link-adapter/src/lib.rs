/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public wallet link adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod flow;
pub mod http;
pub mod types;
pub mod wallet;

// Re-export commonly used types from flow
pub use flow::{AuthFlowController, ButtonLabel, ConnectionView, UiState, project};

// Re-export commonly used types from http
pub use http::{ChallengeClient, ClientConfig, LinkError, Result};

// Re-export all types
pub use types::*;

// Re-export commonly used types from wallet
pub use wallet::{
    KeypairWallet,
    MockWallet,
    SessionEvent,
    SessionEventKind,
    WalletCapability,
    WalletDescriptor,
    WalletRegistry,
    WalletSession,
};
