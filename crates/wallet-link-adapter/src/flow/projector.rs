/*
[INPUT]:  AuthFlowState plus a fresh view of the active wallet connection
[OUTPUT]: UiState (status text, button label/enabled, selector, visibility)
[POS]:    Flow layer - pure projection from flow state to UI affordances
[UPDATE]: When UI copy or affordance rules change
*/

use std::fmt;

use crate::types::{AuthFlowState, FailureKind, ReadyState, UnselectedReason, WalletPublicKey};

/// Text of the primary button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLabel {
    Connect,
    Sign,
}

impl ButtonLabel {
    pub fn text(&self) -> &'static str {
        match self {
            ButtonLabel::Connect => "Connect Wallet",
            ButtonLabel::Sign => "Sign Message",
        }
    }
}

impl fmt::Display for ButtonLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Snapshot of the active wallet, read fresh from the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionView {
    pub wallet: String,
    pub ready_state: ReadyState,
    /// Present iff the provider reports connected
    pub public_key: Option<WalletPublicKey>,
}

/// Everything the page needs to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub status: String,
    /// "Connected with: ..." line, shown while a key is known
    pub wallet_info: Option<String>,
    pub button_label: ButtonLabel,
    pub button_enabled: bool,
    pub selector_enabled: bool,
    /// Button, selector and wallet info are hidden once linking succeeded
    pub controls_visible: bool,
}

impl UiState {
    fn disabled(mut self) -> Self {
        self.button_enabled = false;
        self.selector_enabled = false;
        self
    }
}

/// Map flow state to UI affordances. No side effects.
pub fn project(state: &AuthFlowState, connection: Option<&ConnectionView>) -> UiState {
    let public_key = connection.and_then(|view| view.public_key);
    let resting_label = if public_key.is_some() {
        ButtonLabel::Sign
    } else {
        ButtonLabel::Connect
    };

    let base = UiState {
        status: String::new(),
        wallet_info: connection.and_then(|view| {
            view.public_key
                .map(|key| format!("Connected with: {} ({})", view.wallet, key))
        }),
        button_label: resting_label,
        button_enabled: true,
        selector_enabled: true,
        controls_visible: true,
    };

    let ui = match state {
        AuthFlowState::AwaitingSessionId => UiState {
            status: "Loading...".to_string(),
            ..base
        }
        .disabled(),
        AuthFlowState::WalletUnselected(UnselectedReason::Startup) => UiState {
            status: "Select a wallet to continue.".to_string(),
            button_enabled: connection.is_some(),
            ..base
        },
        AuthFlowState::WalletUnselected(UnselectedReason::Disconnected(_)) => UiState {
            status: "Wallet disconnected.".to_string(),
            button_label: ButtonLabel::Connect,
            ..base
        },
        AuthFlowState::WalletSelected { wallet } => {
            let usable = connection.is_none_or(|view| view.ready_state.is_usable());
            let status = if usable {
                format!("Wallet selected: {wallet}. Click \"{resting_label}\".")
            } else {
                format!("Wallet selected: {wallet}. It was not detected on this device.")
            };
            UiState { status, ..base }
        }
        AuthFlowState::Connecting { .. } => UiState {
            status: "Connecting wallet...".to_string(),
            button_label: ButtonLabel::Connect,
            ..base
        },
        AuthFlowState::ConnectedIdle { public_key, .. } => UiState {
            status: format!("Wallet connected: {public_key}"),
            button_label: ButtonLabel::Sign,
            ..base
        },
        AuthFlowState::FetchingChallenge => UiState {
            status: "Fetching message to sign...".to_string(),
            ..base
        },
        AuthFlowState::AwaitingSignature => UiState {
            status: "Please sign the message in your wallet.".to_string(),
            ..base
        },
        AuthFlowState::Verifying => UiState {
            status: "Verifying signature...".to_string(),
            ..base
        },
        AuthFlowState::Succeeded { message } => UiState {
            status: format!("✅ Success! {message} You can close this window."),
            wallet_info: None,
            controls_visible: false,
            ..base
        }
        .disabled(),
        AuthFlowState::Failed(failure) => match failure.kind {
            FailureKind::MissingSession => UiState {
                status: "Error: missing session ID. Please start again from the link you were sent."
                    .to_string(),
                ..base
            }
            .disabled(),
            FailureKind::NoWallets => UiState {
                status: "Error: no wallets available.".to_string(),
                ..base
            }
            .disabled(),
            kind => {
                let button_label = match kind {
                    FailureKind::Connect => ButtonLabel::Connect,
                    FailureKind::Sign => ButtonLabel::Sign,
                    _ => resting_label,
                };
                UiState {
                    status: format!("❌ Error: {}", failure.detail),
                    button_label,
                    ..base
                }
            }
        },
    };

    if state.is_busy() { ui.disabled() } else { ui }
}
