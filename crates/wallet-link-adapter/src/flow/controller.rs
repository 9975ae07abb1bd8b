/*
[INPUT]:  User selections/clicks, wallet lifecycle events, backend responses
[OUTPUT]: AuthFlowState transitions and the projected UiState
[POS]:    Flow layer - select -> connect -> challenge -> sign -> verify state machine
[UPDATE]: When flow transitions, interrupt rules or step ordering change
*/

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::http::{ChallengeClient, LinkError, Result};
use crate::types::{
    AuthFlowState, Challenge, FailureKind, FlowFailure, SessionId, UnselectedReason,
    VerificationResult, WalletPublicKey,
};
use crate::wallet::{
    SessionEvent, SessionEventKind, WalletCapability, WalletDescriptor, WalletSession,
};

use super::projector::{ConnectionView, UiState, project};

/// Result of one async step
#[derive(Debug)]
enum StepOutcome {
    Connected {
        wallet: WalletDescriptor,
        result: Result<()>,
    },
    /// Disconnect of an adapter that is no longer selected
    Released(Result<()>),
    Challenge(Result<Challenge>),
    Signed(Result<Vec<u8>>),
    Verified(Result<VerificationResult>),
}

/// Step result tagged with the attempt that spawned it
#[derive(Debug)]
struct StepCompletion {
    attempt: u64,
    outcome: StepOutcome,
}

/// Drives the wallet link flow.
///
/// Each click starts a new attempt. Async steps run as spawned tasks and
/// report back through a channel; results from an attempt that has since been
/// superseded (wallet switch, provider disconnect) are discarded on arrival.
#[derive(Debug)]
pub struct AuthFlowController {
    session_id: Option<SessionId>,
    session: WalletSession,
    client: ChallengeClient,
    state: AuthFlowState,
    attempt: u64,
    pending_steps: usize,
    wallet_rx: mpsc::UnboundedReceiver<SessionEvent>,
    step_tx: mpsc::UnboundedSender<StepCompletion>,
    step_rx: mpsc::UnboundedReceiver<StepCompletion>,
}

impl AuthFlowController {
    /// Create a controller in `AwaitingSessionId`
    pub fn new(
        session_id: Option<SessionId>,
        mut session: WalletSession,
        client: ChallengeClient,
    ) -> Result<Self> {
        let wallet_rx = session.take_receiver().ok_or_else(|| {
            LinkError::Config("wallet session events are already consumed".to_string())
        })?;
        let (step_tx, step_rx) = mpsc::unbounded_channel();

        Ok(Self {
            session_id,
            session,
            client,
            state: AuthFlowState::AwaitingSessionId,
            attempt: 0,
            pending_steps: 0,
            wallet_rx,
            step_tx,
            step_rx,
        })
    }

    /// Resolve the startup preconditions and select the default wallet
    pub async fn start(&mut self) {
        if !matches!(self.state, AuthFlowState::AwaitingSessionId) {
            debug!(state = self.state.label(), "start ignored");
            return;
        }

        if self.session_id.is_none() {
            warn!("page opened without a session id");
            self.fail(FailureKind::MissingSession, "missing session ID");
            return;
        }

        let Some(first) = self.session.registry().first().map(|wallet| wallet.name.clone())
        else {
            warn!("no wallet providers available");
            self.fail(FailureKind::NoWallets, "no wallets available");
            return;
        };

        self.set_state(AuthFlowState::WalletUnselected(UnselectedReason::Startup));
        self.select_wallet(&first).await;
    }

    pub fn state(&self) -> &AuthFlowState {
        &self.state
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Current attempt identifier
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Async steps spawned but not yet reported back (stale ones included)
    pub fn pending_steps(&self) -> usize {
        self.pending_steps
    }

    /// Fresh view of the active wallet
    pub fn connection(&self) -> Option<ConnectionView> {
        self.session.current().map(|descriptor| ConnectionView {
            wallet: descriptor.name.clone(),
            ready_state: descriptor.capability.ready_state(),
            public_key: descriptor.capability.public_key(),
        })
    }

    pub fn ui(&self) -> UiState {
        project(&self.state, self.connection().as_ref())
    }

    /// Handle the wallet dropdown changing
    pub async fn select_wallet(&mut self, name: &str) {
        if self.state.is_terminal() || matches!(self.state, AuthFlowState::AwaitingSessionId) {
            debug!(wallet = %name, state = self.state.label(), "selection ignored");
            return;
        }

        match self.session.select(name).await {
            Ok(()) => {
                self.abandon_attempt();
                self.set_state(AuthFlowState::WalletSelected {
                    wallet: name.to_string(),
                });
            }
            Err(err) => {
                warn!(wallet = %name, error = %err, "wallet selection failed");
                self.fail(FailureKind::Selection, err.detail());
            }
        }
    }

    /// Handle a primary-button click
    pub fn click(&mut self) {
        if !self.ui().button_enabled {
            debug!(state = self.state.label(), "click ignored while controls are disabled");
            return;
        }

        let Some(descriptor) = self.session.current().cloned() else {
            self.fail(FailureKind::Selection, "No wallet selected.");
            return;
        };

        self.attempt += 1;
        // Connection status can change behind our back, so ask the provider.
        if descriptor.capability.connected() {
            self.begin_challenge();
        } else {
            self.begin_connect(descriptor);
        }
    }

    /// Wait for the next wallet event or step result and apply it.
    ///
    /// Wallet events take priority so a disconnect is seen before any result
    /// that raced with it.
    pub async fn process_next(&mut self) {
        tokio::select! {
            biased;
            Some(event) = self.wallet_rx.recv() => self.on_wallet_event(event),
            Some(completion) = self.step_rx.recv() => self.on_step(completion),
            else => {}
        }
    }

    /// Process inputs until no step is outstanding and no event is queued
    pub async fn settle(&mut self) {
        loop {
            while let Ok(event) = self.wallet_rx.try_recv() {
                self.on_wallet_event(event);
            }
            if self.pending_steps == 0 {
                return;
            }
            self.process_next().await;
        }
    }

    fn begin_connect(&mut self, wallet: WalletDescriptor) {
        if !wallet.capability.ready_state().is_usable() {
            self.fail(
                FailureKind::Connect,
                LinkError::WalletNotReady(wallet.name).detail(),
            );
            return;
        }

        info!(wallet = %wallet.name, attempt = self.attempt, "connecting wallet");
        self.set_state(AuthFlowState::Connecting {
            wallet: wallet.name.clone(),
        });
        self.spawn_step(async move {
            let result = wallet.capability.connect().await;
            StepOutcome::Connected { wallet, result }
        });
    }

    fn begin_challenge(&mut self) {
        let Some(session_id) = self.session_id.clone() else {
            self.fail(FailureKind::MissingSession, "missing session ID");
            return;
        };

        self.set_state(AuthFlowState::FetchingChallenge);
        let client = self.client.clone();
        self.spawn_step(async move {
            StepOutcome::Challenge(client.request_challenge(&session_id).await)
        });
    }

    fn begin_sign(&mut self, challenge: Challenge) {
        let Some(capability) = self.current_capability() else {
            self.fail(FailureKind::Selection, "No wallet selected.");
            return;
        };

        self.set_state(AuthFlowState::AwaitingSignature);
        self.spawn_step(async move {
            StepOutcome::Signed(capability.sign_message(challenge.as_bytes()).await)
        });
    }

    fn begin_verify(&mut self, signature: Vec<u8>) {
        let public_key = self
            .current_capability()
            .and_then(|capability| capability.public_key());
        let (Some(public_key), Some(session_id)) = (public_key, self.session_id.clone()) else {
            self.fail(FailureKind::Connect, LinkError::WalletNotConnected.detail());
            return;
        };

        self.set_state(AuthFlowState::Verifying);
        let client = self.client.clone();
        self.spawn_step(async move {
            let public_key = public_key.to_base58();
            StepOutcome::Verified(client.verify(&session_id, &public_key, &signature).await)
        });
    }

    fn spawn_step<F>(&mut self, step: F)
    where
        F: Future<Output = StepOutcome> + Send + 'static,
    {
        let attempt = self.attempt;
        let tx = self.step_tx.clone();
        self.pending_steps += 1;
        tokio::spawn(async move {
            let outcome = step.await;
            // Receiver gone means the controller was dropped mid-attempt.
            let _ = tx.send(StepCompletion { attempt, outcome });
        });
    }

    fn on_step(&mut self, completion: StepCompletion) {
        self.pending_steps = self.pending_steps.saturating_sub(1);
        if let StepOutcome::Released(result) = completion.outcome {
            if let Err(err) = result {
                warn!(error = %err, "failed to disconnect discarded wallet");
            }
            return;
        }
        if completion.attempt != self.attempt {
            debug!(
                attempt = completion.attempt,
                current = self.attempt,
                "discarding stale step result"
            );
            if let StepOutcome::Connected { wallet, result: Ok(()) } = completion.outcome {
                self.release_if_inactive(wallet);
            }
            return;
        }

        match completion.outcome {
            StepOutcome::Released(_) => {}
            StepOutcome::Connected { result: Ok(()), .. } => self.on_connected(),
            StepOutcome::Connected { result: Err(err), .. } => {
                warn!(error = %err, "wallet connection failed");
                self.fail(FailureKind::Connect, err.detail());
            }
            StepOutcome::Challenge(Ok(challenge)) => self.begin_sign(challenge),
            StepOutcome::Challenge(Err(err)) => {
                warn!(error = %err, "challenge request failed");
                self.fail(FailureKind::Challenge, err.detail());
            }
            StepOutcome::Signed(Ok(signature)) => self.begin_verify(signature),
            StepOutcome::Signed(Err(err)) => {
                warn!(error = %err, "message signing failed");
                let kind = if err.is_not_connected() {
                    FailureKind::Connect
                } else {
                    FailureKind::Sign
                };
                self.fail(kind, err.detail());
            }
            StepOutcome::Verified(Ok(result)) => {
                info!(attempt = self.attempt, "wallet link verified");
                self.set_state(AuthFlowState::Succeeded {
                    message: result.message,
                });
            }
            StepOutcome::Verified(Err(err)) => {
                warn!(error = %err, "signature verification failed");
                self.fail(FailureKind::Verify, err.detail());
            }
        }
    }

    /// A connect that resolved after its wallet was switched away must not
    /// leave that adapter connected
    fn release_if_inactive(&mut self, wallet: WalletDescriptor) {
        let active = self
            .session
            .current()
            .is_some_and(|current| current.name == wallet.name);
        if active || !wallet.capability.connected() {
            return;
        }

        info!(wallet = %wallet.name, "disconnecting wallet connected after switch");
        self.spawn_step(async move { StepOutcome::Released(wallet.capability.disconnect().await) });
    }

    /// `connect()` resolved; the connect event may or may not have arrived yet
    fn on_connected(&mut self) {
        let AuthFlowState::Connecting { wallet } = &self.state else {
            return;
        };
        let wallet = wallet.clone();

        match self.current_public_key() {
            Some(public_key) => self.enter_connected_idle(wallet, public_key),
            None => self.fail(FailureKind::Connect, "Could not connect the wallet."),
        }
    }

    fn on_wallet_event(&mut self, event: SessionEvent) {
        if event.selection != self.session.selection() {
            debug!(wallet = %event.wallet, "discarding event from previous wallet");
            return;
        }

        match event.kind {
            SessionEventKind::Connected(public_key) => {
                if let AuthFlowState::Connecting { wallet } = &self.state {
                    let wallet = wallet.clone();
                    self.enter_connected_idle(wallet, public_key);
                } else {
                    debug!(
                        wallet = %event.wallet,
                        state = self.state.label(),
                        "connect event outside connecting"
                    );
                }
            }
            SessionEventKind::Disconnected => {
                if !self.interrupted_by_disconnect() {
                    debug!(
                        wallet = %event.wallet,
                        state = self.state.label(),
                        "disconnect event ignored"
                    );
                    return;
                }
                info!(
                    wallet = %event.wallet,
                    state = self.state.label(),
                    "wallet disconnected, resetting flow"
                );
                self.abandon_attempt();
                self.set_state(AuthFlowState::WalletUnselected(
                    UnselectedReason::Disconnected(event.wallet),
                ));
            }
            SessionEventKind::Error(reason) => {
                warn!(wallet = %event.wallet, error = %reason, "wallet reported an error");
                if matches!(self.state, AuthFlowState::Connecting { .. }) {
                    self.abandon_attempt();
                    self.fail(FailureKind::Connect, reason);
                }
            }
        }
    }

    /// States that depend on a live connection
    fn interrupted_by_disconnect(&self) -> bool {
        match &self.state {
            AuthFlowState::Connecting { .. }
            | AuthFlowState::ConnectedIdle { .. }
            | AuthFlowState::FetchingChallenge
            | AuthFlowState::AwaitingSignature
            | AuthFlowState::Verifying => true,
            AuthFlowState::Failed(failure) => !failure.kind.is_terminal(),
            _ => false,
        }
    }

    fn enter_connected_idle(&mut self, wallet: String, public_key: WalletPublicKey) {
        info!(wallet = %wallet, public_key = %public_key, "wallet connected");
        self.set_state(AuthFlowState::ConnectedIdle { wallet, public_key });
    }

    fn current_capability(&self) -> Option<Arc<dyn WalletCapability>> {
        self.session
            .current()
            .map(|descriptor| descriptor.capability.clone())
    }

    fn current_public_key(&self) -> Option<WalletPublicKey> {
        self.current_capability()
            .filter(|capability| capability.connected())
            .and_then(|capability| capability.public_key())
    }

    /// Invalidate the in-flight attempt; its results will be dropped
    fn abandon_attempt(&mut self) {
        self.attempt += 1;
    }

    fn fail(&mut self, kind: FailureKind, detail: impl Into<String>) {
        self.set_state(AuthFlowState::Failed(FlowFailure::new(kind, detail)));
    }

    fn set_state(&mut self, state: AuthFlowState) {
        debug!(from = self.state.label(), to = state.label(), "flow transition");
        self.state = state;
    }
}
