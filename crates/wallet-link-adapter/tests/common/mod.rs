/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for wallet-link-adapter tests

use std::sync::Arc;
use std::time::Duration;

use wallet_link_adapter::{
    AuthFlowController, ChallengeClient, MockWallet, SessionId, WalletCapability,
    WalletPublicKey, WalletRegistry, WalletSession,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SESSION_ID: &str = "abc123";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

#[allow(dead_code)]
/// Deterministic public key for a mock wallet
pub fn test_public_key(byte: u8) -> WalletPublicKey {
    WalletPublicKey::from_bytes([byte; 32])
}

#[allow(dead_code)]
pub fn mock_wallet(name: &str, byte: u8) -> Arc<MockWallet> {
    Arc::new(MockWallet::new(name, test_public_key(byte)))
}

/// Controller wired to the mock server with the given wallets
#[allow(dead_code)]
pub fn build_controller(
    server: &MockServer,
    session_id: Option<&str>,
    wallets: &[Arc<MockWallet>],
) -> AuthFlowController {
    let registry = WalletRegistry::new(
        wallets
            .iter()
            .map(|wallet| wallet.clone() as Arc<dyn WalletCapability>),
    );
    let client = ChallengeClient::new(&server.uri()).unwrap();
    AuthFlowController::new(
        session_id.and_then(SessionId::new),
        WalletSession::new(registry),
        client,
    )
    .unwrap()
}

/// Serve `message` from the challenge endpoint, expecting `times` calls
pub async fn mount_challenge(server: &MockServer, message: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path("/api/generate-challenge"))
        .and(query_param("session_id", SESSION_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": message,
        })))
        .expect(times)
        .mount(server)
        .await;
}

/// Accept any verification with `message`, optionally delayed
#[allow(dead_code)]
pub async fn mount_verify(server: &MockServer, message: &str, delay: Option<Duration>) {
    let mut response = ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "status": "success",
        "message": message,
    }));
    if let Some(delay) = delay {
        response = response.set_delay(delay);
    }
    Mock::given(method("POST"))
        .and(path("/api/verify-signature"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

/// Start the controller and connect the default wallet
#[allow(dead_code)]
pub async fn start_connected(controller: &mut AuthFlowController) {
    controller.start().await;
    controller.click();
    controller.settle().await;
}
