/*
[INPUT]:  Backend base URL and session id from the command line
[OUTPUT]: One headless run of the wallet link flow
[POS]:    Examples - link flow demonstration
[UPDATE]: When the controller API changes
*/

use std::sync::Arc;

use wallet_link_adapter::*;

/// Example: headless wallet link
///
/// Usage: cargo run --example link_example -- http://127.0.0.1:8000 <session_id>
#[tokio::main]
async fn main() {
    println!("=== Wallet Link Example ===\n");

    let mut args = std::env::args().skip(1);
    let base_url = args.next().unwrap_or_else(|| "http://127.0.0.1:8000".to_string());
    let session_id = args.next().and_then(SessionId::new);

    let client = match ChallengeClient::new(&base_url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };

    // Throwaway key; a real frontend registers browser wallet providers here.
    let wallet = KeypairWallet::generate("Demo");
    println!("✓ Demo wallet {}", wallet.address());
    let registry = WalletRegistry::new([Arc::new(wallet) as Arc<dyn WalletCapability>]);

    let session = WalletSession::new(registry);
    let mut controller = match AuthFlowController::new(session_id, session, client) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create controller: {}", e);
            return;
        }
    };
    controller.start().await;
    println!("{}", controller.ui().status);

    // Connect, then sign.
    for _ in 0..2 {
        if !controller.ui().button_enabled {
            break;
        }
        controller.click();
        controller.settle().await;
        println!("{}", controller.ui().status);
    }
}
