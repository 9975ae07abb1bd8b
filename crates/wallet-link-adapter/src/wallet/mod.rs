/*
[INPUT]:  Wallet provider adapters and user wallet selections
[OUTPUT]: Registry, active session and normalized lifecycle events
[POS]:    Wallet layer - provider abstraction and ownership
[UPDATE]: When adding new provider adapters or changing switching rules
*/

pub mod capability;
pub mod keypair;
pub mod mock;
pub mod registry;
pub mod session;

pub use capability::{
    WalletCapability, WalletEvent, WalletEventKind, WalletListener, WalletListeners,
};
pub use keypair::KeypairWallet;
pub use mock::MockWallet;
pub use registry::{WalletDescriptor, WalletRegistry};
pub use session::{SessionEvent, SessionEventKind, WalletSession};
