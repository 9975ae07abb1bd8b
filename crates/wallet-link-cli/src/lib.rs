/*
[INPUT]:  Public API exports for wallet-link-cli crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod runner;

// Re-export main types for convenience
pub use config::{LinkConfig, WalletConfig, resolve_session_id};
pub use runner::{RunMode, RunOutcome, run};
