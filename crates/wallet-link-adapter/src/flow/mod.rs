/*
[INPUT]:  Wallet session, challenge client and user input
[OUTPUT]: Flow state machine and UI projection
[POS]:    Flow layer - orchestration of the wallet link protocol
[UPDATE]: When flow states or UI affordances change
*/

pub mod controller;
pub mod projector;

pub use controller::AuthFlowController;
pub use projector::{ButtonLabel, ConnectionView, UiState, project};
