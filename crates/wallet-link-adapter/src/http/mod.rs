/*
[INPUT]:  HTTP client configuration and backend endpoints
[OUTPUT]: Challenges, verification results and unified errors
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod challenge;
pub mod client;
pub mod error;

pub use error::{LinkError, Result};

pub use client::{ChallengeClient, ClientConfig};
