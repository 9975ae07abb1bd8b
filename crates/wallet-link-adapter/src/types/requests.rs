/*
[INPUT]:  Backend API schema and serde requirements
[OUTPUT]: Typed request bodies for the verification endpoint
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When the backend request schema changes
*/

use serde::{Deserialize, Serialize};

/// Body of `POST /api/verify-signature`
///
/// `signature` is sent as a JSON array of byte values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifySignatureRequest {
    pub session_id: String,
    pub public_key: String,
    pub signature: Vec<u8>,
}
