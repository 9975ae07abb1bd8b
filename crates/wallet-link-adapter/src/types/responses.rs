/*
[INPUT]:  Backend API schema and serde requirements
[OUTPUT]: Typed response bodies for challenge and verification endpoints
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When the backend response schema changes
*/

use serde::{Deserialize, Serialize};

/// Successful `GET /api/generate-challenge` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub message: String,
}

/// Successful `POST /api/verify-signature` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body returned with any non-success status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<String>,
}
