/*
[INPUT]:  Session identifier, wallet public key and signature bytes
[OUTPUT]: One-time challenges and verification results
[POS]:    HTTP layer - challenge-response endpoints
[UPDATE]: When backend endpoints or payloads change
*/

use reqwest::Method;
use tracing::{debug, info};

use crate::http::{ChallengeClient, LinkError, Result};
use crate::types::{
    Challenge, ChallengeResponse, SESSION_ID_PARAM, SessionId, VerificationResult,
    VerifySignatureRequest,
};

const CHALLENGE_ENDPOINT: &str = "/api/generate-challenge";
const VERIFY_ENDPOINT: &str = "/api/verify-signature";

const CHALLENGE_FALLBACK: &str = "Could not obtain the challenge.";
const VERIFY_FALLBACK: &str = "Verification failed.";

impl ChallengeClient {
    /// Request a fresh challenge for the session
    ///
    /// GET /api/generate-challenge?session_id={id}
    pub async fn request_challenge(&self, session_id: &SessionId) -> Result<Challenge> {
        let mut url = self.endpoint_url(CHALLENGE_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair(SESSION_ID_PARAM, session_id.as_str());

        let builder = self.request(Method::GET, url);
        let response: ChallengeResponse = self
            .send_json(builder, LinkError::ChallengeUnavailable, CHALLENGE_FALLBACK)
            .await?;

        if response.message.is_empty() {
            return Err(LinkError::ChallengeUnavailable("empty challenge".to_string()));
        }
        debug!(session_id = %session_id, len = response.message.len(), "challenge received");
        Ok(Challenge::new(response.message))
    }

    /// Submit a signature over the challenge for verification
    ///
    /// POST /api/verify-signature
    pub async fn verify(
        &self,
        session_id: &SessionId,
        public_key_base58: &str,
        signature: &[u8],
    ) -> Result<VerificationResult> {
        let url = self.endpoint_url(VERIFY_ENDPOINT)?;
        let body = VerifySignatureRequest {
            session_id: session_id.as_str().to_string(),
            public_key: public_key_base58.to_string(),
            signature: signature.to_vec(),
        };

        let builder = self.request(Method::POST, url).json(&body);
        let result: VerificationResult = self
            .send_json(builder, LinkError::VerificationFailed, VERIFY_FALLBACK)
            .await?;

        info!(session_id = %session_id, public_key = %public_key_base58, "signature verified");
        Ok(result)
    }
}
