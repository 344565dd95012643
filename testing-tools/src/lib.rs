//! Fixtures shared by integration-style tests across the workspace:
//! keypairs, minimal `ContextRequest` bodies, and an in-process bidder
//! double built on `wiremock` for the distribution fanout path.

use aip_transport::{generate_keypair_pem, sign_payload};
use aip_types::ContextRequest;
use chrono::Utc;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A generated Ed25519 keypair plus the PEM halves tests most often need
/// to wire a bidder entry and a matching signer.
pub struct Keypair {
    pub private_key_pem: String,
    pub public_key_pem: String,
}

impl Keypair {
    pub fn generate() -> Self {
        let (private_key_pem, public_key_pem) = generate_keypair_pem();
        Self { private_key_pem, public_key_pem }
    }
}

/// Builds a minimal, valid `ContextRequest` for the given session, with
/// every optional field left unset so tests only fill in what they care
/// about.
pub fn context_request(context_id: &str, session_id: &str) -> ContextRequest {
    ContextRequest {
        context_id: context_id.to_string(),
        session_id: session_id.to_string(),
        platform_id: None,
        operator_id: None,
        query_text: None,
        locale: None,
        geo: None,
        timestamp: Utc::now().to_rfc3339(),
        intent: None,
        allowed_formats: vec!["weave".to_string()],
        auth: None,
        verticals: None,
        extensions: None,
        category_pools: None,
        categories: None,
        pools: Some(json!(["default"])),
        context: None,
        features: None,
        request_id: None,
        serve_token_hint: None,
    }
}

/// Signs `payload` with `private_key_pem`, returning the base64
/// signature a bid/event envelope's `signature` field expects.
pub fn sign(payload: &Value, private_key_pem: &str) -> String {
    sign_payload(payload, private_key_pem).expect("valid signing key")
}

/// A stand-in bidder endpoint: responds `202 Accepted` to every POST on
/// `expected_path`, so auction-fanout tests only need the endpoint URL.
pub struct MockBidder {
    pub server: MockServer,
}

impl MockBidder {
    pub async fn start(expected_path: &str) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(expected_path))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "status": "accepted" })))
            .mount(&server)
            .await;
        Self { server }
    }

    pub fn endpoint(&self) -> String {
        self.server.uri()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypair_round_trips_a_signature() {
        let keypair = Keypair::generate();
        let payload = json!({ "price": "1.2500" });
        let signature = sign(&payload, &keypair.private_key_pem);
        aip_transport::verify_signature(&payload, &signature, &keypair.public_key_pem).unwrap();
    }

    #[tokio::test]
    async fn mock_bidder_accepts_posts() {
        let bidder = MockBidder::start("/bid").await;
        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/bid", bidder.endpoint()))
            .json(&json!({ "auction_id": "a1" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 202);
    }
}
