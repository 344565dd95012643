//! Ed25519 signature verification and signing over canonical JSON (§4.1).
//!
//! Keys are exchanged as PEM (PKCS#8 private / SPKI public), matching the
//! `cryptography.hazmat` PEM loaders used by the original server.

use aip_types::AipError;
use base64::Engine;
use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::Serialize;

use crate::canonical::to_canonical_bytes;

fn load_verifying_key(pem_str: &str) -> Result<VerifyingKey, AipError> {
    if pem_str.trim().is_empty() {
        return Err(AipError::SignatureMissing);
    }
    VerifyingKey::from_public_key_pem(pem_str)
        .map_err(|e| AipError::SignatureMalformed(format!("invalid ed25519 public key: {e}")))
}

fn load_signing_key(pem_str: &str) -> Result<SigningKey, AipError> {
    if pem_str.trim().is_empty() {
        return Err(AipError::SignatureMissing);
    }
    SigningKey::from_pkcs8_pem(pem_str)
        .map_err(|e| AipError::SignatureMalformed(format!("invalid ed25519 private key: {e}")))
}

/// Verifies `signature_b64` (base64 Ed25519) over `canonical_bytes(payload)`
/// using `public_key_pem`. Fails with `SignatureMissing`, `SignatureMalformed`,
/// or `SignatureInvalid` (§4.1).
pub fn verify_signature<T: Serialize>(
    payload: &T,
    signature_b64: &str,
    public_key_pem: &str,
) -> Result<(), AipError> {
    if signature_b64.is_empty() {
        return Err(AipError::SignatureMissing);
    }
    let public_key = load_verifying_key(public_key_pem)?;
    let sig_bytes = base64::engine::general_purpose::STANDARD
        .decode(signature_b64)
        .map_err(|e| AipError::SignatureMalformed(format!("signature is not base64: {e}")))?;
    let sig_array: [u8; 64] = sig_bytes
        .as_slice()
        .try_into()
        .map_err(|_| AipError::SignatureMalformed("signature is not 64 bytes".into()))?;
    let signature = Signature::from_bytes(&sig_array);
    let canonical =
        to_canonical_bytes(payload).map_err(|e| AipError::Internal(format!("canonicalize: {e}")))?;
    public_key
        .verify(&canonical, &signature)
        .map_err(|_| AipError::SignatureInvalid)
}

/// Signs `payload` with an Ed25519 private key, returning a base64
/// signature. Used by tests and by the `testing-tools` fixtures that
/// play the bidder/event-submitter role.
pub fn sign_payload<T: Serialize>(payload: &T, private_key_pem: &str) -> Result<String, AipError> {
    let signing_key = load_signing_key(private_key_pem)?;
    let canonical =
        to_canonical_bytes(payload).map_err(|e| AipError::Internal(format!("canonicalize: {e}")))?;
    let signature = signing_key.sign(&canonical);
    Ok(base64::engine::general_purpose::STANDARD.encode(signature.to_bytes()))
}

/// PEM-encodes a freshly generated Ed25519 keypair as `(private, public)`.
pub fn generate_keypair_pem() -> (String, String) {
    use ed25519_dalek::pkcs8::{EncodePrivateKey, EncodePublicKey};
    use rand::rngs::OsRng;

    let signing_key = SigningKey::generate(&mut OsRng);
    let verifying_key = signing_key.verifying_key();
    let private_pem = signing_key
        .to_pkcs8_pem(Default::default())
        .expect("valid pkcs8 encoding")
        .to_string();
    let public_pem = verifying_key
        .to_public_key_pem(Default::default())
        .expect("valid spki encoding");
    (private_pem, public_pem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sign_then_verify_round_trips() {
        let (private_pem, public_pem) = generate_keypair_pem();
        let payload = json!({"a": 1, "b": "two"});
        let sig_b64 = sign_payload(&payload, &private_pem).unwrap();
        verify_signature(&payload, &sig_b64, &public_pem).unwrap();
    }

    #[test]
    fn single_bit_mutation_of_payload_fails() {
        let (private_pem, public_pem) = generate_keypair_pem();
        let payload = json!({"a": 1});
        let sig_b64 = sign_payload(&payload, &private_pem).unwrap();
        let mutated = json!({"a": 2});
        assert!(verify_signature(&mutated, &sig_b64, &public_pem).is_err());
    }

    #[test]
    fn signature_from_wrong_key_fails() {
        let (private_pem, _public_pem) = generate_keypair_pem();
        let (_other_private, other_public_pem) = generate_keypair_pem();
        let payload = json!({"a": 1});
        let sig_b64 = sign_payload(&payload, &private_pem).unwrap();
        assert!(verify_signature(&payload, &sig_b64, &other_public_pem).is_err());
    }

    #[test]
    fn missing_signature_is_rejected() {
        let (_private_pem, public_pem) = generate_keypair_pem();
        let err = verify_signature(&json!({"a": 1}), "", &public_pem).unwrap_err();
        assert_eq!(err, AipError::SignatureMissing);
    }

    #[test]
    fn malformed_base64_is_rejected() {
        let (_private_pem, public_pem) = generate_keypair_pem();
        let err = verify_signature(&json!({"a": 1}), "not-base64!!", &public_pem).unwrap_err();
        assert!(matches!(err, AipError::SignatureMalformed(_)));
    }
}
