//! Signed license credentials.
//!
//! Compact JWS layout: `base64url(header).base64url(claims).base64url(sig)`,
//! header `{"alg":"EdDSA","typ":"JWT"}`, Ed25519 signature over the ASCII
//! bytes `header.claims`. Nothing in the claims segment is decoded until the
//! signature has verified.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, CredentialError};

/// The only accepted signature algorithm.
pub const CREDENTIAL_ALGORITHM: &str = "EdDSA";

/// Opaque signed license blob as received from the caller.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LicenseCredential(String);

impl LicenseCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Credential contents must never reach logs.
impl std::fmt::Debug for LicenseCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LicenseCredential(<{} bytes>)", self.0.len())
    }
}

/// License claims. Every field is optional on the wire; presence rules are
/// enforced by the validator after the signature checks out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseClaims {
    /// License holder (email or org name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// License tier: "community", "pro", "enterprise".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    /// Not-before (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    /// Expiration (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    /// Issued at (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// Unique credential id, used by revocation lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CredentialHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Verify a credential's signature and decode its claims.
pub fn verify_credential(
    credential: &LicenseCredential,
    key: &VerifyingKey,
) -> Result<LicenseClaims, CredentialError> {
    let token = credential.as_str().trim();
    let mut parts = token.split('.');
    let (Some(header_b64), Some(claims_b64), Some(sig_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(CredentialError::InvalidFormat);
    };

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| CredentialError::Base64 { part: "header" })?;
    let header: CredentialHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| CredentialError::Header(e.to_string()))?;
    if header.alg != CREDENTIAL_ALGORITHM {
        return Err(CredentialError::UnsupportedAlgorithm(header.alg));
    }

    let sig_bytes = URL_SAFE_NO_PAD
        .decode(sig_b64)
        .map_err(|_| CredentialError::Base64 { part: "signature" })?;
    let sig_array: [u8; 64] = sig_bytes
        .as_slice()
        .try_into()
        .map_err(|_| CredentialError::SignatureLength {
            len: sig_bytes.len(),
        })?;
    let signature = Signature::from_bytes(&sig_array);

    let signing_input = &token[..header_b64.len() + 1 + claims_b64.len()];
    key.verify_strict(signing_input.as_bytes(), &signature)
        .map_err(|_| CredentialError::SignatureMismatch)?;

    let claims_bytes = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .map_err(|_| CredentialError::Base64 { part: "claims" })?;
    serde_json::from_slice(&claims_bytes).map_err(|e| CredentialError::Claims(e.to_string()))
}

/// Sign claims into a credential. Issuance tooling and tests only; the
/// engine itself only verifies.
pub fn sign_credential(claims: &LicenseClaims, key: &SigningKey) -> LicenseCredential {
    let header = CredentialHeader {
        alg: CREDENTIAL_ALGORITHM.to_string(),
        typ: Some("JWT".to_string()),
    };
    let header_json = serde_json::to_vec(&header).unwrap_or_default();
    let claims_json = serde_json::to_vec(claims).unwrap_or_default();
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );
    let signature = key.sign(signing_input.as_bytes());
    LicenseCredential(format!(
        "{}.{}",
        signing_input,
        URL_SAFE_NO_PAD.encode(signature.to_bytes())
    ))
}

/// Decode a base64 (standard alphabet) Ed25519 public key.
pub fn decode_public_key(encoded: &str) -> Result<VerifyingKey, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        field: "licensing.public_key".to_string(),
        message,
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| invalid(format!("not valid base64: {}", e)))?;
    let array: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| invalid(format!("expected 32 bytes, got {}", bytes.len())))?;
    VerifyingKey::from_bytes(&array).map_err(|_| invalid("not a valid Ed25519 point".to_string()))
}

/// Encode a public key the way `decode_public_key` expects it.
pub fn encode_public_key(key: &VerifyingKey) -> String {
    STANDARD.encode(key.as_bytes())
}
