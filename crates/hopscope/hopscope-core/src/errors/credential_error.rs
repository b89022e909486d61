//! License credential errors.
//!
//! These never reach a caller: the validator maps every variant to a
//! Community fallback with a diagnostic reason.

use super::error_code::{self, HopscopeErrorCode};

/// Errors raised while decoding or verifying a license credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Invalid credential format: expected 3 dot-separated parts")]
    InvalidFormat,

    #[error("Base64 decode failed in {part}")]
    Base64 { part: &'static str },

    #[error("Malformed credential header: {0}")]
    Header(String),

    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Signature has wrong length: {len} bytes")]
    SignatureLength { len: usize },

    #[error("Signature does not match the trust anchor")]
    SignatureMismatch,

    #[error("Malformed claims: {0}")]
    Claims(String),
}

impl HopscopeErrorCode for CredentialError {
    fn error_code(&self) -> &'static str {
        error_code::LICENSE_ERROR
    }
}
