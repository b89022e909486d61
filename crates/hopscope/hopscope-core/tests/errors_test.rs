//! Error code and message formatting tests.

use hopscope_core::errors::{ConfigError, CredentialError, NeighborhoodError};
use hopscope_core::HopscopeErrorCode;

#[test]
fn neighborhood_error_codes_and_kinds() {
    let cases = [
        (
            NeighborhoodError::validation("max_hops", "must not be negative"),
            "VALIDATION_ERROR",
            "validation",
        ),
        (
            NeighborhoodError::NodeNotFound {
                id: "fn:main".to_string(),
            },
            "NOT_FOUND",
            "not_found",
        ),
        (
            NeighborhoodError::QuerySyntax {
                token: "ORDR".to_string(),
                position: 18,
                message: "expected ORDER BY or LIMIT".to_string(),
            },
            "QUERY_SYNTAX_ERROR",
            "query_syntax",
        ),
        (NeighborhoodError::Internal, "INTERNAL_ERROR", "internal"),
    ];
    for (err, code, kind) in cases {
        assert_eq!(err.error_code(), code);
        assert_eq!(err.kind(), kind);
        assert!(err.coded_string().starts_with(&format!("[{}] ", code)));
    }
}

#[test]
fn query_syntax_message_names_token_and_position() {
    let err = NeighborhoodError::QuerySyntax {
        token: ">>".to_string(),
        position: 17,
        message: "unexpected character".to_string(),
    };
    let text = err.to_string();
    assert!(text.contains("17"));
    assert!(text.contains(">>"));
}

#[test]
fn internal_error_hides_details() {
    assert_eq!(NeighborhoodError::Internal.to_string(), "internal error");
}

#[test]
fn config_and_credential_codes() {
    let err = ConfigError::ValidationFailed {
        field: "search.time_budget_ms".to_string(),
        message: "must be greater than 0".to_string(),
    };
    assert_eq!(err.error_code(), "CONFIG_ERROR");
    assert!(err.to_string().contains("search.time_budget_ms"));

    assert_eq!(CredentialError::SignatureMismatch.error_code(), "LICENSE_ERROR");
    assert_eq!(
        CredentialError::SignatureLength { len: 12 }.to_string(),
        "Signature has wrong length: 12 bytes"
    );
}
