//! Request-path errors for neighborhood search and query evaluation.

use super::error_code::{self, HopscopeErrorCode};

/// Errors that fail a neighborhood request.
///
/// License problems are absent on purpose: they always resolve to a
/// Community fallback and surface only as response metadata.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NeighborhoodError {
    #[error("invalid request parameter {field}: {message}")]
    Validation { field: String, message: String },

    #[error("node not found: {id}")]
    NodeNotFound { id: String },

    #[error("query syntax error at position {position} near '{token}': {message}")]
    QuerySyntax {
        token: String,
        position: usize,
        message: String,
    },

    #[error("internal error")]
    Internal,
}

impl NeighborhoodError {
    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable kind used in response error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NodeNotFound { .. } => "not_found",
            Self::QuerySyntax { .. } => "query_syntax",
            Self::Internal => "internal",
        }
    }
}

impl HopscopeErrorCode for NeighborhoodError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => error_code::VALIDATION_ERROR,
            Self::NodeNotFound { .. } => error_code::NOT_FOUND,
            Self::QuerySyntax { .. } => error_code::QUERY_SYNTAX_ERROR,
            Self::Internal => error_code::INTERNAL_ERROR,
        }
    }
}

/// Convenience type alias.
pub type HopscopeResult<T> = Result<T, NeighborhoodError>;
