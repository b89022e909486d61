//! HopscopeErrorCode trait for the response boundary.

/// Trait for converting hopscope errors to stable error codes.
/// Every error enum implements this so collaborators can branch on a
/// code string instead of parsing messages.
pub trait HopscopeErrorCode {
    /// Returns the error code string (e.g., "VALIDATION_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted coded string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants for the response boundary.
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const LICENSE_ERROR: &str = "LICENSE_ERROR";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const QUERY_SYNTAX_ERROR: &str = "QUERY_SYNTAX_ERROR";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
