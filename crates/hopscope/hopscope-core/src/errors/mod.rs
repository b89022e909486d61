//! Error handling for hopscope.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod credential_error;
pub mod error_code;
pub mod neighborhood_error;

pub use config_error::ConfigError;
pub use credential_error::CredentialError;
pub use error_code::HopscopeErrorCode;
pub use neighborhood_error::{HopscopeResult, NeighborhoodError};
