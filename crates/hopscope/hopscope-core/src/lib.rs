//! # hopscope-core
//!
//! Foundation crate for the hopscope neighborhood engine.
//! Defines tiers, capabilities, tier policies, license resolution, errors,
//! config and tracing. Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod licensing;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::HopscopeConfig;
pub use errors::error_code::HopscopeErrorCode;
pub use licensing::{
    Capability, CapabilitySet, LicenseCredential, LicenseTier, LicenseValidator, ResolutionReason,
    TierPolicy, TierPolicyRegistry, TierResolution,
};
pub use types::collections::FxHashSet;
