//! Configuration system for hopscope.
//! TOML-based, layered resolution: overrides > env > TOML text > defaults.
//! The core never reads files; callers hand over TOML text.

pub mod hopscope_config;
pub mod license_config;
pub mod search_config;
pub mod tier_config;

pub use hopscope_config::{ConfigOverrides, HopscopeConfig};
pub use license_config::{LicenseConfig, LicenseTier};
pub use search_config::SearchConfig;
pub use tier_config::{TierLimitsConfig, TierTableConfig};
