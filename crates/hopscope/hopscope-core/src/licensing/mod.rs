//! Licensing & tier resolution: 3-tier capability gating with signed credentials.
//!
//! ## Tiers
//! - **Community** (free): neighborhood search, confidence filtering
//! - **Pro**: + semantic neighbor inference
//! - **Enterprise**: + predicate query language
//!
//! ## Components
//! - **features**: gated capabilities and capability sets
//! - **policy**: immutable tier → limits/capabilities registry
//! - **credential**: Ed25519-signed credential decoding and verification
//! - **validator**: LicenseValidator: verify, check claims, resolve tier
//! - **cache**: verification cache for byte-identical credentials

pub mod cache;
pub mod credential;
pub mod features;
pub mod policy;
pub mod validator;

pub use crate::config::license_config::LicenseTier;
pub use cache::ResolutionCache;
pub use credential::{
    decode_public_key, encode_public_key, sign_credential, verify_credential, LicenseClaims,
    LicenseCredential,
};
pub use features::{Capability, CapabilitySet};
pub use policy::{TierPolicy, TierPolicyRegistry};
pub use validator::{LicenseValidator, ResolutionReason, RevocationCheck, TierResolution};
