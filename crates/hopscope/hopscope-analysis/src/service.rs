//! NeighborhoodService: the per-request pipeline.
//!
//! resolve tier → validate → parse query → search → semantic augmentation
//! → apply query → assemble. Shared state is read-only (`Arc`), so one
//! service instance can serve every worker of the host's dispatcher.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use hopscope_core::config::{HopscopeConfig, SearchConfig};
use hopscope_core::errors::{ConfigError, HopscopeResult, NeighborhoodError};
use hopscope_core::licensing::{
    Capability, LicenseCredential, LicenseValidator, TierPolicyRegistry, TierResolution,
};
use tracing::{debug, error, info};

use crate::graph::GraphSnapshot;
use crate::neighborhood::{
    search, NeighborhoodRequest, RequestParams, SearchBudget, SearchWarning,
};
use crate::query;
use crate::response::{assemble, NeighborhoodResponse, RequestedFeatures};
use crate::semantic::{augment, SemanticOptions};

#[derive(Debug, Clone)]
pub struct NeighborhoodService {
    registry: Arc<TierPolicyRegistry>,
    validator: Arc<LicenseValidator>,
    snapshot: Arc<GraphSnapshot>,
    search: SearchConfig,
}

impl NeighborhoodService {
    pub fn new(
        registry: Arc<TierPolicyRegistry>,
        validator: Arc<LicenseValidator>,
        snapshot: Arc<GraphSnapshot>,
        search: SearchConfig,
    ) -> Self {
        Self {
            registry,
            validator,
            snapshot,
            search,
        }
    }

    /// Build registry and validator from a resolved configuration.
    pub fn from_config(
        config: &HopscopeConfig,
        snapshot: Arc<GraphSnapshot>,
    ) -> Result<Self, ConfigError> {
        let registry = TierPolicyRegistry::from_config(&config.tiers)?;
        let validator = LicenseValidator::from_config(&config.licensing)?;
        info!(
            nodes = snapshot.node_count(),
            edges = snapshot.edge_count(),
            "neighborhood service ready"
        );
        Ok(Self::new(
            Arc::new(registry),
            Arc::new(validator),
            snapshot,
            config.search.clone(),
        ))
    }

    pub fn registry(&self) -> &TierPolicyRegistry {
        &self.registry
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    /// Handle one wire request. Never panics and never returns an error:
    /// failures are carried in the response's `error` payload.
    pub fn handle(&self, params: &RequestParams, now: u64) -> NeighborhoodResponse {
        match panic::catch_unwind(AssertUnwindSafe(|| self.handle_inner(params, now))) {
            Ok(response) => response,
            Err(_) => {
                error!(center = %params.center_node_id, "neighborhood pipeline panicked");
                NeighborhoodResponse::from_error(&NeighborhoodError::Internal)
            }
        }
    }

    fn handle_inner(&self, params: &RequestParams, now: u64) -> NeighborhoodResponse {
        let credential = params
            .license_credential
            .as_deref()
            .map(LicenseCredential::new);
        let resolution = self.validator.resolve(credential.as_ref(), now);

        let outcome = NeighborhoodRequest::try_from(params)
            .and_then(|request| self.execute(&request, &resolution));
        match outcome {
            Ok(response) => response,
            Err(err) => {
                debug!(kind = err.kind(), error = %err, "neighborhood request failed");
                NeighborhoodResponse::from_error(&err)
            }
        }
    }

    /// Run a validated request at an already resolved tier.
    pub fn execute(
        &self,
        request: &NeighborhoodRequest,
        resolution: &TierResolution,
    ) -> HopscopeResult<NeighborhoodResponse> {
        let policy = self.registry.policy_for(resolution.tier);
        let parsed_query = match request.query {
            Some(ref text) if policy.allows(Capability::QueryLanguage) => {
                Some(query::parse(text)?)
            }
            _ => None,
        };

        let mut budget = SearchBudget::from_config(&self.search);
        let mut result = search(&self.snapshot, request, policy, &mut budget)?;

        if request.include_semantic != Some(false) {
            if policy.allows(Capability::SemanticNeighbors) {
                let options = SemanticOptions {
                    min_score: self
                        .search
                        .effective_semantic_min_score()
                        .max(request.min_confidence),
                    max_per_node: self.search.effective_semantic_max_per_node(),
                    node_cap: request.requested_node_cap,
                    max_depth: Some(request.requested_hops.min(policy.max_hops)),
                };
                result = augment(&self.snapshot, result, policy, &options, &mut budget);
            } else if request.include_semantic == Some(true) {
                result.push_warning(self.denied(Capability::SemanticNeighbors));
            }
        }

        match parsed_query {
            Some(ref parsed) => result = query::apply(parsed, result),
            None if request.query.is_some() => {
                result.push_warning(self.denied(Capability::QueryLanguage));
            }
            None => {}
        }

        Ok(assemble(
            result,
            resolution,
            &self.registry,
            RequestedFeatures::from_request(request),
        ))
    }

    fn denied(&self, capability: Capability) -> SearchWarning {
        SearchWarning::CapabilityDenied {
            capability,
            required_tier: self.registry.min_tier_for(capability),
        }
    }
}
