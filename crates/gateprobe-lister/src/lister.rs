use crate::error::{ListerError, Result};
use crate::resolver::resolve_rule;
use crate::traits::{EndpointSnapshotProvider, ServiceBindingResolver};
use gateprobe_core::{HttpOption, Ingress, IngressRule, ProbeTarget};
use std::sync::Arc;
use tracing::{debug, warn};

/// Lists the gateway pods to probe before an Ingress is reported ready
///
/// Holds no state of its own; it is safe to share behind an `Arc` and call
/// from many threads at once.
pub struct ProbeTargetLister {
    bindings: Arc<dyn ServiceBindingResolver>,
    endpoints: Arc<dyn EndpointSnapshotProvider>,
}

impl ProbeTargetLister {
    pub fn new(
        bindings: Arc<dyn ServiceBindingResolver>,
        endpoints: Arc<dyn EndpointSnapshotProvider>,
    ) -> Self {
        Self {
            bindings,
            endpoints,
        }
    }

    /// Probe targets for every rule of the Ingress, in rule order.
    ///
    /// The first rule that cannot be resolved fails the whole call; targets of
    /// earlier rules are discarded.
    pub fn list_probe_targets(&self, ingress: &Ingress) -> Result<Vec<ProbeTarget>> {
        let name = ingress.display_name();
        debug!(
            "Listing probe targets for ingress {} ({} rule(s))",
            name,
            ingress.spec.rules.len()
        );

        let mut targets = Vec::with_capacity(ingress.spec.rules.len());
        for rule in &ingress.spec.rules {
            let rule_targets = self
                .rule_probe_targets(rule, ingress.spec.http_option)
                .inspect_err(|e| {
                    warn!("Cannot list probe targets for ingress {}: {}", name, e)
                })?;
            targets.extend(rule_targets);
        }

        Ok(targets)
    }

    /// Probe targets for a single rule
    pub fn rule_probe_targets(
        &self,
        rule: &IngressRule,
        http_option: HttpOption,
    ) -> Result<Vec<ProbeTarget>> {
        let service = self.bindings.service_for(rule.visibility);

        let endpoints = self
            .endpoints
            .endpoints(&service)
            .map_err(|e| {
                ListerError::binding_lookup_failure(&service, e.to_string(), Some(Box::new(e)))
            })?
            .ok_or_else(|| {
                ListerError::binding_lookup_failure(&service, "endpoints not found", None)
            })?;

        resolve_rule(rule, http_option, &endpoints)
    }
}
