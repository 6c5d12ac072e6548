use crate::error::Result;
use gateprobe_core::{Endpoints, GatewayConfig, IngressVisibility, ServiceIdentity};

/// Maps a rule's visibility to the Service fronting the gateway that serves it.
///
/// Implementations must be deterministic for a given configuration snapshot.
pub trait ServiceBindingResolver: Send + Sync {
    /// Identity of the Service backing `visibility`
    fn service_for(&self, visibility: IngressVisibility) -> ServiceIdentity;
}

/// Point-in-time view of the Endpoints behind a Service.
///
/// Snapshots may be stale: a Service created moments ago can legitimately
/// report no Endpoints, or Endpoints without subsets.
pub trait EndpointSnapshotProvider: Send + Sync {
    /// Current Endpoints for `service`, `None` if there is no such object
    fn endpoints(&self, service: &ServiceIdentity) -> Result<Option<Endpoints>>;
}

impl ServiceBindingResolver for GatewayConfig {
    fn service_for(&self, visibility: IngressVisibility) -> ServiceIdentity {
        self.service(visibility).clone()
    }
}
