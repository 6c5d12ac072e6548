use crate::error::Result;
use crate::traits::EndpointSnapshotProvider;
use gateprobe_core::{Endpoints, GateprobeError, ServiceIdentity};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// In-memory Endpoints store keyed by Service identity
///
/// Stands in for an informer-backed lister: whoever watches the cluster
/// upserts and removes objects, resolvers read point-in-time copies.
#[derive(Debug, Default)]
pub struct EndpointsCache {
    endpoints: RwLock<HashMap<ServiceIdentity, Endpoints>>,
}

impl EndpointsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache holding every given Endpoints object
    pub fn from_endpoints(endpoints: impl IntoIterator<Item = Endpoints>) -> Result<Self> {
        let cache = Self::new();
        for eps in endpoints {
            cache.upsert(eps)?;
        }
        Ok(cache)
    }

    /// Insert or replace an Endpoints object. The namespace defaults to
    /// `default` when unset.
    pub fn upsert(&self, endpoints: Endpoints) -> Result<()> {
        let key = identity_of(&endpoints)?;
        debug!("Caching endpoints {}", key);
        self.endpoints.write().insert(key, endpoints);
        Ok(())
    }

    /// Drop the Endpoints of a Service, returning what was cached
    pub fn remove(&self, service: &ServiceIdentity) -> Option<Endpoints> {
        debug!("Evicting endpoints {}", service);
        self.endpoints.write().remove(service)
    }

    pub fn len(&self) -> usize {
        self.endpoints.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EndpointSnapshotProvider for EndpointsCache {
    fn endpoints(&self, service: &ServiceIdentity) -> Result<Option<Endpoints>> {
        Ok(self.endpoints.read().get(service).cloned())
    }
}

fn identity_of(endpoints: &Endpoints) -> Result<ServiceIdentity> {
    let name = endpoints
        .metadata
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            GateprobeError::validation_failed(
                "Endpoints",
                "missing metadata.name",
                "Endpoints objects are named after the Service they back",
            )
        })?;
    let namespace = endpoints.metadata.namespace.as_deref().unwrap_or("default");
    Ok(ServiceIdentity::new(namespace, name))
}
