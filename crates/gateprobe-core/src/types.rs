use crate::error::{GateprobeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Namespaced identity of a Kubernetes Service (and of its Endpoints object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceIdentity {
    pub namespace: String,
    pub name: String,
}

impl ServiceIdentity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Parse a `namespace/name` reference
impl FromStr for ServiceIdentity {
    type Err = GateprobeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once('/') {
            Some((namespace, name))
                if !namespace.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(namespace, name))
            }
            _ => Err(GateprobeError::invalid_service_identity(s)),
        }
    }
}

impl Serialize for ServiceIdentity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ServiceIdentity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A resolved set of pods to probe, the port to dial on each of them, and the
/// URLs whose hosts are sent as `Host` / SNI.
///
/// One target is produced per endpoint subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeTarget {
    #[serde(serialize_with = "serialize_sorted")]
    pub pod_ips: HashSet<String>,
    pub pod_port: String,
    pub urls: Vec<Url>,
}

/// Emit a set in sorted order so rendered targets are stable across runs
fn serialize_sorted<S: serde::Serializer>(
    values: &HashSet<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().collect::<BTreeSet<_>>())
}
