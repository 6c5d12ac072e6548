//! Gateprobe Core - Data model for gateway readiness probing
//!
//! This crate provides:
//! - The networking Ingress resource and its rules
//! - Gateway configuration (visibility to Service binding)
//! - Probe target and service identity types
//! - Error types with miette diagnostics
//! - Manifest serialization helpers

pub mod config;
pub mod error;
pub mod ingress;
pub mod types;

use serde::Deserialize;
use std::path::Path;

// Re-export commonly used types
pub use config::{GatewayConfig, GatewayEntry, GATEWAY_CONFIG_NAME};
pub use error::{GateprobeError, Result};
pub use ingress::{HttpOption, Ingress, IngressRule, IngressSpec, IngressVisibility};
pub use types::{ProbeTarget, ServiceIdentity};

// Re-export k8s-openapi types for convenience
pub use k8s_openapi;
pub use k8s_openapi::api::core::v1::{
    ConfigMap, EndpointAddress, EndpointPort, EndpointSubset, Endpoints,
};
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
pub use url::Url;

/// Serialize a resource to JSON
pub fn to_json<T: serde::Serialize>(resource: &T) -> Result<String> {
    serde_json::to_string(resource).map_err(|e| {
        GateprobeError::serialization_error(
            format!("Failed to serialize to JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Serialize a resource to pretty JSON
pub fn to_json_pretty<T: serde::Serialize>(resource: &T) -> Result<String> {
    serde_json::to_string_pretty(resource).map_err(|e| {
        GateprobeError::serialization_error(
            format!("Failed to serialize to JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize a resource from JSON
pub fn from_json<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<T> {
    serde_json::from_str(data).map_err(|e| {
        GateprobeError::serialization_error(
            format!("Failed to deserialize from JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Serialize a resource to YAML
pub fn to_yaml<T: serde::Serialize>(resource: &T) -> Result<String> {
    serde_yaml::to_string(resource).map_err(|e| {
        GateprobeError::serialization_error(
            format!("Failed to serialize to YAML: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize a resource from YAML
pub fn from_yaml<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<T> {
    serde_yaml::from_str(data).map_err(|e| {
        GateprobeError::serialization_error(
            format!("Failed to deserialize from YAML: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize every document of a `---` separated YAML stream.
/// Empty documents are skipped.
pub fn from_yaml_documents<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<Vec<T>> {
    let mut resources = Vec::new();
    for (i, document) in serde_yaml::Deserializer::from_str(data).enumerate() {
        let value = serde_yaml::Value::deserialize(document).map_err(|e| {
            GateprobeError::serialization_error(
                format!("Failed to parse YAML document {}: {}", i, e),
                Some(Box::new(e)),
            )
        })?;
        if value.is_null() {
            continue;
        }
        let resource = serde_yaml::from_value(value).map_err(|e| {
            GateprobeError::serialization_error(
                format!("Failed to deserialize YAML document {}: {}", i, e),
                Some(Box::new(e)),
            )
        })?;
        resources.push(resource);
    }
    Ok(resources)
}

/// Read a manifest file into memory
pub fn read_manifest(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| {
        GateprobeError::io_error(
            format!("Failed to read {}: {}", path.display(), e),
            Some(Box::new(e)),
        )
    })
}
