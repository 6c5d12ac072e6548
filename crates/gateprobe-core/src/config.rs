//! Gateway configuration: which gateway (and which Service in front of its
//! pods) serves each ingress visibility.
//!
//! The configuration is read from the `config-gateway` ConfigMap:
//!
//! ```yaml
//! data:
//!   external-gateways: |
//!     - class: istio
//!       gateway: istio-system/knative-gateway
//!       service: istio-system/istio-ingressgateway
//!   local-gateways: |
//!     - class: istio
//!       gateway: istio-system/knative-local-gateway
//!       service: istio-system/knative-local-gateway
//! ```

use crate::error::{GateprobeError, Result};
use crate::ingress::IngressVisibility;
use crate::types::ServiceIdentity;
use k8s_openapi::api::core::v1::ConfigMap;
use serde::{Deserialize, Serialize};

/// Name of the ConfigMap holding the gateway configuration
pub const GATEWAY_CONFIG_NAME: &str = "config-gateway";

/// ConfigMap key listing gateways for `ExternalIP` visibility
pub const EXTERNAL_GATEWAYS_KEY: &str = "external-gateways";

/// ConfigMap key listing gateways for `ClusterLocal` visibility
pub const LOCAL_GATEWAYS_KEY: &str = "local-gateways";

/// A gateway and the Service fronting its pods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayEntry {
    /// Gateway class (e.g. "istio")
    pub class: String,
    /// The Gateway resource
    pub gateway: ServiceIdentity,
    /// The Service whose Endpoints back the gateway
    pub service: ServiceIdentity,
}

/// Visibility to gateway binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    pub external: GatewayEntry,
    pub cluster_local: GatewayEntry,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            external: GatewayEntry {
                class: "istio".to_string(),
                gateway: ServiceIdentity::new("istio-system", "knative-gateway"),
                service: ServiceIdentity::new("istio-system", "istio-ingressgateway"),
            },
            cluster_local: GatewayEntry {
                class: "istio".to_string(),
                gateway: ServiceIdentity::new("istio-system", "knative-local-gateway"),
                service: ServiceIdentity::new("istio-system", "knative-local-gateway"),
            },
        }
    }
}

impl GatewayConfig {
    /// Build the configuration from the `config-gateway` ConfigMap.
    ///
    /// A missing key keeps the default for that visibility; unrelated keys
    /// such as `_example` are ignored.
    pub fn from_config_map(config_map: &ConfigMap) -> Result<Self> {
        let mut config = Self::default();
        let Some(data) = config_map.data.as_ref() else {
            return Ok(config);
        };

        if let Some(raw) = data.get(EXTERNAL_GATEWAYS_KEY) {
            config.external = parse_single_entry(EXTERNAL_GATEWAYS_KEY, raw)?;
        }
        if let Some(raw) = data.get(LOCAL_GATEWAYS_KEY) {
            config.cluster_local = parse_single_entry(LOCAL_GATEWAYS_KEY, raw)?;
        }

        Ok(config)
    }

    /// The gateway serving the given visibility
    pub fn entry(&self, visibility: IngressVisibility) -> &GatewayEntry {
        match visibility {
            IngressVisibility::ExternalIp => &self.external,
            IngressVisibility::ClusterLocal => &self.cluster_local,
        }
    }

    /// The Service whose Endpoints back the given visibility
    pub fn service(&self, visibility: IngressVisibility) -> &ServiceIdentity {
        &self.entry(visibility).service
    }
}

fn parse_single_entry(key: &str, raw: &str) -> Result<GatewayEntry> {
    let mut entries: Vec<GatewayEntry> = serde_yaml::from_str(raw).map_err(|e| {
        GateprobeError::invalid_config(
            format!("failed to parse '{}': {}", key, e),
            "Each entry needs 'class', 'gateway' and 'service', with references written as 'namespace/name'",
        )
    })?;

    match entries.len() {
        1 => Ok(entries.remove(0)),
        0 => Err(GateprobeError::invalid_config(
            format!("'{}' lists no gateways", key),
            format!("Configure exactly one gateway under '{}', or remove the key to use the default", key),
        )),
        n => Err(GateprobeError::invalid_config(
            format!("'{}' lists {} gateways, only one is supported", key, n),
            format!("Keep a single entry under '{}'", key),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config_map(entries: &[(&str, &str)]) -> ConfigMap {
        let data: BTreeMap<String, String> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigMap {
            data: Some(data),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_bindings() {
        let config = GatewayConfig::default();
        assert_eq!(
            config.service(IngressVisibility::ExternalIp).to_string(),
            "istio-system/istio-ingressgateway"
        );
        assert_eq!(
            config.service(IngressVisibility::ClusterLocal).to_string(),
            "istio-system/knative-local-gateway"
        );
    }

    #[test]
    fn test_from_config_map() {
        let cm = config_map(&[
            (
                EXTERNAL_GATEWAYS_KEY,
                "- class: contour\n  gateway: contour-external/knative-external\n  service: contour-external/envoy\n",
            ),
            (
                LOCAL_GATEWAYS_KEY,
                "- class: contour\n  gateway: contour-internal/knative-local\n  service: contour-internal/envoy\n",
            ),
            ("_example", "ignored: true"),
        ]);

        let config = GatewayConfig::from_config_map(&cm).unwrap();
        assert_eq!(config.external.class, "contour");
        assert_eq!(
            config.service(IngressVisibility::ExternalIp),
            &ServiceIdentity::new("contour-external", "envoy")
        );
        assert_eq!(
            config.entry(IngressVisibility::ClusterLocal).gateway,
            ServiceIdentity::new("contour-internal", "knative-local")
        );
    }

    #[test]
    fn test_missing_key_keeps_default() {
        let cm = config_map(&[(
            LOCAL_GATEWAYS_KEY,
            "- class: istio\n  gateway: mesh/local-gw\n  service: mesh/local-svc\n",
        )]);

        let config = GatewayConfig::from_config_map(&cm).unwrap();
        assert_eq!(config.external, GatewayConfig::default().external);
        assert_eq!(
            config.service(IngressVisibility::ClusterLocal),
            &ServiceIdentity::new("mesh", "local-svc")
        );
    }

    #[test]
    fn test_empty_config_map_is_default() {
        let config = GatewayConfig::from_config_map(&ConfigMap::default()).unwrap();
        assert_eq!(config, GatewayConfig::default());
    }

    #[test]
    fn test_rejects_multiple_entries() {
        let cm = config_map(&[(
            EXTERNAL_GATEWAYS_KEY,
            "- {class: a, gateway: ns/a, service: ns/a}\n- {class: b, gateway: ns/b, service: ns/b}\n",
        )]);
        let err = GatewayConfig::from_config_map(&cm).unwrap_err();
        assert!(matches!(err, GateprobeError::InvalidConfig { .. }));
        assert!(err.to_string().contains("only one is supported"));
    }

    #[test]
    fn test_rejects_empty_list() {
        let cm = config_map(&[(EXTERNAL_GATEWAYS_KEY, "[]")]);
        let err = GatewayConfig::from_config_map(&cm).unwrap_err();
        assert!(err.to_string().contains("lists no gateways"));
    }

    #[test]
    fn test_rejects_malformed_service_reference() {
        let cm = config_map(&[(
            EXTERNAL_GATEWAYS_KEY,
            "- class: istio\n  gateway: istio-system/knative-gateway\n  service: istio-ingressgateway\n",
        )]);
        let err = GatewayConfig::from_config_map(&cm).unwrap_err();
        assert!(matches!(err, GateprobeError::InvalidConfig { .. }));
    }
}
