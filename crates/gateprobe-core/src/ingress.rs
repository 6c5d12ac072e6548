use crate::error::{GateprobeError, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API version of the networking Ingress resource
pub const INGRESS_API_VERSION: &str = "networking.internal.knative.dev/v1alpha1";

/// Kind of the networking Ingress resource
pub const INGRESS_KIND: &str = "Ingress";

/// Whether a rule is reachable from outside the cluster or only internally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IngressVisibility {
    #[default]
    #[serde(rename = "ExternalIP")]
    ExternalIp,
    ClusterLocal,
}

impl fmt::Display for IngressVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngressVisibility::ExternalIp => write!(f, "ExternalIP"),
            IngressVisibility::ClusterLocal => write!(f, "ClusterLocal"),
        }
    }
}

/// HTTP handling for external traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HttpOption {
    /// Plain HTTP is served
    #[default]
    Enabled,
    /// HTTP requests are redirected to HTTPS
    Redirected,
}

impl fmt::Display for HttpOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpOption::Enabled => write!(f, "Enabled"),
            HttpOption::Redirected => write!(f, "Redirected"),
        }
    }
}

/// A routing directive binding hosts to a backing gateway
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub visibility: IngressVisibility,
}

impl IngressRule {
    pub fn new<I, S>(hosts: I, visibility: IngressVisibility) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            visibility,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressSpec {
    #[serde(default)]
    pub rules: Vec<IngressRule>,
    #[serde(default)]
    pub http_option: HttpOption,
}

/// The routing object whose rules are resolved to probe targets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingress {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: IngressSpec,
}

fn default_api_version() -> String {
    INGRESS_API_VERSION.to_string()
}

fn default_kind() -> String {
    INGRESS_KIND.to_string()
}

impl Ingress {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, spec: IngressSpec) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some(namespace.into()),
                ..Default::default()
            },
            spec,
        }
    }

    /// `namespace/name`, for log and error messages
    pub fn display_name(&self) -> String {
        format!(
            "{}/{}",
            self.metadata.namespace.as_deref().unwrap_or("default"),
            self.metadata.name.as_deref().unwrap_or("<unnamed>")
        )
    }

    /// Validate the Ingress
    pub fn validate(&self) -> Result<()> {
        if self.kind != INGRESS_KIND {
            return Err(GateprobeError::validation_failed(
                "Ingress",
                format!("unexpected kind '{}'", self.kind),
                format!("Set kind to '{}'", INGRESS_KIND),
            ));
        }

        if self.metadata.name.as_deref().map_or(true, str::is_empty) {
            return Err(GateprobeError::validation_failed(
                "Ingress",
                "missing metadata.name",
                "Set metadata.name on the Ingress",
            ));
        }

        if self.spec.rules.is_empty() {
            return Err(GateprobeError::validation_failed(
                "Ingress",
                "spec.rules is empty",
                "Add at least one rule to the Ingress",
            ));
        }

        for (i, rule) in self.spec.rules.iter().enumerate() {
            if rule.hosts.is_empty() {
                return Err(GateprobeError::validation_failed(
                    "Ingress",
                    format!("spec.rules[{}].hosts is empty", i),
                    "Add at least one host to every rule",
                ));
            }

            if let Some(j) = rule.hosts.iter().position(|h| h.trim().is_empty()) {
                return Err(GateprobeError::validation_failed(
                    "Ingress",
                    format!("spec.rules[{}].hosts[{}] is empty", i, j),
                    "Hosts must be non-empty domain names",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ingress {
        Ingress::new(
            "hello",
            "default",
            IngressSpec {
                rules: vec![IngressRule::new(
                    ["hello.default.example.com"],
                    IngressVisibility::ExternalIp,
                )],
                http_option: HttpOption::Enabled,
            },
        )
    }

    #[test]
    fn test_deserialize_wire_names() {
        let yaml = r#"
apiVersion: networking.internal.knative.dev/v1alpha1
kind: Ingress
metadata:
  name: hello
  namespace: default
spec:
  httpOption: Redirected
  rules:
  - hosts:
    - hello.default.example.com
    visibility: ExternalIP
  - hosts:
    - hello.default.svc.cluster.local
    - hello.default.svc
    visibility: ClusterLocal
"#;
        let ing: Ingress = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(ing.spec.http_option, HttpOption::Redirected);
        assert_eq!(ing.spec.rules.len(), 2);
        assert_eq!(ing.spec.rules[0].visibility, IngressVisibility::ExternalIp);
        assert_eq!(ing.spec.rules[1].visibility, IngressVisibility::ClusterLocal);
        assert_eq!(
            ing.spec.rules[1].hosts,
            vec!["hello.default.svc.cluster.local", "hello.default.svc"]
        );
        assert_eq!(ing.display_name(), "default/hello");
        assert!(ing.validate().is_ok());
    }

    #[test]
    fn test_defaults_applied() {
        let yaml = r#"
metadata:
  name: hello
spec:
  rules:
  - hosts: [hello.example.com]
"#;
        let ing: Ingress = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(ing.api_version, INGRESS_API_VERSION);
        assert_eq!(ing.kind, INGRESS_KIND);
        assert_eq!(ing.spec.http_option, HttpOption::Enabled);
        assert_eq!(ing.spec.rules[0].visibility, IngressVisibility::ExternalIp);
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let mut ing = sample();
        ing.spec.http_option = HttpOption::Redirected;
        let json = serde_json::to_string(&ing).unwrap();
        assert!(json.contains("\"httpOption\":\"Redirected\""));
        assert!(json.contains("\"visibility\":\"ExternalIP\""));
    }

    #[test]
    fn test_validate_rejects_empty_rules() {
        let mut ing = sample();
        ing.spec.rules.clear();
        assert!(matches!(
            ing.validate(),
            Err(GateprobeError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_rule_without_hosts() {
        let mut ing = sample();
        ing.spec
            .rules
            .push(IngressRule::new(Vec::<String>::new(), IngressVisibility::ClusterLocal));
        let err = ing.validate().unwrap_err();
        assert!(err.to_string().contains("spec.rules[1].hosts is empty"));
    }

    #[test]
    fn test_validate_rejects_blank_host() {
        let mut ing = sample();
        ing.spec.rules[0].hosts.push("  ".to_string());
        let err = ing.validate().unwrap_err();
        assert!(err.to_string().contains("spec.rules[0].hosts[1] is empty"));
    }

    #[test]
    fn test_validate_requires_name() {
        let mut ing = sample();
        ing.metadata.name = None;
        assert!(ing.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_kind() {
        let mut ing = sample();
        ing.kind = "Service".to_string();
        assert!(ing.validate().is_err());
    }
}
