use miette::Diagnostic;
use thiserror::Error;

/// Error type for probe target resolution
#[derive(Error, Debug, Diagnostic)]
pub enum ListerError {
    /// The backing Service has no live Endpoints, or the provider failed
    #[error("Failed to get endpoints for service {service}: {reason}")]
    #[diagnostic(
        code(gateprobe::lister::binding_lookup_failure),
        help("Verify the gateway Service exists and has an Endpoints object. A Service created moments ago may not be visible yet; retry on the next reconcile")
    )]
    BindingLookupFailure {
        #[allow(unused)]
        service: String,
        #[allow(unused)]
        reason: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A rule resolved to a Service without any ready address
    #[error("No gateway pods available for hosts [{hosts}] behind service {service}")]
    #[diagnostic(
        code(gateprobe::lister::no_reachable_targets),
        help("The gateway Service has no ready endpoints. Check that the gateway pods are running and passing their readiness probes")
    )]
    NoReachableTargets {
        #[allow(unused)]
        service: String,
        #[allow(unused)]
        hosts: String,
    },

    /// An endpoint subset cannot be probed
    #[error("Malformed endpoints for service {service}: {reason}")]
    #[diagnostic(
        code(gateprobe::lister::malformed_endpoints),
        help("Every endpoint subset must list at least one port")
    )]
    MalformedEndpoints {
        #[allow(unused)]
        service: String,
        #[allow(unused)]
        reason: String,
    },

    /// A rule host cannot be turned into a probe URL
    #[error("Invalid host '{host}': {reason}")]
    #[diagnostic(
        code(gateprobe::lister::invalid_host),
        help("Rule hosts must be plain domain names such as 'hello.default.example.com'")
    )]
    InvalidHost {
        #[allow(unused)]
        host: String,
        #[allow(unused)]
        reason: String,
    },

    /// Core library error
    #[error(transparent)]
    #[diagnostic(transparent)]
    CoreError(#[from] gateprobe_core::GateprobeError),
}

/// Result type alias for lister operations
pub type Result<T> = std::result::Result<T, ListerError>;

impl ListerError {
    pub fn binding_lookup_failure(
        service: impl ToString,
        reason: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::BindingLookupFailure {
            service: service.to_string(),
            reason: reason.into(),
            source,
        }
    }

    pub fn no_reachable_targets(service: impl ToString, hosts: &[String]) -> Self {
        Self::NoReachableTargets {
            service: service.to_string(),
            hosts: hosts.join(", "),
        }
    }

    pub fn malformed_endpoints(service: impl ToString, reason: impl Into<String>) -> Self {
        Self::MalformedEndpoints {
            service: service.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_host(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidHost {
            host: host.into(),
            reason: reason.into(),
        }
    }
}
