// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Core error type for gateprobe data model and configuration handling
#[derive(Error, Debug, Diagnostic)]
pub enum GateprobeError {
    /// Gateway configuration could not be used
    #[error("Invalid gateway configuration: {message}")]
    #[diagnostic(code(gateprobe::invalid_config), help("{suggestion}"))]
    InvalidConfig {
        #[allow(unused)]
        message: String,
        #[allow(unused)]
        suggestion: String,
    },

    /// Validation failed
    #[error("Validation failed for {resource_type}: {details}")]
    #[diagnostic(code(gateprobe::validation_failed), help("{help_text}"))]
    ValidationFailed {
        #[allow(unused)]
        resource_type: String,
        #[allow(unused)]
        details: String,
        #[allow(unused)]
        help_text: String,
    },

    /// Malformed `namespace/name` reference
    #[error("Invalid service reference: '{value}'")]
    #[diagnostic(
        code(gateprobe::invalid_service_identity),
        help("Service references must have the form 'namespace/name', e.g. 'istio-system/istio-ingressgateway'")
    )]
    InvalidServiceIdentity {
        #[allow(unused)]
        value: String,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    #[diagnostic(
        code(gateprobe::serialization_error),
        help("Ensure the manifest is valid JSON or YAML")
    )]
    SerializationError {
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O error
    #[error("I/O error: {message}")]
    #[diagnostic(
        code(gateprobe::io_error),
        help("Check that the file exists and is readable")
    )]
    IoError {
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for gateprobe core operations
pub type Result<T> = std::result::Result<T, GateprobeError>;

impl GateprobeError {
    /// Create an InvalidConfig error
    pub fn invalid_config(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a ValidationFailed error
    pub fn validation_failed(
        resource_type: impl Into<String>,
        details: impl Into<String>,
        help_text: impl Into<String>,
    ) -> Self {
        Self::ValidationFailed {
            resource_type: resource_type.into(),
            details: details.into(),
            help_text: help_text.into(),
        }
    }

    /// Create an InvalidServiceIdentity error
    pub fn invalid_service_identity(value: impl Into<String>) -> Self {
        Self::InvalidServiceIdentity {
            value: value.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source,
        }
    }

    /// Create an IoError
    pub fn io_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::IoError {
            message: message.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = GateprobeError::invalid_service_identity("no-slash");
        assert!(matches!(err, GateprobeError::InvalidServiceIdentity { .. }));
        assert_eq!(err.to_string(), "Invalid service reference: 'no-slash'");

        let err = GateprobeError::validation_failed(
            "Ingress",
            "rule 0 has no hosts",
            "Add at least one host to every rule",
        );
        assert!(matches!(err, GateprobeError::ValidationFailed { .. }));
    }
}
