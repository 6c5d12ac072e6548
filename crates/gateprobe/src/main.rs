use clap::{Parser, Subcommand, ValueEnum};
use gateprobe_core::{
    from_yaml, from_yaml_documents, read_manifest, to_json_pretty, to_yaml, ConfigMap, Endpoints,
    GatewayConfig, Ingress, ProbeTarget, GATEWAY_CONFIG_NAME,
};
use gateprobe_lister::{EndpointsCache, ProbeTargetLister};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "gateprobe", about = "Resolve the gateway pods to probe for an Ingress")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the probe targets of an Ingress
    Targets {
        /// Path to the Ingress manifest
        #[arg(long)]
        ingress: PathBuf,
        /// Path to the gateway Endpoints manifests (multi-document YAML)
        #[arg(long)]
        endpoints: PathBuf,
        /// Path to the config-gateway ConfigMap manifest
        #[arg(long, env = "GATEPROBE_GATEWAY_CONFIG")]
        gateway_config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },
    /// Show which gateway serves each visibility
    Gateways {
        /// Path to the config-gateway ConfigMap manifest
        #[arg(long, env = "GATEPROBE_GATEWAY_CONFIG")]
        gateway_config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },
}

fn main() -> miette::Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Targets {
            ingress,
            endpoints,
            gateway_config,
            output,
        } => {
            let targets = resolve_targets(&ingress, &endpoints, gateway_config.as_deref())?;
            println!("{}", render(&targets, output)?);
            Ok(())
        }
        Commands::Gateways {
            gateway_config,
            output,
        } => {
            let config = load_gateway_config(gateway_config.as_deref())?;
            println!("{}", render(&config, output)?);
            Ok(())
        }
    }
}

/// Load the manifests and resolve the Ingress against them
fn resolve_targets(
    ingress_path: &Path,
    endpoints_path: &Path,
    gateway_config: Option<&Path>,
) -> miette::Result<Vec<ProbeTarget>> {
    let gateways = load_gateway_config(gateway_config)?;

    let ingress: Ingress = from_yaml(&read_manifest(ingress_path)?)?;
    ingress.validate()?;

    let endpoints: Vec<Endpoints> = from_yaml_documents(&read_manifest(endpoints_path)?)?;
    info!(
        "Loaded {} endpoints object(s) from {}",
        endpoints.len(),
        endpoints_path.display()
    );

    let lister = ProbeTargetLister::new(
        Arc::new(gateways),
        Arc::new(EndpointsCache::from_endpoints(endpoints)?),
    );
    let targets = lister.list_probe_targets(&ingress)?;

    info!(
        "Resolved {} probe target(s) for ingress {}",
        targets.len(),
        ingress.display_name()
    );

    Ok(targets)
}

fn load_gateway_config(path: Option<&Path>) -> miette::Result<GatewayConfig> {
    let Some(path) = path else {
        info!("No gateway configuration given, using defaults");
        return Ok(GatewayConfig::default());
    };

    let config_map: ConfigMap = from_yaml(&read_manifest(path)?)?;
    if config_map.metadata.name.as_deref() != Some(GATEWAY_CONFIG_NAME) {
        warn!(
            "{} does not hold the '{}' ConfigMap, reading it anyway",
            path.display(),
            GATEWAY_CONFIG_NAME
        );
    }

    Ok(GatewayConfig::from_config_map(&config_map)?)
}

fn render<T: Serialize>(value: &T, output: OutputFormat) -> miette::Result<String> {
    let text = match output {
        OutputFormat::Json => to_json_pretty(value)?,
        OutputFormat::Yaml => to_yaml(value)?,
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const INGRESS: &str = r#"
apiVersion: networking.internal.knative.dev/v1alpha1
kind: Ingress
metadata:
  name: hello
  namespace: default
spec:
  httpOption: Redirected
  rules:
  - hosts: [hello.default.example.com]
    visibility: ExternalIP
"#;

    const ENDPOINTS: &str = r#"
apiVersion: v1
kind: Endpoints
metadata:
  name: envoy
  namespace: contour-external
subsets:
- addresses:
  - ip: 10.0.0.1
  - ip: 10.0.0.2
  ports:
  - name: http
    port: 8080
  - name: https
    port: 8443
"#;

    const GATEWAY_CONFIG: &str = r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: config-gateway
  namespace: knative-serving
data:
  external-gateways: |
    - class: contour
      gateway: contour-external/knative-external
      service: contour-external/envoy
"#;

    #[test]
    fn test_resolve_targets_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let ingress = dir.path().join("ingress.yaml");
        let endpoints = dir.path().join("endpoints.yaml");
        let config = dir.path().join("config-gateway.yaml");
        fs::write(&ingress, INGRESS).unwrap();
        fs::write(&endpoints, ENDPOINTS).unwrap();
        fs::write(&config, GATEWAY_CONFIG).unwrap();

        let targets = resolve_targets(&ingress, &endpoints, Some(&config)).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].pod_port, "8443");
        assert_eq!(targets[0].pod_ips.len(), 2);
        assert_eq!(targets[0].urls[0].as_str(), "https://hello.default.example.com/");

        let json = render(&targets, OutputFormat::Json).unwrap();
        assert!(json.contains("\"podPort\": \"8443\""));
    }

    #[test]
    fn test_default_gateway_has_no_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let ingress = dir.path().join("ingress.yaml");
        let endpoints = dir.path().join("endpoints.yaml");
        fs::write(&ingress, INGRESS).unwrap();
        fs::write(&endpoints, ENDPOINTS).unwrap();

        // Without the ConfigMap the istio gateway is expected, which is absent
        assert!(resolve_targets(&ingress, &endpoints, None).is_err());
    }

    #[test]
    fn test_gateways_render_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config-gateway.yaml");
        fs::write(&config, GATEWAY_CONFIG).unwrap();

        let loaded = load_gateway_config(Some(&config)).unwrap();
        let yaml = render(&loaded, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("contour-external/envoy"));
        assert!(yaml.contains("istio-system/knative-local-gateway"));
    }
}
