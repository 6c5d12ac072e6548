//! Probe target resolution for a single ingress rule.
//!
//! Everything here is a pure function of the rule, the Ingress HTTP option and
//! an Endpoints snapshot. Nothing is cached between calls.

use crate::error::{ListerError, Result};
use gateprobe_core::{
    EndpointPort, EndpointSubset, Endpoints, HttpOption, IngressRule, IngressVisibility,
    ProbeTarget,
};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};
use url::Url;

/// Scheme used to probe a rule's hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeScheme {
    Http,
    Https,
}

impl ProbeScheme {
    /// External rules that redirect HTTP are probed over HTTPS, everything
    /// else over plain HTTP.
    pub fn for_rule(visibility: IngressVisibility, http_option: HttpOption) -> Self {
        match (visibility, http_option) {
            (IngressVisibility::ExternalIp, HttpOption::Redirected) => ProbeScheme::Https,
            _ => ProbeScheme::Http,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProbeScheme::Http => "http",
            ProbeScheme::Https => "https",
        }
    }

    /// Port names (and appProtocol values) identifying the port that serves
    /// this scheme. Istio names its cleartext port "http2".
    pub fn port_names(self) -> &'static [&'static str] {
        match self {
            ProbeScheme::Http => &["http", "http2"],
            ProbeScheme::Https => &["https"],
        }
    }

    pub fn matches(self, name: &str) -> bool {
        self.port_names().contains(&name)
    }
}

impl fmt::Display for ProbeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the port to probe among a subset's ports.
///
/// A port whose name matches the scheme wins outright and ends the scan. A
/// port whose appProtocol matches is taken but the scan goes on, so a later
/// appProtocol match replaces it and a later name match still wins. Without
/// any match the first port is used.
///
/// Returns `None` only when `ports` is empty.
pub fn select_port(ports: &[EndpointPort], scheme: ProbeScheme) -> Option<i32> {
    let mut selected = ports.first()?.port;

    for port in ports {
        if port.name.as_deref().is_some_and(|name| scheme.matches(name)) {
            return Some(port.port);
        }
        if port
            .app_protocol
            .as_deref()
            .is_some_and(|protocol| scheme.matches(protocol))
        {
            selected = port.port;
        }
    }

    Some(selected)
}

/// Build `scheme://host/` for every host, preserving order
pub fn hosts_to_urls(hosts: &[String], scheme: ProbeScheme) -> Result<Vec<Url>> {
    hosts.iter().map(|host| host_url(host, scheme)).collect()
}

fn host_url(host: &str, scheme: ProbeScheme) -> Result<Url> {
    let url = Url::parse(&format!("{}://{}/", scheme, host))
        .map_err(|e| ListerError::invalid_host(host, e.to_string()))?;

    // The host must be the whole authority, nothing may leak into the path
    if url.path() != "/"
        || url.query().is_some()
        || url.fragment().is_some()
        || !url.username().is_empty()
        || url.password().is_some()
    {
        return Err(ListerError::invalid_host(
            host,
            "host must not carry a path, query, fragment or credentials",
        ));
    }

    // The authority sent as Host / SNI must be the rule's host verbatim
    let authority = match (url.host_str(), url.port()) {
        (Some(h), Some(port)) => format!("{}:{}", h, port),
        (Some(h), None) => h.to_string(),
        (None, _) => String::new(),
    };
    if authority != host {
        return Err(ListerError::invalid_host(
            host,
            format!(
                "host would be rewritten to '{}', use the canonical lowercase form without a default port",
                authority
            ),
        ));
    }

    Ok(url)
}

/// Resolve the probe targets of one rule against the Endpoints of the Service
/// backing it: one target per subset, all sharing the rule's URLs.
///
/// Fails with `NoReachableTargets` when the subsets hold no address at all,
/// and with `MalformedEndpoints` when a subset lists no port.
pub fn resolve_rule(
    rule: &IngressRule,
    http_option: HttpOption,
    endpoints: &Endpoints,
) -> Result<Vec<ProbeTarget>> {
    let service = endpoints_name(endpoints);
    let scheme = ProbeScheme::for_rule(rule.visibility, http_option);
    let urls = hosts_to_urls(&rule.hosts, scheme)?;

    let targets = endpoints
        .subsets
        .iter()
        .flatten()
        .map(|subset| subset_target(subset, scheme, &urls, &service))
        .collect::<Result<Vec<_>>>()?;

    let reachable: usize = targets.iter().map(|t| t.pod_ips.len()).sum();
    if reachable == 0 {
        warn!(
            "No ready addresses behind {} for {} rule {:?}",
            service, rule.visibility, rule.hosts
        );
        return Err(ListerError::no_reachable_targets(&service, &rule.hosts));
    }

    debug!(
        "Resolved {} probe target(s) with {} address(es) behind {} for {:?}",
        targets.len(),
        reachable,
        service,
        rule.hosts
    );

    Ok(targets)
}

fn subset_target(
    subset: &EndpointSubset,
    scheme: ProbeScheme,
    urls: &[Url],
    service: &str,
) -> Result<ProbeTarget> {
    let ports = subset.ports.as_deref().unwrap_or(&[]);
    let port = select_port(ports, scheme).ok_or_else(|| {
        ListerError::malformed_endpoints(service, "endpoint subset lists no ports")
    })?;

    let pod_ips: HashSet<String> = subset
        .addresses
        .iter()
        .flatten()
        .map(|address| address.ip.clone())
        .collect();

    debug!(
        "Selected {} port {} on {} pod(s) of {}",
        scheme,
        port,
        pod_ips.len(),
        service
    );

    Ok(ProbeTarget {
        pod_ips,
        pod_port: port.to_string(),
        urls: urls.to_vec(),
    })
}

fn endpoints_name(endpoints: &Endpoints) -> String {
    format!(
        "{}/{}",
        endpoints.metadata.namespace.as_deref().unwrap_or("default"),
        endpoints.metadata.name.as_deref().unwrap_or("<unnamed>")
    )
}
