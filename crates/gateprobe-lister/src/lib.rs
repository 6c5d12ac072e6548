//! Gateprobe Lister - Gateway probe target resolution
//!
//! Given an Ingress, works out which gateway pods must be probed, on which
//! port and with which URLs, before the Ingress can be reported ready.

// Allow unused assignments for diagnostic fields - they're used by the thiserror/miette macros
#![allow(unused_assignments)]

pub mod cache;
pub mod error;
pub mod lister;
pub mod resolver;
pub mod traits;

// Re-export primary types
pub use cache::EndpointsCache;
pub use error::{ListerError, Result};
pub use lister::ProbeTargetLister;
pub use resolver::{hosts_to_urls, resolve_rule, select_port, ProbeScheme};
pub use traits::{EndpointSnapshotProvider, ServiceBindingResolver};
