//! Everything needed to turn a LokiStack into the objects running it.
//!
//! Building the individual workload objects (images, ports, probes, volumes) is mechanical and
//! lives with the controller. This module covers the parts that need to agree across
//! reconciliations: the resolved options, the Loki configuration and its per-component hashes,
//! and how desired objects are applied onto live ones.

pub mod config;
pub mod mutate;
pub mod options;
pub mod sizes;
pub mod tls;

/// Annotation carrying the hash of the Loki configuration a component's pods were started with.
///
/// Changing its value in a pod template makes Kubernetes roll the workload.
pub const CONFIG_HASH_ANNOTATION: &str = "loki.grafana.com/config-hash";

/// Name of the key holding the Loki configuration in the shared config map.
pub const LOKI_CONFIG_FILE_NAME: &str = "config.yaml";
