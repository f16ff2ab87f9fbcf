//! The Loki configuration file shared by all components of a stack.
//!
//! [`LokiConfig`] is the typed form of the rendered `config.yaml`. It is parsed from the bytes
//! stored in the cluster so that two revisions can be compared structurally (see [`compare`]).
//! All sections and fields default when absent, matching how Loki itself loads the file.
use serde::{Deserialize, Serialize};

use crate::config::diff::Diff;

mod build;
pub mod compare;
pub mod hash;
pub mod impact;

pub use build::*;

#[derive(Clone, Debug, Default, Deserialize, Diff, Eq, PartialEq, Serialize)]
#[diff(path_overrides(diff = "crate::config::diff"))]
#[serde(default)]
pub struct LokiConfig {
    pub server: ServerConfig,
    pub ingester: IngesterConfig,
    pub limits_config: LimitsConfig,
    pub storage_config: StorageConfig,
    pub compactor: CompactorConfig,
}

impl LokiConfig {
    pub fn from_yaml(bytes: &[u8]) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_slice(bytes)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Diff, Eq, PartialEq, Serialize)]
#[diff(path_overrides(diff = "crate::config::diff"))]
#[serde(default)]
pub struct ServerConfig {
    pub http_listen_port: i32,
    pub grpc_listen_port: i32,
    pub log_level: String,
}

#[derive(Clone, Debug, Default, Deserialize, Diff, Eq, PartialEq, Serialize)]
#[diff(path_overrides(diff = "crate::config::diff"))]
#[serde(default)]
pub struct IngesterConfig {
    pub lifecycler: LifecyclerConfig,
}

#[derive(Clone, Debug, Default, Deserialize, Diff, Eq, PartialEq, Serialize)]
#[diff(path_overrides(diff = "crate::config::diff"))]
#[serde(default)]
pub struct LifecyclerConfig {
    pub ring: RingConfig,
}

#[derive(Clone, Debug, Default, Deserialize, Diff, Eq, PartialEq, Serialize)]
#[diff(path_overrides(diff = "crate::config::diff"))]
#[serde(default)]
pub struct RingConfig {
    pub replication_factor: i32,
}

#[derive(Clone, Debug, Default, Deserialize, Diff, Eq, PartialEq, Serialize)]
#[diff(path_overrides(diff = "crate::config::diff"))]
#[serde(default)]
pub struct LimitsConfig {
    #[serde(rename = "ingestion_rate_mb")]
    pub ingestion_rate: i32,
    #[serde(rename = "ingestion_burst_size_mb")]
    pub ingestion_burst_size: i32,
    pub max_label_name_length: i32,
    pub max_label_value_length: i32,
    pub max_label_names_per_series: i32,
    pub max_streams_per_user: i32,
    pub max_line_size: i32,
    pub max_global_streams_per_user: i32,
    pub max_entries_limit_per_query: i32,
    pub max_chunks_per_query: i32,
    pub max_query_series: i32,
}

#[derive(Clone, Debug, Default, Deserialize, Diff, Eq, PartialEq, Serialize)]
#[diff(path_overrides(diff = "crate::config::diff"))]
#[serde(default)]
pub struct StorageConfig {
    pub aws: AwsStorageConfig,
}

#[derive(Clone, Debug, Default, Deserialize, Diff, Eq, PartialEq, Serialize)]
#[diff(path_overrides(diff = "crate::config::diff"))]
#[serde(default)]
pub struct AwsStorageConfig {
    pub s3: String,
    #[serde(rename = "bucketnames")]
    pub bucket_names: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

#[derive(Clone, Debug, Default, Deserialize, Diff, Eq, PartialEq, Serialize)]
#[diff(path_overrides(diff = "crate::config::diff"))]
#[serde(default)]
pub struct CompactorConfig {
    pub working_directory: String,
    pub shared_store: String,
}
