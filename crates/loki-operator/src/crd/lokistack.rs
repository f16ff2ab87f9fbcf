use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Toleration;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    component::Component,
    config::merge::{Atomic, Merge},
};

/// A LokiStack describes a complete, horizontally scalable Loki installation.
///
/// Every field is optional so that the same type can be used for all configuration layers:
/// unset fields inherit the value of the layer below them (see [`crate::manifests::options`]).
#[derive(
    Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, Merge, PartialEq, Serialize,
)]
#[kube(
    group = "loki.grafana.com",
    version = "v1beta1",
    kind = "LokiStack",
    plural = "lokistacks",
    derive = "Default",
    derive = "PartialEq",
    crates(
        kube_core = "kube::core",
        k8s_openapi = "k8s_openapi",
        schemars = "schemars"
    ),
    namespaced
)]
#[merge(path_overrides(merge = "crate::config::merge"))]
#[serde(default, rename_all = "camelCase")]
pub struct LokiStackSpec {
    /// The t-shirt size of the deployment, selecting the defaults for all other fields.
    pub size: Option<LokiStackSizeType>,

    /// Whether the operator manages the stack or leaves it alone.
    pub management_state: Option<ManagementState>,

    /// Object storage holding the log chunks and index.
    pub storage: ObjectStorageSpec,

    /// The number of ingesters each stream is replicated to.
    pub replication_factor: Option<i32>,

    /// Global and per-tenant ingestion and query limits.
    pub limits: LimitsSpec,

    /// Placement and scaling of the individual components.
    pub template: LokiTemplateSpec,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    JsonSchema,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum LokiStackSizeType {
    /// For development only, no high availability.
    #[serde(rename = "1x.extra-small")]
    #[strum(serialize = "1x.extra-small")]
    OneXExtraSmall,

    #[serde(rename = "1x.small")]
    #[strum(serialize = "1x.small")]
    OneXSmall,

    #[serde(rename = "1x.medium")]
    #[strum(serialize = "1x.medium")]
    OneXMedium,
}

impl Atomic for LokiStackSizeType {}

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize, strum::Display,
)]
pub enum ManagementState {
    #[default]
    Managed,
    Unmanaged,
}

impl Atomic for ManagementState {}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, Merge, PartialEq, Serialize)]
#[merge(path_overrides(merge = "crate::config::merge"))]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectStorageSpec {
    pub secret: ObjectStorageSecretSpec,
}

/// Reference to the secret holding the object storage endpoint and credentials.
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, Merge, PartialEq, Serialize)]
#[merge(path_overrides(merge = "crate::config::merge"))]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectStorageSecretSpec {
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, Merge, PartialEq, Serialize)]
#[merge(path_overrides(merge = "crate::config::merge"))]
#[serde(default, rename_all = "camelCase")]
pub struct LimitsSpec {
    /// Limits applied to every tenant unless overridden below.
    pub global: LimitsTemplateSpec,

    /// Per-tenant limits, merged on top of the global ones.
    pub tenants: BTreeMap<String, LimitsTemplateSpec>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, Merge, PartialEq, Serialize)]
#[merge(path_overrides(merge = "crate::config::merge"))]
#[serde(default, rename_all = "camelCase")]
pub struct LimitsTemplateSpec {
    pub ingestion_limits: IngestionLimitSpec,
    pub query_limits: QueryLimitSpec,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, Merge, PartialEq, Serialize)]
#[merge(path_overrides(merge = "crate::config::merge"))]
#[serde(default, rename_all = "camelCase")]
pub struct IngestionLimitSpec {
    /// Per-tenant ingestion rate in MB per second.
    pub ingestion_rate: Option<i32>,
    /// Per-tenant burst size in MB.
    pub ingestion_burst_size: Option<i32>,
    pub max_label_name_length: Option<i32>,
    pub max_label_value_length: Option<i32>,
    pub max_label_names_per_series: Option<i32>,
    pub max_global_streams_per_tenant: Option<i32>,
    /// Maximum size of a single log line in bytes.
    pub max_line_size: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, Merge, PartialEq, Serialize)]
#[merge(path_overrides(merge = "crate::config::merge"))]
#[serde(default, rename_all = "camelCase")]
pub struct QueryLimitSpec {
    pub max_entries_limit_per_query: Option<i32>,
    pub max_chunks_per_query: Option<i32>,
    pub max_query_series: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, Merge, PartialEq, Serialize)]
#[merge(path_overrides(merge = "crate::config::merge"))]
#[serde(default, rename_all = "camelCase")]
pub struct LokiTemplateSpec {
    pub compactor: LokiComponentSpec,
    pub distributor: LokiComponentSpec,
    pub ingester: LokiComponentSpec,
    pub querier: LokiComponentSpec,
    pub query_frontend: LokiComponentSpec,
}

impl LokiTemplateSpec {
    pub fn component(&self, component: Component) -> &LokiComponentSpec {
        match component {
            Component::Compactor => &self.compactor,
            Component::Distributor => &self.distributor,
            Component::Ingester => &self.ingester,
            Component::Querier => &self.querier,
            Component::QueryFrontend => &self.query_frontend,
        }
    }

    pub fn component_mut(&mut self, component: Component) -> &mut LokiComponentSpec {
        match component {
            Component::Compactor => &mut self.compactor,
            Component::Distributor => &mut self.distributor,
            Component::Ingester => &mut self.ingester,
            Component::Querier => &mut self.querier,
            Component::QueryFrontend => &mut self.query_frontend,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, Merge, PartialEq, Serialize)]
#[merge(path_overrides(merge = "crate::config::merge"))]
#[serde(default, rename_all = "camelCase")]
pub struct LokiComponentSpec {
    pub replicas: Option<i32>,
    pub node_selector: Option<BTreeMap<String, String>>,
    pub tolerations: Option<Vec<Toleration>>,
}
