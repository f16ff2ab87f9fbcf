//! Per size-class defaults.
//!
//! The tables are process-wide and never handed out mutably: [`stack_size_defaults`] returns a
//! fresh copy for every caller.
use std::{collections::BTreeMap, sync::LazyLock};

use k8s_openapi::{
    api::core::v1::ResourceRequirements, apimachinery::pkg::api::resource::Quantity,
};

use crate::{
    component::Component,
    crd::lokistack::{
        IngestionLimitSpec, LimitsSpec, LimitsTemplateSpec, LokiComponentSpec, LokiStackSizeType,
        LokiStackSpec, LokiTemplateSpec, QueryLimitSpec,
    },
};

static EXTRA_SMALL: LazyLock<LokiStackSpec> = LazyLock::new(|| LokiStackSpec {
    size: Some(LokiStackSizeType::OneXExtraSmall),
    replication_factor: Some(1),
    limits: default_limits(LimitsTemplateSpec {
        ingestion_limits: IngestionLimitSpec {
            ingestion_rate: Some(20),
            ingestion_burst_size: Some(10),
            ..default_ingestion_limits()
        },
        query_limits: default_query_limits(),
    }),
    template: template([
        (Component::Compactor, 1),
        (Component::Distributor, 1),
        (Component::Ingester, 1),
        (Component::Querier, 1),
        (Component::QueryFrontend, 1),
    ]),
    ..LokiStackSpec::default()
});

static SMALL: LazyLock<LokiStackSpec> = LazyLock::new(|| LokiStackSpec {
    size: Some(LokiStackSizeType::OneXSmall),
    replication_factor: Some(2),
    limits: default_limits(LimitsTemplateSpec {
        ingestion_limits: IngestionLimitSpec {
            ingestion_rate: Some(10),
            ingestion_burst_size: Some(20),
            ..default_ingestion_limits()
        },
        query_limits: default_query_limits(),
    }),
    template: template([
        (Component::Compactor, 1),
        (Component::Distributor, 2),
        (Component::Ingester, 2),
        (Component::Querier, 2),
        (Component::QueryFrontend, 2),
    ]),
    ..LokiStackSpec::default()
});

static MEDIUM: LazyLock<LokiStackSpec> = LazyLock::new(|| LokiStackSpec {
    size: Some(LokiStackSizeType::OneXMedium),
    replication_factor: Some(3),
    limits: default_limits(LimitsTemplateSpec {
        ingestion_limits: IngestionLimitSpec {
            ingestion_rate: Some(10),
            ingestion_burst_size: Some(20),
            ..default_ingestion_limits()
        },
        query_limits: default_query_limits(),
    }),
    template: template([
        (Component::Compactor, 1),
        (Component::Distributor, 2),
        (Component::Ingester, 3),
        (Component::Querier, 3),
        (Component::QueryFrontend, 2),
    ]),
    ..LokiStackSpec::default()
});

fn default_ingestion_limits() -> IngestionLimitSpec {
    IngestionLimitSpec {
        ingestion_rate: None,
        ingestion_burst_size: None,
        max_label_name_length: Some(1024),
        max_label_value_length: Some(2048),
        max_label_names_per_series: Some(30),
        max_global_streams_per_tenant: Some(10_000),
        max_line_size: Some(256_000),
    }
}

fn default_query_limits() -> QueryLimitSpec {
    QueryLimitSpec {
        max_entries_limit_per_query: Some(5000),
        max_chunks_per_query: Some(2_000_000),
        max_query_series: Some(500),
    }
}

fn default_limits(global: LimitsTemplateSpec) -> LimitsSpec {
    LimitsSpec {
        global,
        tenants: BTreeMap::new(),
    }
}

fn template(replicas: [(Component, i32); 5]) -> LokiTemplateSpec {
    let mut template = LokiTemplateSpec::default();
    for (component, replicas) in replicas {
        *template.component_mut(component) = LokiComponentSpec {
            replicas: Some(replicas),
            ..LokiComponentSpec::default()
        };
    }
    template
}

/// Returns a copy of the default [`LokiStackSpec`] for the given size class.
pub fn stack_size_defaults(size: LokiStackSizeType) -> LokiStackSpec {
    match size {
        LokiStackSizeType::OneXExtraSmall => EXTRA_SMALL.clone(),
        LokiStackSizeType::OneXSmall => SMALL.clone(),
        LokiStackSizeType::OneXMedium => MEDIUM.clone(),
    }
}

/// Compute resources of a single component.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComponentResources {
    pub requirements: ResourceRequirements,

    /// Size of the persistent volume claim, [`None`] for stateless components.
    pub pvc_size: Option<Quantity>,
}

impl ComponentResources {
    fn new(cpu: &str, memory: &str, pvc_size: Option<&str>) -> Self {
        Self {
            requirements: ResourceRequirements {
                requests: Some(BTreeMap::from([
                    ("cpu".to_string(), Quantity(cpu.to_string())),
                    ("memory".to_string(), Quantity(memory.to_string())),
                ])),
                ..ResourceRequirements::default()
            },
            pvc_size: pvc_size.map(|size| Quantity(size.to_string())),
        }
    }

    /// Only reserves storage, the scheduler is free to place the pods anywhere.
    fn storage_only(pvc_size: &str) -> Self {
        Self {
            requirements: ResourceRequirements::default(),
            pvc_size: Some(Quantity(pvc_size.to_string())),
        }
    }
}

/// Resource requirements of all components of a stack.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StackResources {
    pub compactor: ComponentResources,
    pub distributor: ComponentResources,
    pub ingester: ComponentResources,
    pub querier: ComponentResources,
    pub query_frontend: ComponentResources,
}

impl StackResources {
    pub fn component(&self, component: Component) -> &ComponentResources {
        match component {
            Component::Compactor => &self.compactor,
            Component::Distributor => &self.distributor,
            Component::Ingester => &self.ingester,
            Component::Querier => &self.querier,
            Component::QueryFrontend => &self.query_frontend,
        }
    }
}

/// Returns the resource requirements that go along with the given size class.
pub fn resource_requirements(size: LokiStackSizeType) -> StackResources {
    match size {
        // Development setups must fit onto a laptop, so nothing is requested
        LokiStackSizeType::OneXExtraSmall => StackResources {
            compactor: ComponentResources::storage_only("10Gi"),
            distributor: ComponentResources::default(),
            ingester: ComponentResources::storage_only("10Gi"),
            querier: ComponentResources::storage_only("10Gi"),
            query_frontend: ComponentResources::default(),
        },
        LokiStackSizeType::OneXSmall => StackResources {
            compactor: ComponentResources::new("2", "4Gi", Some("10Gi")),
            distributor: ComponentResources::new("2", "0.5Gi", None),
            ingester: ComponentResources::new("4", "20Gi", Some("10Gi")),
            querier: ComponentResources::new("4", "4Gi", Some("10Gi")),
            query_frontend: ComponentResources::new("2", "0.5Gi", None),
        },
        LokiStackSizeType::OneXMedium => StackResources {
            compactor: ComponentResources::new("2", "4Gi", Some("10Gi")),
            distributor: ComponentResources::new("2", "0.5Gi", None),
            ingester: ComponentResources::new("6", "30Gi", Some("10Gi")),
            querier: ComponentResources::new("6", "10Gi", Some("10Gi")),
            query_frontend: ComponentResources::new("2", "0.5Gi", None),
        },
    }
}
