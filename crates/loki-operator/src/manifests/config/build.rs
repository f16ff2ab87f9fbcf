use crate::{
    crd::lokistack::LimitsTemplateSpec,
    manifests::{
        config::{
            AwsStorageConfig, CompactorConfig, IngesterConfig, LifecyclerConfig, LimitsConfig,
            LokiConfig, RingConfig, ServerConfig, StorageConfig,
        },
        options::{ObjectStorage, ResolvedSpecification},
    },
};

pub const HTTP_PORT: i32 = 3100;
pub const GRPC_PORT: i32 = 9095;
const COMPACTOR_WORKING_DIRECTORY: &str = "/tmp/loki/compactor";

impl LokiConfig {
    /// Renders the Loki configuration of a resolved LokiStack.
    ///
    /// Per-tenant limits are not part of the shared configuration, only the global ones are.
    pub fn build(resolved: &ResolvedSpecification, object_storage: &ObjectStorage) -> Self {
        Self {
            server: ServerConfig {
                http_listen_port: HTTP_PORT,
                grpc_listen_port: GRPC_PORT,
                log_level: "info".to_string(),
            },
            ingester: IngesterConfig {
                lifecycler: LifecyclerConfig {
                    ring: RingConfig {
                        replication_factor: resolved.replication_factor(),
                    },
                },
            },
            limits_config: limits_config(&resolved.spec.limits.global),
            storage_config: StorageConfig {
                aws: AwsStorageConfig {
                    s3: object_storage.endpoint.clone(),
                    bucket_names: object_storage.buckets.clone(),
                    region: object_storage.region.clone(),
                    access_key_id: object_storage.access_key_id.clone(),
                    secret_access_key: object_storage.access_key_secret.clone(),
                },
            },
            compactor: CompactorConfig {
                working_directory: COMPACTOR_WORKING_DIRECTORY.to_string(),
                shared_store: "s3".to_string(),
            },
        }
    }
}

fn limits_config(global: &LimitsTemplateSpec) -> LimitsConfig {
    let ingestion = &global.ingestion_limits;
    let query = &global.query_limits;
    LimitsConfig {
        ingestion_rate: ingestion.ingestion_rate.unwrap_or_default(),
        ingestion_burst_size: ingestion.ingestion_burst_size.unwrap_or_default(),
        max_label_name_length: ingestion.max_label_name_length.unwrap_or_default(),
        max_label_value_length: ingestion.max_label_value_length.unwrap_or_default(),
        max_label_names_per_series: ingestion.max_label_names_per_series.unwrap_or_default(),
        // 0 disables the per-ingester limit, the global one is authoritative
        max_streams_per_user: 0,
        max_line_size: ingestion.max_line_size.unwrap_or_default(),
        max_global_streams_per_user: ingestion.max_global_streams_per_tenant.unwrap_or_default(),
        max_entries_limit_per_query: query.max_entries_limit_per_query.unwrap_or_default(),
        max_chunks_per_query: query.max_chunks_per_query.unwrap_or_default(),
        max_query_series: query.max_query_series.unwrap_or_default(),
    }
}
