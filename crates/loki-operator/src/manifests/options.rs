//! Resolution of the options every manifest of a LokiStack is built from.
//!
//! A LokiStack is configured in three layers, applied in this order:
//!
//! 1. The defaults of the requested size class ([`sizes::stack_size_defaults`]).
//! 2. The user's [`LokiStackSpec`], overriding every field it sets.
//! 3. The operator overrides ([`operator_overrides`]), which the user can not bypass.
use clap::Args;
use snafu::{ResultExt, Snafu, ensure};
use strum::IntoEnumIterator;
use tracing::debug;

use crate::{
    component::Component,
    config::merge::merge,
    crd::lokistack::{LokiStackSizeType, LokiStackSpec},
    manifests::sizes::{self, StackResources},
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to merge the user overrides onto the {size} defaults"))]
    MergeConflict {
        source: ConflictError,
        size: LokiStackSizeType,
    },
}

#[derive(Debug, Snafu)]
pub enum ConflictError {
    #[snafu(display("the LokiStack requests size {requested}"))]
    SizeMismatch { requested: LokiStackSizeType },

    #[snafu(display("{field} is still unset after applying all configuration layers"))]
    MissingField { field: String },
}

/// Optional operator features, toggled per operator deployment.
#[derive(Args, Clone, Copy, Debug, Default, Eq, PartialEq)]
#[command(next_help_heading = "Feature Options")]
pub struct FeatureFlags {
    /// Let the OpenShift service CA sign the serving certificates of all HTTP endpoints.
    #[arg(long, env)]
    pub enable_certificate_signing_service: bool,

    /// Create a ServiceMonitor for every component, so that Prometheus scrapes its metrics.
    #[arg(long, env)]
    pub enable_service_monitors: bool,

    /// Scrape the metrics endpoints via TLS. Requires the certificate signing service.
    #[arg(long, env)]
    pub enable_tls_service_monitor_config: bool,
}

impl FeatureFlags {
    /// Whether Prometheus should scrape the components via TLS.
    ///
    /// Without the certificate signing service there is no serving certificate to scrape against,
    /// so the TLS setting alone has no effect.
    pub fn scrape_over_tls(self) -> bool {
        self.enable_service_monitors
            && self.enable_tls_service_monitor_config
            && self.enable_certificate_signing_service
    }
}

/// Connection details of the object storage, as extracted from the secret referenced by the
/// LokiStack.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ObjectStorage {
    pub endpoint: String,
    pub buckets: String,
    pub region: String,
    pub access_key_id: String,
    pub access_key_secret: String,
}

/// The fully layered configuration of a LokiStack.
///
/// This is the only input manifests are rendered from. It must not be merged with any other layer
/// again.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedSpecification {
    pub size: LokiStackSizeType,

    /// The merged spec. Replica counts of all components and the replication factor are set.
    pub spec: LokiStackSpec,

    pub resources: StackResources,
    pub flags: FeatureFlags,
}

impl ResolvedSpecification {
    pub fn replicas(&self, component: Component) -> i32 {
        self.spec
            .template
            .component(component)
            .replicas
            .unwrap_or_default()
    }

    pub fn replication_factor(&self) -> i32 {
        self.spec.replication_factor.unwrap_or_default()
    }
}

/// Settings that are enforced regardless of what the user asked for.
///
/// Singleton components always run with exactly one replica.
pub fn operator_overrides() -> LokiStackSpec {
    let mut overrides = LokiStackSpec::default();
    for component in Component::iter().filter(|c| c.is_singleton()) {
        overrides.template.component_mut(component).replicas = Some(1);
    }
    overrides
}

/// Layers `user` between the defaults of `size` and the [`operator_overrides`].
///
/// Fails if `user` explicitly requests a different size class, or if the merged result is
/// missing a replica count or the replication factor.
pub fn resolve(
    size: LokiStackSizeType,
    user: &LokiStackSpec,
    flags: FeatureFlags,
) -> Result<ResolvedSpecification, Error> {
    let spec = merge_layers(size, user).context(MergeConflictSnafu { size })?;

    Ok(ResolvedSpecification {
        size,
        spec,
        resources: sizes::resource_requirements(size),
        flags,
    })
}

fn merge_layers(
    size: LokiStackSizeType,
    user: &LokiStackSpec,
) -> Result<LokiStackSpec, ConflictError> {
    if let Some(requested) = user.size {
        ensure!(requested == size, SizeMismatchSnafu { requested });
    }

    let defaults = sizes::stack_size_defaults(size);
    let spec = merge(user.clone(), &defaults);
    debug!(%size, ?spec, "merged user overrides onto size defaults");

    let spec = merge(operator_overrides(), &spec);

    ensure!(
        spec.replication_factor.is_some(),
        MissingFieldSnafu {
            field: "replicationFactor"
        }
    );
    for component in Component::iter() {
        ensure!(
            spec.template.component(component).replicas.is_some(),
            MissingFieldSnafu {
                field: format!("template.{component}.replicas")
            }
        );
    }

    Ok(spec)
}
