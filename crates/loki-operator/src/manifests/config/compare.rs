//! Selective restart hashing.
//!
//! Every component's pod template carries the hash of the Loki configuration it was started with
//! (see [`CONFIG_HASH_ANNOTATION`]). [`compare`] decides, for a new configuration revision, which
//! components get the new hash (and are therefore restarted) and which keep the old one:
//!
//! - a change to the ingester section restarts only the ingesters,
//! - a change to the limits restarts every component except the compactor,
//! - a change to the storage configuration restarts everything.
use std::collections::BTreeSet;

use k8s_openapi::api::core::v1::PodTemplateSpec;
use serde::Serialize;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info, warn};

use crate::{
    component::Component,
    config::diff,
    manifests::{
        CONFIG_HASH_ANNOTATION,
        config::{LokiConfig, hash::sha256sum, impact},
    },
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to parse the {revision} Loki configuration"))]
    MalformedConfig {
        source: serde_yaml::Error,
        revision: &'static str,
    },
}

/// The configuration hash assigned to each component.
///
/// There is exactly one hash per [`Component`], which is guaranteed by construction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ComparisonResult {
    compactor: String,
    distributor: String,
    ingester: String,
    querier: String,
    query_frontend: String,
}

impl ComparisonResult {
    fn from_fn(mut hash_for: impl FnMut(Component) -> String) -> Self {
        Self {
            compactor: hash_for(Component::Compactor),
            distributor: hash_for(Component::Distributor),
            ingester: hash_for(Component::Ingester),
            querier: hash_for(Component::Querier),
            query_frontend: hash_for(Component::QueryFrontend),
        }
    }

    /// Assigns the same hash to all components.
    pub fn uniform(hash: &str) -> Self {
        Self::from_fn(|_| hash.to_owned())
    }

    pub fn get(&self, component: Component) -> &str {
        match component {
            Component::Compactor => &self.compactor,
            Component::Distributor => &self.distributor,
            Component::Ingester => &self.ingester,
            Component::Querier => &self.querier,
            Component::QueryFrontend => &self.query_frontend,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Component, &str)> {
        [
            Component::Compactor,
            Component::Distributor,
            Component::Ingester,
            Component::Querier,
            Component::QueryFrontend,
        ]
        .into_iter()
        .map(|component| (component, self.get(component)))
    }

    /// Stamps the hash of `component` onto a pod template, so that the workload is rolled
    /// whenever the hash changes.
    pub fn annotate(&self, component: Component, template: &mut PodTemplateSpec) {
        template
            .metadata
            .get_or_insert_with(Default::default)
            .annotations
            .get_or_insert_with(Default::default)
            .insert(
                CONFIG_HASH_ANNOTATION.to_owned(),
                self.get(component).to_owned(),
            );
    }
}

/// Compares two rendered Loki configurations and returns the hash each component should run with.
///
/// Components reading a section that differs between `old` and `new` are assigned the hash of
/// `new`, all others keep the hash of `old`. Fails if either payload is not a valid Loki
/// configuration, in which case no partial result is produced.
pub fn compare(old: &[u8], new: &[u8]) -> Result<ComparisonResult, Error> {
    let old_config = LokiConfig::from_yaml(old).context(MalformedConfigSnafu { revision: "old" })?;
    let new_config = LokiConfig::from_yaml(new).context(MalformedConfigSnafu { revision: "new" })?;

    let old_hash = sha256sum(old);
    let new_hash = sha256sum(new);

    // Textual noise (key order, comments, formatting) must not restart anything
    if old_config == new_config {
        debug!(hash = %old_hash, "Loki configuration is unchanged");
        return Ok(ComparisonResult::uniform(&old_hash));
    }

    let sections = diff::changed_sections(&old_config, &new_config);
    let mut affected = BTreeSet::new();
    for section in &sections {
        if !impact::is_registered(section) {
            warn!(
                %section,
                "Loki configuration section changed, but no component is registered for it"
            );
        }
        affected.extend(impact::affected_components(section).iter().copied());
    }

    info!(
        changed_sections = ?sections,
        restarted_components = ?affected,
        %old_hash,
        %new_hash,
        "Loki configuration changed"
    );

    Ok(ComparisonResult::from_fn(|component| {
        if affected.contains(&component) {
            new_hash.clone()
        } else {
            old_hash.clone()
        }
    }))
}
