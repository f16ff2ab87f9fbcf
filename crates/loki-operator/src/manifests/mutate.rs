//! Applying desired objects onto their live counterparts.
//!
//! Reconciliation fetches the live object and hands it to [`mutate`] together with the freshly
//! built one. Only fields the operator owns are copied over: labels, annotations and the mutable
//! part of the spec of each kind. Identity and ownership metadata (name, UID, owner references,
//! creation timestamp) always stay with the live object, and fields Kubernetes refuses to change
//! after creation are only copied while the live object does not exist yet.
use k8s_openapi::api::{
    apps::v1::{Deployment, StatefulSet},
    core::v1::{ConfigMap, Service},
};
use kube::{Resource, ResourceExt, core::DynamicObject};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::debug;

use crate::crd::service_monitor::ServiceMonitor;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("cannot mutate a {existing} using a desired {desired}"))]
    MismatchedResourceKind {
        existing: &'static str,
        desired: &'static str,
    },

    #[snafu(display("missing mutate implementation for resource type {api_version}/{kind}"))]
    UnsupportedResourceKind { api_version: String, kind: String },

    #[snafu(display("dynamic object {name:?} has no type information"))]
    MissingTypeMeta { name: String },

    #[snafu(display("failed to parse dynamic object as {kind}"))]
    ParseDynamicObject {
        source: kube::core::dynamic::ParseDynamicObjectError,
        kind: &'static str,
    },

    #[snafu(display("failed to convert {kind} back into a dynamic object"))]
    ConvertToDynamic {
        source: serde_json::Error,
        kind: &'static str,
    },
}

/// A resource kind the operator knows how to update in place.
pub trait Mutate: Resource<DynamicType = ()> {
    /// Copies the mutable, operator-owned part of the spec from `desired` onto `self`.
    fn mutate_spec(&mut self, desired: &Self);
}

/// Copies labels, annotations and the operator-owned spec fields from `desired` onto `existing`.
pub fn mutate<K: Mutate>(existing: &mut K, desired: &K) {
    debug!(
        kind = %K::kind(&()),
        name = %existing.name_any(),
        "mutating existing object"
    );

    let meta = existing.meta_mut();
    meta.annotations.clone_from(&desired.meta().annotations);
    meta.labels.clone_from(&desired.meta().labels);
    existing.mutate_spec(desired);
}

/// Objects that have not been created yet can still receive immutable fields.
fn is_being_created<K: Resource>(existing: &K) -> bool {
    existing.meta().creation_timestamp.is_none()
}

impl Mutate for ConfigMap {
    fn mutate_spec(&mut self, desired: &Self) {
        self.data.clone_from(&desired.data);
        self.binary_data.clone_from(&desired.binary_data);
    }
}

impl Mutate for Service {
    fn mutate_spec(&mut self, desired: &Self) {
        let desired = desired.spec.clone().unwrap_or_default();
        let spec = self.spec.get_or_insert_with(Default::default);
        spec.ports = desired.ports;
        spec.selector = desired.selector;
    }
}

impl Mutate for Deployment {
    fn mutate_spec(&mut self, desired: &Self) {
        let creating = is_being_created(self);
        let desired = desired.spec.clone().unwrap_or_default();
        let spec = self.spec.get_or_insert_with(Default::default);
        if creating {
            spec.selector = desired.selector;
        }
        spec.replicas = desired.replicas;
        spec.template = desired.template;
        spec.strategy = desired.strategy;
    }
}

impl Mutate for StatefulSet {
    fn mutate_spec(&mut self, desired: &Self) {
        let creating = is_being_created(self);
        let desired = desired.spec.clone().unwrap_or_default();
        let spec = self.spec.get_or_insert_with(Default::default);
        if creating {
            spec.selector = desired.selector;
            spec.pod_management_policy = desired.pod_management_policy;
            spec.volume_claim_templates = desired.volume_claim_templates;
        }
        spec.replicas = desired.replicas;
        spec.template = desired.template;
        spec.update_strategy = desired.update_strategy;
    }
}

impl Mutate for ServiceMonitor {
    /// Intentionally inert: the selector is immutable after creation and the endpoints never
    /// change for a given component, so only labels and annotations are kept up to date.
    fn mutate_spec(&mut self, _desired: &Self) {}
}

/// Every kind of object the operator manages.
#[derive(Clone, Debug, PartialEq)]
pub enum ManagedResource {
    ConfigMap(ConfigMap),
    Service(Service),
    Deployment(Deployment),
    StatefulSet(StatefulSet),
    ServiceMonitor(ServiceMonitor),
}

impl ManagedResource {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigMap(_) => "ConfigMap",
            Self::Service(_) => "Service",
            Self::Deployment(_) => "Deployment",
            Self::StatefulSet(_) => "StatefulSet",
            Self::ServiceMonitor(_) => "ServiceMonitor",
        }
    }

    /// Mutates `self` towards `desired`, see [`mutate`].
    ///
    /// Both objects must be of the same kind.
    pub fn mutate(&mut self, desired: &Self) -> Result<(), Error> {
        match (self, desired) {
            (Self::ConfigMap(existing), Self::ConfigMap(desired)) => mutate(existing, desired),
            (Self::Service(existing), Self::Service(desired)) => mutate(existing, desired),
            (Self::Deployment(existing), Self::Deployment(desired)) => mutate(existing, desired),
            (Self::StatefulSet(existing), Self::StatefulSet(desired)) => {
                mutate(existing, desired)
            }
            (Self::ServiceMonitor(existing), Self::ServiceMonitor(desired)) => {
                mutate(existing, desired)
            }
            (existing, desired) => {
                return MismatchedResourceKindSnafu {
                    existing: existing.kind(),
                    desired: desired.kind(),
                }
                .fail();
            }
        }
        Ok(())
    }

    /// Resolves the concrete kind of a dynamic object from its type metadata.
    pub fn try_from_dynamic(object: &DynamicObject) -> Result<Self, Error> {
        let types = object.types.as_ref().context(MissingTypeMetaSnafu {
            name: object.name_any(),
        })?;

        if is_kind::<ConfigMap>(&types.api_version, &types.kind) {
            parse(object, "ConfigMap").map(Self::ConfigMap)
        } else if is_kind::<Service>(&types.api_version, &types.kind) {
            parse(object, "Service").map(Self::Service)
        } else if is_kind::<Deployment>(&types.api_version, &types.kind) {
            parse(object, "Deployment").map(Self::Deployment)
        } else if is_kind::<StatefulSet>(&types.api_version, &types.kind) {
            parse(object, "StatefulSet").map(Self::StatefulSet)
        } else if is_kind::<ServiceMonitor>(&types.api_version, &types.kind) {
            parse(object, "ServiceMonitor").map(Self::ServiceMonitor)
        } else {
            UnsupportedResourceKindSnafu {
                api_version: types.api_version.clone(),
                kind: types.kind.clone(),
            }
            .fail()
        }
    }

    pub fn into_dynamic(self) -> Result<DynamicObject, Error> {
        let kind = self.kind();
        let value = match self {
            Self::ConfigMap(object) => serde_json::to_value(object),
            Self::Service(object) => serde_json::to_value(object),
            Self::Deployment(object) => serde_json::to_value(object),
            Self::StatefulSet(object) => serde_json::to_value(object),
            Self::ServiceMonitor(object) => serde_json::to_value(object),
        };
        value
            .and_then(serde_json::from_value)
            .context(ConvertToDynamicSnafu { kind })
    }
}

/// JSON paths (below the object root) of the fields [`ManagedResource::mutate`] takes over from
/// the desired object.
type OwnedPaths = &'static [&'static [&'static str]];

const CONFIG_MAP_FIELDS: OwnedPaths = &[&["data"], &["binaryData"]];
const SERVICE_FIELDS: OwnedPaths = &[&["spec", "ports"], &["spec", "selector"]];
const DEPLOYMENT_FIELDS: OwnedPaths = &[
    &["spec", "replicas"],
    &["spec", "template"],
    &["spec", "strategy"],
];
const NEW_DEPLOYMENT_FIELDS: OwnedPaths = &[
    &["spec", "selector"],
    &["spec", "replicas"],
    &["spec", "template"],
    &["spec", "strategy"],
];
const STATEFUL_SET_FIELDS: OwnedPaths = &[
    &["spec", "replicas"],
    &["spec", "template"],
    &["spec", "updateStrategy"],
];
const NEW_STATEFUL_SET_FIELDS: OwnedPaths = &[
    &["spec", "selector"],
    &["spec", "podManagementPolicy"],
    &["spec", "volumeClaimTemplates"],
    &["spec", "replicas"],
    &["spec", "template"],
    &["spec", "updateStrategy"],
];

impl ManagedResource {
    fn owned_paths(&self, creating: bool) -> OwnedPaths {
        match (self, creating) {
            (Self::ConfigMap(_), _) => CONFIG_MAP_FIELDS,
            (Self::Service(_), _) => SERVICE_FIELDS,
            (Self::Deployment(_), false) => DEPLOYMENT_FIELDS,
            (Self::Deployment(_), true) => NEW_DEPLOYMENT_FIELDS,
            (Self::StatefulSet(_), false) => STATEFUL_SET_FIELDS,
            (Self::StatefulSet(_), true) => NEW_STATEFUL_SET_FIELDS,
            (Self::ServiceMonitor(_), _) => &[],
        }
    }
}

/// Replaces the value at `path` inside `root` with `value`, removing the field for [`None`].
///
/// Missing parent objects are created. Everything next to the replaced field is kept.
fn replace_path(root: &mut Value, path: &[&str], value: Option<Value>) {
    let Some((field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for parent in parents {
        let Some(map) = current.as_object_mut() else {
            return;
        };
        let child = map
            .entry(*parent)
            .or_insert_with(|| Value::Object(Map::new()));
        if child.is_null() {
            *child = Value::Object(Map::new());
        }
        current = child;
    }

    if let Some(map) = current.as_object_mut() {
        match value {
            Some(value) => map.insert((*field).to_string(), value),
            None => map.remove(*field),
        };
    }
}

fn lookup_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(root, |value, key| value.get(key))
        .filter(|value| !value.is_null())
}

fn is_kind<K: Resource<DynamicType = ()>>(api_version: &str, kind: &str) -> bool {
    K::api_version(&()) == api_version && K::kind(&()) == kind
}

fn parse<K>(object: &DynamicObject, kind: &'static str) -> Result<K, Error>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
{
    object
        .clone()
        .try_parse()
        .context(ParseDynamicObjectSnafu { kind })
}

macro_rules! managed_resource_from {
    ($($kind:ident),*) => {
        $(
            impl From<$kind> for ManagedResource {
                fn from(object: $kind) -> Self {
                    Self::$kind(object)
                }
            }
        )*
    };
}

managed_resource_from!(ConfigMap, Service, Deployment, StatefulSet, ServiceMonitor);

/// Mutates an untyped live object towards an untyped desired object.
///
/// The kind is taken from the type metadata of both objects. If it is unknown, or differs between
/// them, `existing` is left exactly as it was. Otherwise only labels, annotations and the fields
/// owned by the kind's rule are written back. Every other field of `existing`, including ones the
/// typed model of the kind does not know about, is kept as is.
pub fn mutate_dynamic(existing: &mut DynamicObject, desired: &DynamicObject) -> Result<(), Error> {
    let mut typed = ManagedResource::try_from_dynamic(existing)?;
    let desired = ManagedResource::try_from_dynamic(desired)?;
    typed.mutate(&desired)?;

    let owned = typed.owned_paths(is_being_created(existing));
    let mutated = typed.into_dynamic()?;

    existing.metadata.labels = mutated.metadata.labels;
    existing.metadata.annotations = mutated.metadata.annotations;
    for path in owned {
        let value = lookup_path(&mutated.data, path).cloned();
        replace_path(&mut existing.data, path, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use indoc::indoc;
    use k8s_openapi::{
        ByteString,
        api::{
            apps::v1::{DeploymentSpec, DeploymentStrategy, StatefulSetSpec},
            core::v1::{
                PersistentVolumeClaim, PodTemplateSpec, ServicePort, ServiceSpec,
            },
        },
        apimachinery::pkg::apis::meta::v1::{LabelSelector, OwnerReference},
    };
    use kube::api::ObjectMeta;
    use rstest::rstest;

    use super::*;
    use crate::crd::service_monitor::ServiceMonitorSpec;

    fn labels(value: &str) -> Option<BTreeMap<String, String>> {
        Some(BTreeMap::from([(
            "app.kubernetes.io/instance".to_string(),
            value.to_string(),
        )]))
    }

    fn selector(value: &str) -> LabelSelector {
        LabelSelector {
            match_labels: labels(value),
            ..LabelSelector::default()
        }
    }

    fn created_metadata() -> ObjectMeta {
        ObjectMeta {
            name: Some("loki-querier".to_string()),
            uid: Some("c85bfb53-a28e-4782-baaf-3c218a25f192".to_string()),
            creation_timestamp: Some(
                serde_json::from_value(serde_json::json!("2021-06-01T00:00:00Z")).unwrap(),
            ),
            owner_references: Some(vec![OwnerReference {
                api_version: "loki.grafana.com/v1beta1".to_string(),
                kind: "LokiStack".to_string(),
                name: "lokistack-dev".to_string(),
                uid: "f2c9f3a4-0000-4000-8000-000000000000".to_string(),
                ..OwnerReference::default()
            }]),
            ..ObjectMeta::default()
        }
    }

    fn desired_metadata() -> ObjectMeta {
        ObjectMeta {
            name: Some("loki-querier".to_string()),
            labels: labels("new"),
            annotations: Some(BTreeMap::from([(
                "loki.grafana.com/config-hash".to_string(),
                "abc".to_string(),
            )])),
            ..ObjectMeta::default()
        }
    }

    fn deployment(metadata: ObjectMeta, instance: &str, replicas: i32) -> Deployment {
        Deployment {
            metadata,
            spec: Some(DeploymentSpec {
                replicas: Some(replicas),
                selector: selector(instance),
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: labels(instance),
                        ..ObjectMeta::default()
                    }),
                    ..PodTemplateSpec::default()
                },
                strategy: Some(DeploymentStrategy {
                    type_: Some("RollingUpdate".to_string()),
                    ..DeploymentStrategy::default()
                }),
                ..DeploymentSpec::default()
            }),
            ..Deployment::default()
        }
    }

    fn stateful_set(metadata: ObjectMeta, instance: &str, replicas: i32) -> StatefulSet {
        StatefulSet {
            metadata,
            spec: Some(StatefulSetSpec {
                replicas: Some(replicas),
                selector: selector(instance),
                pod_management_policy: Some(
                    if instance == "old" {
                        "OrderedReady"
                    } else {
                        "Parallel"
                    }
                    .to_string(),
                ),
                volume_claim_templates: Some(vec![PersistentVolumeClaim {
                    metadata: ObjectMeta {
                        name: Some(format!("storage-{instance}")),
                        ..ObjectMeta::default()
                    },
                    ..PersistentVolumeClaim::default()
                }]),
                ..StatefulSetSpec::default()
            }),
            ..StatefulSet::default()
        }
    }

    #[test]
    fn metadata_is_copied_but_identity_is_kept() {
        let mut existing = ConfigMap {
            metadata: created_metadata(),
            ..ConfigMap::default()
        };
        let desired = ConfigMap {
            metadata: desired_metadata(),
            binary_data: Some(BTreeMap::from([(
                "config.yaml".to_string(),
                ByteString(b"server: {}".to_vec()),
            )])),
            ..ConfigMap::default()
        };

        mutate(&mut existing, &desired);

        assert_eq!(existing.metadata.labels, desired.metadata.labels);
        assert_eq!(existing.metadata.annotations, desired.metadata.annotations);
        assert_eq!(existing.binary_data, desired.binary_data);
        assert_eq!(
            existing.metadata.uid.as_deref(),
            Some("c85bfb53-a28e-4782-baaf-3c218a25f192")
        );
        assert!(existing.metadata.owner_references.is_some());
        assert!(existing.metadata.creation_timestamp.is_some());
    }

    #[test]
    fn service_ports_and_selector_are_replaced() {
        let mut existing = Service {
            metadata: created_metadata(),
            spec: Some(ServiceSpec {
                cluster_ip: Some("10.0.0.1".to_string()),
                ports: Some(vec![ServicePort {
                    port: 80,
                    ..ServicePort::default()
                }]),
                ..ServiceSpec::default()
            }),
            ..Service::default()
        };
        let desired = Service {
            metadata: desired_metadata(),
            spec: Some(ServiceSpec {
                ports: Some(vec![ServicePort {
                    name: Some("http".to_string()),
                    port: 3100,
                    ..ServicePort::default()
                }]),
                selector: labels("new"),
                ..ServiceSpec::default()
            }),
            ..Service::default()
        };

        mutate(&mut existing, &desired);

        let spec = existing.spec.unwrap();
        assert_eq!(spec.ports.unwrap()[0].port, 3100);
        assert_eq!(spec.selector, labels("new"));
        assert_eq!(spec.cluster_ip.as_deref(), Some("10.0.0.1"));
    }

    #[rstest]
    #[case::created(created_metadata(), "old")]
    #[case::not_yet_created(ObjectMeta::default(), "new")]
    fn deployment_selector_only_before_creation(
        #[case] metadata: ObjectMeta,
        #[case] expected_selector: &str,
    ) {
        let mut existing = deployment(metadata, "old", 1);
        let desired = deployment(desired_metadata(), "new", 3);

        mutate(&mut existing, &desired);

        let spec = existing.spec.unwrap();
        assert_eq!(spec.selector, selector(expected_selector));
        assert_eq!(spec.replicas, Some(3));
        assert_eq!(spec.template, desired.spec.unwrap().template);
    }

    #[rstest]
    #[case::created(created_metadata(), "old", "OrderedReady")]
    #[case::not_yet_created(ObjectMeta::default(), "new", "Parallel")]
    fn stateful_set_immutable_fields_only_before_creation(
        #[case] metadata: ObjectMeta,
        #[case] expected: &str,
        #[case] expected_policy: &str,
    ) {
        let mut existing = stateful_set(metadata, "old", 1);
        let desired = stateful_set(desired_metadata(), "new", 2);

        mutate(&mut existing, &desired);

        let spec = existing.spec.unwrap();
        assert_eq!(spec.selector, selector(expected));
        assert_eq!(
            spec.volume_claim_templates.unwrap()[0].metadata.name,
            Some(format!("storage-{expected}"))
        );
        assert_eq!(spec.pod_management_policy.as_deref(), Some(expected_policy));
        assert_eq!(spec.replicas, Some(2));
    }

    #[test]
    fn mutation_is_idempotent() {
        let desired = stateful_set(desired_metadata(), "new", 2);
        let mut once = stateful_set(created_metadata(), "old", 1);
        mutate(&mut once, &desired);
        let mut twice = once.clone();
        mutate(&mut twice, &desired);

        assert_eq!(once, twice);
    }

    #[test]
    fn service_monitor_spec_is_left_alone() {
        let mut existing = ServiceMonitor::new("loki-querier", ServiceMonitorSpec {
            job_label: Some("old".to_string()),
            selector: selector("old"),
            ..ServiceMonitorSpec::default()
        });
        let mut desired = ServiceMonitor::new("loki-querier", ServiceMonitorSpec {
            job_label: Some("new".to_string()),
            selector: selector("new"),
            ..ServiceMonitorSpec::default()
        });
        desired.metadata = desired_metadata();

        mutate(&mut existing, &desired);

        assert_eq!(existing.spec.job_label.as_deref(), Some("old"));
        assert_eq!(existing.metadata.labels, labels("new"));
    }

    #[test]
    fn mismatched_kinds_fail() {
        let mut existing = ManagedResource::from(ConfigMap::default());
        let desired = ManagedResource::from(Service::default());

        let err = existing.mutate(&desired).unwrap_err();

        assert!(matches!(
            err,
            Error::MismatchedResourceKind {
                existing: "ConfigMap",
                desired: "Service"
            }
        ));
        assert_eq!(existing, ManagedResource::from(ConfigMap::default()));
    }

    #[test]
    fn mutate_dynamic_deployment() {
        let existing: DynamicObject = serde_yaml::from_str(indoc! {"
            apiVersion: apps/v1
            kind: Deployment
            metadata:
              name: loki-distributor
              uid: 2f1b2c3d-0000-4000-8000-000000000000
              creationTimestamp: '2021-06-01T00:00:00Z'
            spec:
              replicas: 1
              selector:
                matchLabels:
                  app: old
              template: {}
        "})
        .unwrap();
        let desired: DynamicObject = serde_yaml::from_str(indoc! {"
            apiVersion: apps/v1
            kind: Deployment
            metadata:
              name: loki-distributor
              labels:
                app: new
            spec:
              replicas: 3
              selector:
                matchLabels:
                  app: new
              template: {}
        "})
        .unwrap();

        let mut mutated = existing.clone();
        mutate_dynamic(&mut mutated, &desired).unwrap();

        assert_eq!(mutated.metadata.uid, existing.metadata.uid);
        assert_eq!(
            mutated.metadata.labels,
            Some(BTreeMap::from([("app".to_string(), "new".to_string())]))
        );
        assert_eq!(mutated.data["spec"]["replicas"], 3);
        assert_eq!(mutated.data["spec"]["selector"]["matchLabels"]["app"], "old");
    }

    #[test]
    fn mutate_dynamic_keeps_unmodelled_service_monitor_fields() {
        let existing: DynamicObject = serde_yaml::from_str(indoc! {"
            apiVersion: monitoring.coreos.com/v1
            kind: ServiceMonitor
            metadata:
              name: loki-querier
              labels:
                app: old
              creationTimestamp: '2021-06-01T00:00:00Z'
            spec:
              sampleLimit: 100
              podTargetLabels:
                - team
              endpoints:
                - port: metrics
                  honorLabels: true
              selector:
                matchLabels:
                  app: old
        "})
        .unwrap();
        let desired: DynamicObject = serde_yaml::from_str(indoc! {"
            apiVersion: monitoring.coreos.com/v1
            kind: ServiceMonitor
            metadata:
              name: loki-querier
              labels:
                app: new
            spec:
              endpoints:
                - port: metrics
              selector:
                matchLabels:
                  app: new
        "})
        .unwrap();

        let mut mutated = existing.clone();
        mutate_dynamic(&mut mutated, &desired).unwrap();

        assert_eq!(
            mutated.metadata.labels,
            Some(BTreeMap::from([("app".to_string(), "new".to_string())]))
        );
        assert_eq!(mutated.data, existing.data);
    }

    #[test]
    fn mutate_dynamic_keeps_unowned_deployment_fields() {
        let existing: DynamicObject = serde_yaml::from_str(indoc! {"
            apiVersion: apps/v1
            kind: Deployment
            metadata:
              name: loki-distributor
              creationTimestamp: '2021-06-01T00:00:00Z'
            spec:
              replicas: 1
              progressDeadlineSeconds: 600
              revisionHistoryLimit: 10
              selector:
                matchLabels:
                  app: old
              template: {}
            status:
              readyReplicas: 1
        "})
        .unwrap();
        let desired: DynamicObject = serde_yaml::from_str(indoc! {"
            apiVersion: apps/v1
            kind: Deployment
            metadata:
              name: loki-distributor
            spec:
              replicas: 3
              selector:
                matchLabels:
                  app: new
              template: {}
              strategy:
                type: RollingUpdate
        "})
        .unwrap();

        let mut mutated = existing.clone();
        mutate_dynamic(&mut mutated, &desired).unwrap();

        let spec = &mutated.data["spec"];
        assert_eq!(spec["replicas"], 3);
        assert_eq!(spec["strategy"]["type"], "RollingUpdate");
        assert_eq!(spec["progressDeadlineSeconds"], 600);
        assert_eq!(spec["revisionHistoryLimit"], 10);
        assert_eq!(spec["selector"]["matchLabels"]["app"], "old");
        assert_eq!(mutated.data["status"]["readyReplicas"], 1);
    }

    #[test]
    fn unsupported_dynamic_kind_leaves_existing_unchanged() {
        let existing: DynamicObject = serde_yaml::from_str(indoc! {"
            apiVersion: v1
            kind: Secret
            metadata:
              name: loki-s3
            stringData:
              bucketnames: logs
        "})
        .unwrap();
        let mut desired = existing.clone();
        desired.metadata.labels = labels("new");

        let mut mutated = existing.clone();
        let err = mutate_dynamic(&mut mutated, &desired).unwrap_err();

        assert!(matches!(
            err,
            Error::UnsupportedResourceKind { ref kind, .. } if kind == "Secret"
        ));
        assert_eq!(mutated, existing);
    }
}
