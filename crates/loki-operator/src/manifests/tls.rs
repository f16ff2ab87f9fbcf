//! Serving certificates signed by the OpenShift service CA.
//!
//! When the certificate signing service is enabled, every HTTP service is annotated so that the
//! service CA issues a certificate into a secret, and the pods serving it mount that secret and
//! terminate TLS themselves. Prometheus then scrapes the metrics endpoints against the same
//! certificates.
use k8s_openapi::api::core::v1::{
    PodSpec, SecretVolumeSource, Service, Volume, VolumeMount,
};
use snafu::{OptionExt, Snafu};

use crate::{
    crd::service_monitor::{Endpoint, TlsConfig},
    manifests::options::FeatureFlags,
};

/// Annotation requesting a serving certificate from the OpenShift service CA.
pub const SERVING_CERT_SECRET_ANNOTATION: &str = "service.beta.openshift.io/serving-cert-secret-name";

/// Directory the serving certificate is mounted at.
pub const SECRET_DIRECTORY: &str = "/etc/proxy/secrets";

/// Service CA bundle mounted into the OpenShift cluster monitoring Prometheus.
pub const PROMETHEUS_CA_FILE: &str =
    "/etc/prometheus/configmaps/serving-certs-ca-bundle/service-ca.crt";

/// Service account token Prometheus authenticates with when scraping.
pub const BEARER_TOKEN_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Name of the metrics port on every component's HTTP service.
pub const METRICS_PORT_NAME: &str = "metrics";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("pod spec serving {service_name:?} has no container to enable TLS on"))]
    MissingContainer { service_name: String },
}

/// Name of the secret the serving certificate of `service_name` is stored in.
pub fn signing_service_secret_name(service_name: &str) -> String {
    format!("{service_name}-metrics")
}

/// Requests a serving certificate for `service`.
///
/// An annotation already present on the service is left untouched.
pub fn configure_service_cert_signing(service: &mut Service, service_name: &str) {
    service
        .metadata
        .annotations
        .get_or_insert_with(Default::default)
        .entry(SERVING_CERT_SECRET_ANNOTATION.to_string())
        .or_insert_with(|| signing_service_secret_name(service_name));
}

/// The endpoint a ServiceMonitor scrapes the HTTP service `service_name` through.
///
/// Returns [`None`] if service monitors are disabled.
pub fn service_monitor_endpoint(
    flags: FeatureFlags,
    service_name: &str,
    namespace: &str,
) -> Option<Endpoint> {
    if !flags.enable_service_monitors {
        return None;
    }

    let mut endpoint = Endpoint {
        port: Some(METRICS_PORT_NAME.to_string()),
        path: Some("/metrics".to_string()),
        scheme: Some("http".to_string()),
        ..Endpoint::default()
    };
    if flags.scrape_over_tls() {
        endpoint.scheme = Some("https".to_string());
        endpoint.bearer_token_file = Some(BEARER_TOKEN_FILE.to_string());
        endpoint.tls_config = Some(TlsConfig {
            ca_file: Some(PROMETHEUS_CA_FILE.to_string()),
            server_name: Some(format!("{service_name}.{namespace}.svc.cluster.local")),
            ..TlsConfig::default()
        });
    }
    Some(endpoint)
}

/// Mounts the serving certificate of `service_name` into the first container of `pod_spec` and
/// points the Loki HTTP server at it.
///
/// Applying this more than once has no further effect.
pub fn enable_tls_on_pod_spec(pod_spec: &mut PodSpec, service_name: &str) -> Result<(), Error> {
    let secret_name = signing_service_secret_name(service_name);

    let container = pod_spec
        .containers
        .first_mut()
        .context(MissingContainerSnafu { service_name })?;

    let mounts = container.volume_mounts.get_or_insert_with(Vec::new);
    if !mounts.iter().any(|mount| mount.name == secret_name) {
        mounts.push(VolumeMount {
            name: secret_name.clone(),
            mount_path: SECRET_DIRECTORY.to_string(),
            read_only: Some(false),
            ..VolumeMount::default()
        });
    }

    let args = container.args.get_or_insert_with(Vec::new);
    for arg in [
        format!("-server.http-tls-cert-path={SECRET_DIRECTORY}/tls.crt"),
        format!("-server.http-tls-key-path={SECRET_DIRECTORY}/tls.key"),
    ] {
        if !args.contains(&arg) {
            args.push(arg);
        }
    }

    let volumes = pod_spec.volumes.get_or_insert_with(Vec::new);
    if !volumes.iter().any(|volume| volume.name == secret_name) {
        volumes.push(Volume {
            name: secret_name.clone(),
            secret: Some(SecretVolumeSource {
                secret_name: Some(secret_name),
                ..SecretVolumeSource::default()
            }),
            ..Volume::default()
        });
    }

    Ok(())
}
