//! Configuration core of the LokiStack operator.
//!
//! A LokiStack is reconciled in three steps, each of which lives in its own module:
//!
//! 1. [`manifests::options::resolve`] layers the user's [`crd::lokistack::LokiStackSpec`] between
//!    the size-class defaults and the operator-mandated overrides.
//! 2. [`manifests::config::compare::compare`] compares the previous and the freshly rendered Loki
//!    configuration and hands out one change-token (hash) per [`component::Component`], so that
//!    only components reading a changed section are restarted.
//! 3. [`manifests::mutate`] copies the fields the operator owns from each desired object onto the
//!    live object, leaving immutable and externally managed fields alone.

pub mod component;
pub mod config;
pub mod crd;
pub mod logging;
pub mod manifests;

// External re-exports
pub use k8s_openapi;
pub use kube;
pub use schemars;
