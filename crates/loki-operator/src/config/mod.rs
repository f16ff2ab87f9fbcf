//! Generic engines behind the LokiStack configuration pipeline.
//!
//! The configuration of a LokiStack comes from several layers: size-class defaults, the user's
//! custom resource and a small set of operator-mandated overrides. Once resolved and rendered, two
//! revisions of the Loki configuration file must be compared to find out which components have to
//! be restarted. Both problems are solved by walking statically typed structs field by field, so
//! this module provides one derivable trait for each:
//!
//! - [`merge`] layers a value on top of its defaults, recursing into nested structs so that
//!   overriding a single field never discards its siblings.
//! - [`diff`] walks two values in lock-step and reports the paths of all leaves that differ.
//!
//! Both traits end their recursion at leaf types. For [`Merge`] those are [`Atomic`] values wrapped
//! in an [`Option`] (where [`None`] means "inherit"). For [`Diff`] those are the primitive types,
//! compared by equality.
//!
//! ```
//! # use loki_operator::config::{diff::{self, Diff}, merge::{self, Merge}};
//! #[derive(Clone, Debug, Default, Diff, Merge, PartialEq)]
//! struct Ring {
//!     replication_factor: Option<i32>,
//!     heartbeat_period: Option<String>,
//! }
//!
//! let defaults = Ring {
//!     replication_factor: Some(2),
//!     heartbeat_period: Some("5s".to_string()),
//! };
//! let merged = merge::merge(
//!     Ring {
//!         replication_factor: Some(3),
//!         ..Ring::default()
//!     },
//!     &defaults,
//! );
//!
//! assert_eq!(merged.heartbeat_period.as_deref(), Some("5s"));
//! let changed = diff::changed_sections(&defaults, &merged);
//! assert_eq!(changed.into_iter().collect::<Vec<_>>(), vec!["replication_factor"]);
//! ```

pub mod diff;
pub mod merge;

#[cfg(doc)]
use diff::Diff;
#[cfg(doc)]
use merge::{Atomic, Merge};
