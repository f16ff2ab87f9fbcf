//! Lock-step structural comparison of two values of the same type.
//!
//! The walk follows the static field schema of the compared type (see [`derive@Diff`]) and records
//! the [`FieldPath`] of every leaf whose values differ. Callers that only care about coarse,
//! section-level changes use [`changed_sections`], which reduces the recorded paths to their root
//! segments.
//!
//! Collections are compared order-sensitively: two [`Vec`]s holding the same elements in a
//! different order are reported as different.
use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display, Formatter},
};

use indexmap::IndexSet;
pub use loki_operator_derive::Diff;

/// The ordered, duplicate-free set of root sections touched by a diff, in order of first detection.
pub type ChangedSections = IndexSet<String>;

/// A type whose values can be compared field by field.
///
/// Implementations must push a segment onto `path` before descending into a child value and pop
/// it again afterwards, so that `path` always names the value currently being compared.
pub trait Diff {
    fn diff(&self, other: &Self, path: &mut FieldPath, reporter: &mut DiffReporter);
}

/// The location of a value inside the compared document, e.g. `limits_config.ingestion_rate_mb`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<Cow<'static, str>>);

impl FieldPath {
    pub fn push(&mut self, segment: impl Into<Cow<'static, str>>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) {
        self.0.pop();
    }

    /// The top-level field this path starts at, [`None`] for the document root itself.
    pub fn root(&self) -> Option<&str> {
        self.0.first().map(AsRef::as_ref)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(AsRef::as_ref)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            // Index segments attach directly to their collection: `tolerations[0]`
            if index > 0 && !segment.starts_with('[') {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Collects the paths of all differing leaves, in the order the walk detected them.
#[derive(Debug, Default)]
pub struct DiffReporter {
    diffs: Vec<FieldPath>,
}

impl DiffReporter {
    pub fn report(&mut self, path: &FieldPath) {
        self.diffs.push(path.clone());
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    pub fn paths(&self) -> &[FieldPath] {
        &self.diffs
    }

    /// Reduces every recorded path to its root segment.
    ///
    /// Multiple differences below the same root are reported once, at the position of the first
    /// one. Differences at the document root itself have no section and are skipped.
    pub fn roots(&self) -> ChangedSections {
        self.diffs
            .iter()
            .filter_map(FieldPath::root)
            .map(ToOwned::to_owned)
            .collect()
    }
}

/// Compares `old` and `new` and returns the names of all top-level sections that differ.
///
/// The result is empty if both values are structurally equal. Neither input is modified.
pub fn changed_sections<T: Diff>(old: &T, new: &T) -> ChangedSections {
    let mut reporter = DiffReporter::default();
    old.diff(new, &mut FieldPath::default(), &mut reporter);
    reporter.roots()
}

macro_rules! leaf_diff {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Diff for $ty {
                fn diff(&self, other: &Self, path: &mut FieldPath, reporter: &mut DiffReporter) {
                    if self != other {
                        reporter.report(path);
                    }
                }
            }
        )*
    };
}

leaf_diff!(
    bool, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64, char, String
);

impl<T: Diff> Diff for Option<T> {
    fn diff(&self, other: &Self, path: &mut FieldPath, reporter: &mut DiffReporter) {
        match (self, other) {
            (Some(this), Some(other)) => this.diff(other, path, reporter),
            (None, None) => {}
            _ => reporter.report(path),
        }
    }
}

impl<T: Diff> Diff for Box<T> {
    fn diff(&self, other: &Self, path: &mut FieldPath, reporter: &mut DiffReporter) {
        T::diff(self, other, path, reporter);
    }
}

impl<T: Diff> Diff for Vec<T> {
    fn diff(&self, other: &Self, path: &mut FieldPath, reporter: &mut DiffReporter) {
        if self.len() != other.len() {
            reporter.report(path);
            return;
        }
        for (index, (this, other)) in self.iter().zip(other).enumerate() {
            path.push(format!("[{index}]"));
            this.diff(other, path, reporter);
            path.pop();
        }
    }
}

impl<V: Diff> Diff for BTreeMap<String, V> {
    fn diff(&self, other: &Self, path: &mut FieldPath, reporter: &mut DiffReporter) {
        let keys = self.keys().chain(other.keys()).collect::<BTreeSet<_>>();
        for key in keys {
            path.push(key.clone());
            match (self.get(key), other.get(key)) {
                (Some(this), Some(other)) => this.diff(other, path, reporter),
                _ => reporter.report(path),
            }
            path.pop();
        }
    }
}
