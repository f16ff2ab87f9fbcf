use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod diff;
mod merge;

/// Derives [`Merge`](trait.Merge.html) for a given struct.
///
/// Every field is merged with [`Merge::merge`](trait.Merge.html#tymethod.merge), which means that
/// nested structs are merged key by key rather than being replaced wholesale. Leaf values should
/// be wrapped in an [`Option`] and implement `Atomic`.
///
/// # Supported attributes
///
/// ## `#[merge(bound = "T: Merge")]`
///
/// Adds additional where clauses to the generated `impl`.
///
/// ## `#[merge(path_overrides(merge = "path::to::merge"))]`
///
/// Overrides the path to the `merge` module. Defaults to `::loki_operator::config::merge`.
#[proc_macro_derive(Merge, attributes(merge))]
pub fn derive_merge(input: TokenStream) -> TokenStream {
    merge::derive(parse_macro_input!(input as DeriveInput)).into()
}

/// Derives [`Diff`](trait.Diff.html) for a given struct with named fields.
///
/// The generated walk visits the fields in declaration order, pushing the field name onto the
/// current path before descending into it. This makes the field schema the traversal order, so
/// the same pair of values always reports its differences in the same order.
///
/// # Supported attributes
///
/// ## `#[diff(path_overrides(diff = "path::to::diff"))]`
///
/// Overrides the path to the `diff` module. Defaults to `::loki_operator::config::diff`.
///
/// ## `#[diff(rename = "name")]` (field)
///
/// Reports the field under `name` instead of its Rust identifier.
///
/// ## `#[diff(skip)]` (field)
///
/// Excludes the field from the comparison.
#[proc_macro_derive(Diff, attributes(diff))]
pub fn derive_diff(input: TokenStream) -> TokenStream {
    diff::derive(parse_macro_input!(input as DeriveInput)).into()
}
