use std::{
    collections::{BTreeMap, HashMap, btree_map, hash_map},
    hash::Hash,
};

use k8s_openapi::api::core::v1::Toleration;
pub use loki_operator_derive::Merge;

/// A type that can be merged with itself
///
/// This is implemented for every configuration layer of a LokiStack. Layers are applied by merging
/// the tighter layer (the one that should win) with the looser one as `defaults`:
///
/// ```text
/// size-class defaults  <-  user overrides  <-  operator overrides
/// ```
///
/// Most users will want to implement this for custom types using [the associated derive macro](`derive@Merge`).
///
/// # Example
///
/// ```
/// # use loki_operator::config::merge::Merge;
///
/// #[derive(Merge, Debug, PartialEq, Eq)]
/// struct Component {
///     replicas: Option<i32>,
///     priority_class: Option<String>,
/// }
///
/// let mut config = Component {
///     replicas: Some(42),
///     priority_class: None,
/// };
/// config.merge(&Component {
///     replicas: Some(1),
///     priority_class: Some("high".to_string()),
/// });
/// assert_eq!(config, Component {
///     replicas: Some(42), // Overridden by `replicas: Some(42)` above
///     priority_class: Some("high".to_string()), // Fallback is used
/// });
/// ```
///
/// # Options
///
/// A field should be [`Option`]al if it is [`Atomic`] (for example: [`i32`]) or an enum.
/// Composite objects (such as the component specs) should *not* be optional, otherwise they
/// could only be replaced as a whole.
pub trait Merge {
    /// Merge with `defaults`, preferring values from `self` if they are set there
    fn merge(&mut self, defaults: &Self);
}

impl<K: Ord + Clone, V: Merge + Clone> Merge for BTreeMap<K, V> {
    fn merge(&mut self, defaults: &Self) {
        for (k, default_v) in defaults {
            match self.entry(k.clone()) {
                btree_map::Entry::Occupied(mut entry) => {
                    entry.get_mut().merge(default_v);
                }
                btree_map::Entry::Vacant(entry) => {
                    entry.insert(default_v.clone());
                }
            }
        }
    }
}

impl<K: Hash + Eq + Clone, V: Merge + Clone> Merge for HashMap<K, V> {
    fn merge(&mut self, defaults: &Self) {
        for (k, default_v) in defaults {
            match self.entry(k.clone()) {
                hash_map::Entry::Occupied(mut entry) => {
                    entry.get_mut().merge(default_v);
                }
                hash_map::Entry::Vacant(entry) => {
                    entry.insert(default_v.clone());
                }
            }
        }
    }
}

impl<T: Merge> Merge for Box<T> {
    fn merge(&mut self, defaults: &Self) {
        T::merge(self, defaults)
    }
}

/// Moving version of [`Merge::merge`], to produce slightly nicer call sites
pub fn merge<T: Merge>(mut overrides: T, defaults: &T) -> T {
    overrides.merge(defaults);
    overrides
}

/// A marker trait for types that are merged atomically (as one single value) rather than
/// trying to merge each field individually
pub trait Atomic: Clone {}
impl Atomic for u8 {}
impl Atomic for u16 {}
impl Atomic for u32 {}
impl Atomic for u64 {}
impl Atomic for i32 {}
impl Atomic for i64 {}
impl Atomic for bool {}
impl Atomic for String {}

// A node selector only makes sense as a whole, merging individual labels would schedule pods onto
// nodes neither layer asked for.
impl Atomic for BTreeMap<String, String> {}
impl Atomic for Vec<Toleration> {}

impl<T: Atomic> Merge for Option<T> {
    fn merge(&mut self, defaults: &Self) {
        if self.is_none() {
            *self = defaults.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::api::core::v1::Toleration;

    use super::{Merge, merge};

    #[derive(Debug, PartialEq, Eq, Clone)]
    struct Accumulator(u8);
    impl Merge for Accumulator {
        fn merge(&mut self, defaults: &Self) {
            self.0 += defaults.0
        }
    }

    #[test]
    fn merge_derived_struct() {
        #[derive(Merge, PartialEq, Eq, Debug)]
        #[merge(path_overrides(merge = "super"))]
        struct Mergeable {
            one: Option<u8>,
            two: Option<bool>,
        }

        assert_eq!(
            merge(
                Mergeable {
                    one: None,
                    two: None,
                },
                &Mergeable {
                    one: Some(1),
                    two: None,
                }
            ),
            Mergeable {
                one: Some(1),
                two: None,
            }
        );
        assert_eq!(
            merge(
                Mergeable {
                    one: Some(0),
                    two: None,
                },
                &Mergeable {
                    one: Some(1),
                    two: Some(false),
                }
            ),
            Mergeable {
                one: Some(0),
                two: Some(false),
            }
        );
    }

    #[test]
    fn merge_nested_keeps_untouched_siblings() {
        #[derive(Merge, PartialEq, Debug)]
        #[merge(path_overrides(merge = "super"))]
        struct Template {
            distributor: Component,
            ingester: Component,
        }
        #[derive(Merge, PartialEq, Debug)]
        #[merge(path_overrides(merge = "super"))]
        struct Component {
            replicas: Option<i32>,
            tolerations: Option<Vec<Toleration>>,
        }

        let toleration = Toleration {
            key: Some("dedicated".to_string()),
            operator: Some("Exists".to_string()),
            ..Toleration::default()
        };

        assert_eq!(
            merge(
                Template {
                    distributor: Component {
                        replicas: Some(42),
                        tolerations: None,
                    },
                    ingester: Component {
                        replicas: None,
                        tolerations: None,
                    },
                },
                &Template {
                    distributor: Component {
                        replicas: Some(2),
                        tolerations: Some(vec![toleration.clone()]),
                    },
                    ingester: Component {
                        replicas: Some(3),
                        tolerations: None,
                    },
                },
            ),
            Template {
                distributor: Component {
                    replicas: Some(42),
                    tolerations: Some(vec![toleration]),
                },
                ingester: Component {
                    replicas: Some(3),
                    tolerations: None,
                },
            }
        );
    }

    #[test]
    fn merge_derived_tuple_struct() {
        #[derive(Merge, PartialEq, Eq, Debug)]
        #[merge(path_overrides(merge = "super"))]
        struct Mergeable(Option<u8>, Option<u16>);

        assert_eq!(
            merge(Mergeable(Some(1), None), &Mergeable(Some(2), Some(3))),
            Mergeable(Some(1), Some(3))
        );
    }

    #[test]
    fn merge_atomic_node_selector_is_replaced_whole() {
        let overrides = Some(BTreeMap::from([("zone".to_string(), "a".to_string())]));
        let defaults = Some(BTreeMap::from([("disk".to_string(), "ssd".to_string())]));

        assert_eq!(merge(overrides.clone(), &defaults), overrides);
        assert_eq!(merge(None, &defaults), defaults);
    }

    #[test]
    fn merge_btree_map() {
        use self::Accumulator as Acc;
        assert_eq!(
            merge(
                BTreeMap::from([("a", Acc(1)), ("b", Acc(2))]),
                &[("a", Acc(3)), ("c", Acc(5))].into()
            ),
            BTreeMap::from([("a", Acc(4)), ("b", Acc(2)), ("c", Acc(5))])
        );
    }
}
