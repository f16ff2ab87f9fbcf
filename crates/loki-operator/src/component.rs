use serde::{Deserialize, Serialize};

/// The closed set of Loki components managed for every LokiStack.
///
/// The string representation (`query-frontend` etc.) is used as the key of comparison results
/// and as the value of the component label.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum::AsRefStr,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Component {
    Compactor,
    Distributor,
    Ingester,
    Querier,
    QueryFrontend,
}

impl Component {
    /// Singleton components must never run with more than one replica.
    pub const fn is_singleton(self) -> bool {
        matches!(self, Self::Compactor)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case(Component::Compactor, "compactor")]
    #[case(Component::Distributor, "distributor")]
    #[case(Component::Ingester, "ingester")]
    #[case(Component::Querier, "querier")]
    #[case(Component::QueryFrontend, "query-frontend")]
    fn component_names(#[case] component: Component, #[case] name: &str) {
        assert_eq!(component.to_string(), name);
        assert_eq!(Component::from_str(name).unwrap(), component);
    }

    #[test]
    fn compactor_is_the_only_singleton() {
        let singletons = Component::iter()
            .filter(|c| c.is_singleton())
            .collect::<Vec<_>>();
        assert_eq!(singletons, vec![Component::Compactor]);
    }
}
