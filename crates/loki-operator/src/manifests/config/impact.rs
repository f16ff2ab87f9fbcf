//! Which components read which section of the Loki configuration.
//!
//! Only the sections listed in [`SECTION_IMPACT`] take part in selective restarts. A change to
//! any other section does not invalidate any component.
use crate::component::Component;

/// Maps a top-level [`LokiConfig`](super::LokiConfig) section to the components consuming it.
pub const SECTION_IMPACT: &[(&str, &[Component])] = &[
    (
        "limits_config",
        &[
            Component::Distributor,
            Component::Ingester,
            Component::Querier,
            Component::QueryFrontend,
        ],
    ),
    ("ingester", &[Component::Ingester]),
    (
        "storage_config",
        &[
            Component::Compactor,
            Component::Distributor,
            Component::Ingester,
            Component::Querier,
            Component::QueryFrontend,
        ],
    ),
];

/// Returns the components affected by a change to `section`, empty for unregistered sections.
pub fn affected_components(section: &str) -> &'static [Component] {
    SECTION_IMPACT
        .iter()
        .find(|(name, _)| *name == section)
        .map(|&(_, components)| components)
        .unwrap_or_default()
}

pub fn is_registered(section: &str) -> bool {
    SECTION_IMPACT.iter().any(|(name, _)| *name == section)
}
