use crate::registry::{
    lookup,
    CategoryKind,
    ARRAY_LABEL,
};
use eyre::Result;
use std::collections::BTreeMap;
use tracing::Span;
use unisphere_client::{
    ApiError,
    ArrayApi,
    Category,
    TopologyItem,
};

/// One LLD entry, `{#MACRO}` to value.
pub type LabelMap = BTreeMap<String, String>;

/// What to discover: a category, and for directors whether to go down to their ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryTarget {
    pub category: Category,
    pub ports: bool,
}

impl DiscoveryTarget {
    pub fn new(category: Category) -> Self {
        Self { category, ports: false }
    }

    pub fn ports_of(director: Category) -> Self {
        Self {
            category: director,
            ports: true,
        }
    }
}

impl Default for DiscoveryTarget {
    fn default() -> Self {
        Self::new(Category::Array)
    }
}

/// Builds Zabbix low level discovery entries from the array topology.
pub struct Discovery<'a> {
    api: &'a dyn ArrayApi,
    span: Span,
}

impl<'a> Discovery<'a> {
    pub fn new(api: &'a dyn ArrayApi) -> Self {
        Self {
            api,
            span: info_span!("discovery"),
        }
    }

    /// Entries for `target` on `array_id`. Categories the array does not have yield no
    /// entries.
    pub fn discover(&self, target: DiscoveryTarget, array_id: &str) -> Result<Vec<LabelMap>> {
        let _entered = self.span.enter();
        let spec = lookup(target.category);

        let entries = match spec.kind {
            CategoryKind::Array => self.discover_array(array_id)?,
            CategoryKind::Item => self.discover_items(target.category, array_id)?,
            CategoryKind::Director => match spec.port.filter(|_| target.ports) {
                Some(port) => self.discover_ports(target.category, port, array_id)?,
                None => self.discover_items(target.category, array_id)?,
            },
            CategoryKind::Port => {
                warn!(category = %target.category, "Ports are discovered through their director");
                Vec::new()
            }
        };

        info!(category = %target.category, ports = target.ports, count = entries.len(), "Discovery finished");
        Ok(entries)
    }

    fn discover_array(&self, array_id: &str) -> Result<Vec<LabelMap>> {
        let arrays = match self.api.array_list() {
            Ok(arrays) => arrays,
            Err(ApiError::NotFound(resource)) => {
                info!(%resource, "No arrays listed");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        if !arrays.iter().any(|id| id == array_id) {
            warn!(%array_id, known = ?arrays, "Array is not managed by this Unisphere");
            return Ok(Vec::new());
        }
        Ok(vec![entry(array_id, [])])
    }

    fn discover_items(&self, category: Category, array_id: &str) -> Result<Vec<LabelMap>> {
        let label = lookup(category).label;
        let Some(items) = list_or_empty(self.api.list_items(category, array_id, None), category)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .iter()
            .map(|item| entry(array_id, [(label, item.id.clone())]))
            .collect())
    }

    fn discover_ports(&self, director: Category, port: Category, array_id: &str) -> Result<Vec<LabelMap>> {
        let director_label = lookup(director).label;
        let port_label = lookup(port).label;

        let Some(directors) = list_or_empty(self.api.list_items(director, array_id, None), director)? else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for director_item in &directors {
            let ports = match self.api.list_items(port, array_id, Some(&director_item.id)) {
                Ok(ports) => ports,
                Err(ApiError::NotFound(_)) => {
                    info!(director = %director_item.id, "Director offline or without ports");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            entries.extend(ports.iter().map(|port_item| {
                entry(
                    array_id,
                    [
                        (director_label, director_item.id.clone()),
                        (port_label, port_item.identifier_parts().join("-")),
                    ],
                )
            }));
        }
        Ok(entries)
    }
}

fn entry<const N: usize>(array_id: &str, labels: [(&str, String); N]) -> LabelMap {
    let mut map = LabelMap::from([(ARRAY_LABEL.to_string(), array_id.to_string())]);
    map.extend(labels.into_iter().map(|(label, value)| (label.to_string(), value)));
    map
}

/// `None` when the category has no keys on this array.
fn list_or_empty(
    result: Result<Vec<TopologyItem>, ApiError>,
    category: Category,
) -> Result<Option<Vec<TopologyItem>>> {
    match result {
        Ok(items) => Ok(Some(items)),
        Err(ApiError::NotFound(resource)) => {
            info!(%category, %resource, "No keys for category");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
