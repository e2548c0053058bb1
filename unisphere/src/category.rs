use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
};

/// Performance categories of the Unisphere REST API. The variant name is the category
/// segment of the `performance/<Category>/...` endpoints.
#[derive(Debug, Clone, Copy, AsRefStr, Display, EnumIter, EnumString, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Array,
    FEDirector,
    FEPort,
    BEDirector,
    BEPort,
    RDFDirector,
    RDFPort,
    EDSDirector,
    IMDirector,
    SRP,
    Board,
    DiskGroup,
    StorageGroup,
    PortGroup,
    Host,
    Initiator,
    FEEmulation,
    ISCSITarget,
    RDFS,
}

/// Where a category's keys live in a `performance/<Category>/keys` response and how the
/// listed id is passed back to `performance/<Category>/metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFields {
    /// Array field of the keys response, e.g. `storageGroupInfo`.
    pub info: &'static str,
    /// Id field of each listed entry, e.g. `storageGroupId`.
    pub id: &'static str,
    /// Request parameter carrying the id in a metrics query.
    pub param: &'static str,
}

impl Category {
    pub const fn key_fields(self) -> KeyFields {
        const fn fields(info: &'static str, id: &'static str, param: &'static str) -> KeyFields {
            KeyFields { info, id, param }
        }

        match self {
            Category::Array => fields("arrayInfo", "symmetrixId", "symmetrixId"),
            Category::FEDirector => fields("feDirectorInfo", "directorId", "directorId"),
            Category::FEPort => fields("fePortInfo", "portId", "portId"),
            Category::BEDirector => fields("beDirectorInfo", "directorId", "directorId"),
            Category::BEPort => fields("bePortInfo", "portId", "portId"),
            Category::RDFDirector => fields("rdfDirectorInfo", "directorId", "directorId"),
            Category::RDFPort => fields("rdfPortInfo", "portId", "portId"),
            Category::EDSDirector => fields("edsDirectorInfo", "directorId", "directorId"),
            Category::IMDirector => fields("imDirectorInfo", "directorId", "directorId"),
            Category::SRP => fields("srpInfo", "srpId", "srpId"),
            Category::Board => fields("boardInfo", "boardId", "boardId"),
            Category::DiskGroup => fields("diskGroupInfo", "diskGroupId", "diskGroupId"),
            Category::StorageGroup => fields("storageGroupInfo", "storageGroupId", "storageGroupId"),
            Category::PortGroup => fields("portGroupInfo", "portGroupId", "portGroupId"),
            Category::Host => fields("hostInfo", "hostId", "hostId"),
            Category::Initiator => fields("initiatorInfo", "initiatorId", "initiatorId"),
            Category::FEEmulation => fields("feEmulationInfo", "feEmulationId", "feEmulationId"),
            Category::ISCSITarget => fields("iSCSITargetInfo", "iSCSITargetId", "iSCSITargetId"),
            Category::RDFS => fields("rdfsInfo", "raGroupId", "raGroupId"),
        }
    }

    /// Directors are the only categories keyed by `directorId`.
    pub const fn is_director(self) -> bool {
        matches!(
            self,
            Category::FEDirector
                | Category::BEDirector
                | Category::RDFDirector
                | Category::EDSDirector
                | Category::IMDirector
        )
    }

    pub const fn is_port(self) -> bool {
        matches!(self, Category::FEPort | Category::BEPort | Category::RDFPort)
    }
}

/// One listed entry of a category, e.g. a storage group or a port of a director.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyItem {
    pub category: Category,
    pub id: String,
    /// Owning director of a port.
    pub parent: Option<String>,
}

impl TopologyItem {
    pub fn new(category: Category, id: impl Into<String>) -> Self {
        Self {
            category,
            id: id.into(),
            parent: None,
        }
    }

    pub fn with_parent(category: Category, parent: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            category,
            id: id.into(),
            parent: Some(parent.into()),
        }
    }

    /// Ids from the outermost level inwards, e.g. `["FA-1D", "4"]` for a port.
    pub fn identifier_parts(&self) -> Vec<&str> {
        self.parent.as_deref().into_iter().chain([self.id.as_str()]).collect()
    }
}
