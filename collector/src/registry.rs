use unisphere_client::Category;

/// How a category is walked by discovery and collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    /// The array itself, discovered by membership in the array list.
    Array,
    /// A flat list of items, e.g. storage groups.
    Item,
    /// Directors, optionally with a port category underneath.
    Director,
    /// Ports, only ever listed per director.
    Port,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySpec {
    pub category: Category,
    pub kind: CategoryKind,
    /// LLD macro carrying the item id, braces included.
    pub label: &'static str,
    /// Identifier fields forming the metric key suffix, outermost first.
    pub id_fields: &'static [&'static str],
    /// `<Base>Port` for a `<Base>Director` with ports.
    pub port: Option<Category>,
}

pub const ARRAY_LABEL: &str = "{#ARRAYID}";

/// Director categories in collection order.
pub const DIRECTOR_CATEGORIES: [Category; 5] = [
    Category::FEDirector,
    Category::BEDirector,
    Category::RDFDirector,
    Category::EDSDirector,
    Category::IMDirector,
];

/// Non-director categories in collection order.
pub const ITEM_CATEGORIES: [Category; 11] = [
    Category::Array,
    Category::SRP,
    Category::Board,
    Category::DiskGroup,
    Category::StorageGroup,
    Category::PortGroup,
    Category::Host,
    Category::Initiator,
    Category::FEEmulation,
    Category::ISCSITarget,
    Category::RDFS,
];

const DIRECTOR_ID: &[&str] = &["directorId"];
const PORT_ID: &[&str] = &["directorId", "portId"];

pub fn lookup(category: Category) -> &'static CategorySpec {
    use CategoryKind::*;

    match category {
        Category::Array => &CategorySpec {
            category: Category::Array,
            kind: Array,
            label: ARRAY_LABEL,
            id_fields: &["symmetrixId"],
            port: None,
        },
        Category::FEDirector => &CategorySpec {
            category: Category::FEDirector,
            kind: Director,
            label: "{#FEDIRID}",
            id_fields: DIRECTOR_ID,
            port: Some(Category::FEPort),
        },
        Category::FEPort => &CategorySpec {
            category: Category::FEPort,
            kind: Port,
            label: "{#FEPORTID}",
            id_fields: PORT_ID,
            port: None,
        },
        Category::BEDirector => &CategorySpec {
            category: Category::BEDirector,
            kind: Director,
            label: "{#BEDIRID}",
            id_fields: DIRECTOR_ID,
            port: Some(Category::BEPort),
        },
        Category::BEPort => &CategorySpec {
            category: Category::BEPort,
            kind: Port,
            label: "{#BEPORTID}",
            id_fields: PORT_ID,
            port: None,
        },
        Category::RDFDirector => &CategorySpec {
            category: Category::RDFDirector,
            kind: Director,
            label: "{#RDFDIRID}",
            id_fields: DIRECTOR_ID,
            port: Some(Category::RDFPort),
        },
        Category::RDFPort => &CategorySpec {
            category: Category::RDFPort,
            kind: Port,
            label: "{#RDFPORTID}",
            id_fields: PORT_ID,
            port: None,
        },
        Category::EDSDirector => &CategorySpec {
            category: Category::EDSDirector,
            kind: Director,
            label: "{#EDSDIRID}",
            id_fields: DIRECTOR_ID,
            port: None,
        },
        Category::IMDirector => &CategorySpec {
            category: Category::IMDirector,
            kind: Director,
            label: "{#IMDIRID}",
            id_fields: DIRECTOR_ID,
            port: None,
        },
        Category::SRP => &CategorySpec {
            category: Category::SRP,
            kind: Item,
            label: "{#SRPID}",
            id_fields: &["srpId"],
            port: None,
        },
        Category::Board => &CategorySpec {
            category: Category::Board,
            kind: Item,
            label: "{#BOARDID}",
            id_fields: &["boardId"],
            port: None,
        },
        Category::DiskGroup => &CategorySpec {
            category: Category::DiskGroup,
            kind: Item,
            label: "{#DISKGROUPID}",
            id_fields: &["diskGroupId"],
            port: None,
        },
        Category::StorageGroup => &CategorySpec {
            category: Category::StorageGroup,
            kind: Item,
            label: "{#SGID}",
            id_fields: &["storageGroupId"],
            port: None,
        },
        Category::PortGroup => &CategorySpec {
            category: Category::PortGroup,
            kind: Item,
            label: "{#PGID}",
            id_fields: &["portGroupId"],
            port: None,
        },
        Category::Host => &CategorySpec {
            category: Category::Host,
            kind: Item,
            label: "{#HOSTID}",
            id_fields: &["hostId"],
            port: None,
        },
        Category::Initiator => &CategorySpec {
            category: Category::Initiator,
            kind: Item,
            label: "{#INITIATORID}",
            id_fields: &["initiatorId"],
            port: None,
        },
        Category::FEEmulation => &CategorySpec {
            category: Category::FEEmulation,
            kind: Item,
            label: "{#EMULATIONID}",
            id_fields: &["feEmulationId"],
            port: None,
        },
        Category::ISCSITarget => &CategorySpec {
            category: Category::ISCSITarget,
            kind: Item,
            label: "{#ISCSIID}",
            id_fields: &["iSCSITargetId"],
            port: None,
        },
        Category::RDFS => &CategorySpec {
            category: Category::RDFS,
            kind: Item,
            label: "{#RDFGROUPID}",
            id_fields: &["raGroupId"],
            port: None,
        },
    }
}
