use serde::Serialize;

/// Relation families the loader keeps as relation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelationKind {
    /// `IfcRelDefinesByProperties`: property/quantity set → objects.
    DefinesByProperties,
    /// `IfcRelContainedInSpatialStructure`: storey/space → elements.
    ContainedInSpatialStructure,
}

/// Physical kind of a quantity-value entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityKind {
    Length,
    Area,
    Volume,
    Count,
    Weight,
    Time,
}

impl QuantityKind {
    #[must_use]
    pub fn from_ifc_type(entity_type: &str) -> Option<Self> {
        match entity_type {
            "IFCQUANTITYLENGTH" => Some(Self::Length),
            "IFCQUANTITYAREA" => Some(Self::Area),
            "IFCQUANTITYVOLUME" => Some(Self::Volume),
            "IFCQUANTITYCOUNT" => Some(Self::Count),
            "IFCQUANTITYWEIGHT" => Some(Self::Weight),
            "IFCQUANTITYTIME" => Some(Self::Time),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Area => "area",
            Self::Volume => "volume",
            Self::Count => "count",
            Self::Weight => "weight",
            Self::Time => "time",
        }
    }

    /// Unit hint for display; quantities carry no unit of their own here.
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::Length => "m",
            Self::Area => "m²",
            Self::Volume => "m³",
            Self::Count => "pcs",
            Self::Weight => "kg",
            Self::Time => "s",
        }
    }
}

/// Payload of a property-table entity, discriminated by its IFC type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EntityKind {
    Relation {
        kind: RelationKind,
        /// The property definition (or spatial structure) the relation points at.
        relating_id: Option<u64>,
        related_ids: Vec<u64>,
    },
    QuantitySet {
        member_ids: Vec<u64>,
    },
    QuantityValue {
        kind: QuantityKind,
        value: Option<f64>,
    },
    Other,
}

/// One entity of a model's property table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyRecord {
    pub id: u64,
    pub entity_type: String,
    pub name: Option<String>,
    pub kind: EntityKind,
}

impl PropertyRecord {
    #[must_use]
    pub fn is_quantity_set(&self) -> bool {
        matches!(self.kind, EntityKind::QuantitySet { .. })
    }

    /// Name, treating an empty label as absent.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Finite numeric payload of a quantity-value entity.
    #[must_use]
    pub fn quantity_value(&self) -> Option<f64> {
        match self.kind {
            EntityKind::QuantityValue { value, .. } => value.filter(|v| v.is_finite()),
            _ => None,
        }
    }

    #[must_use]
    pub fn quantity_kind(&self) -> Option<QuantityKind> {
        match self.kind {
            EntityKind::QuantityValue { kind, .. } => Some(kind),
            _ => None,
        }
    }
}
