//! Schema definition types.

use brewline_core::Value;
use std::collections::BTreeMap;
use std::fmt;

/// The declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    /// String constrained to email format.
    Email,
    Int,
    Float,
    Bool,
    /// Calendar date (`YYYY-MM-DD`).
    Date,
    /// UTC timestamp (RFC 3339).
    DateTime,
    /// Reference to another record.
    Id,
    /// Member of a named enumeration.
    Enum(String),
    /// Structured value of a named custom type.
    Custom(String),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "String"),
            FieldType::Email => write!(f, "Email"),
            FieldType::Int => write!(f, "Int"),
            FieldType::Float => write!(f, "Float"),
            FieldType::Bool => write!(f, "Bool"),
            FieldType::Date => write!(f, "Date"),
            FieldType::DateTime => write!(f, "DateTime"),
            FieldType::Id => write!(f, "Id"),
            FieldType::Enum(name) => write!(f, "Enum({})", name),
            FieldType::Custom(name) => write!(f, "Custom({})", name),
        }
    }
}

/// Field definition within an entity or custom type.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Element type (for arrays, the type of each element).
    pub field_type: FieldType,
    /// Whether this field must be present and non-empty.
    pub required: bool,
    /// Whether this field holds a list of `field_type`.
    pub array: bool,
    /// Maximum list length, enforced when set.
    pub max_items: Option<usize>,
    /// Default value if not provided on create.
    pub default: Option<Value>,
    /// Filled with the commit time when absent on create.
    pub stamp_on_create: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            array: false,
            max_items: None,
            default: None,
            stamp_on_create: false,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn id(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Id)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Bool)
    }

    pub fn enumeration(name: impl Into<String>, enum_name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Enum(enum_name.into()))
    }

    pub fn custom(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Custom(type_name.into()))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn stamp_on_create(mut self) -> Self {
        self.stamp_on_create = true;
        self
    }

    /// Human readable type, e.g. `[Id]` for an id list.
    pub fn type_label(&self) -> String {
        if self.array {
            format!("[{}]", self.field_type)
        } else {
            self.field_type.to_string()
        }
    }
}

/// How a relation is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// The declaring entity holds the foreign key.
    BelongsTo,
    /// The target entity holds the foreign key; any number of matches.
    HasMany,
    /// The target entity holds the foreign key; at most one match.
    HasOne,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::BelongsTo => write!(f, "belongsTo"),
            RelationKind::HasMany => write!(f, "hasMany"),
            RelationKind::HasOne => write!(f, "hasOne"),
        }
    }
}

/// A relation descriptor declared on an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    /// Relation name, e.g. `author` or `myRecipes`.
    pub name: String,
    pub kind: RelationKind,
    /// Entity on the other side.
    pub target: String,
    /// Foreign-key field name.
    pub foreign_key: String,
}

impl RelationDef {
    /// The entity whose records carry the foreign key.
    pub fn key_holder<'a>(&'a self, declaring_entity: &'a str) -> &'a str {
        match self.kind {
            RelationKind::BelongsTo => declaring_entity,
            RelationKind::HasMany | RelationKind::HasOne => &self.target,
        }
    }
}

/// Entity type definition.
#[derive(Debug, Clone)]
pub struct EntityDef {
    /// Entity name.
    pub name: String,
    /// Field definitions.
    pub fields: BTreeMap<String, FieldDef>,
    /// Relation descriptors.
    pub relations: BTreeMap<String, RelationDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
            relations: BTreeMap::new(),
        }
    }

    /// Get a field definition by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Check if this entity has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get all field names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|s| s.as_str())
    }

    /// Get a relation descriptor by name.
    pub fn get_relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.get(name)
    }

    /// Relations where this entity holds the foreign key.
    pub fn belongs_to(&self) -> impl Iterator<Item = &RelationDef> {
        self.relations
            .values()
            .filter(|r| r.kind == RelationKind::BelongsTo)
    }
}

/// Enumeration definition. Members are matched by exact literal name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub members: Vec<String>,
}

impl EnumDef {
    pub fn contains(&self, member: &str) -> bool {
        self.members.iter().any(|m| m == member)
    }
}

/// Custom (struct) type definition, e.g. a geographic location.
#[derive(Debug, Clone)]
pub struct CustomTypeDef {
    pub name: String,
    pub fields: BTreeMap<String, FieldDef>,
}
