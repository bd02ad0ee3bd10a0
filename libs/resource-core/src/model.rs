//! Normalized resource model consumed by the API compiler.
//!
//! Values here are produced either by the file [`loader`](crate::loader) or by the
//! declarative builder methods below; downstream artifacts never mutate them.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::ResourceError;

/// Closed set of scalar column kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    String,
    Text,
    Char,
    Uuid,
    Integer,
    BigInt,
    Float,
    Double,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Time,
    Json,
    Enum,
    Blob,
}

impl ColumnKind {
    /// Kinds that accept a `maxLength` constraint.
    pub fn is_string_like(self) -> bool {
        matches!(self, Self::String | Self::Text | Self::Char)
    }

    /// Kinds that accept `minimum`/`maximum` constraints.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::BigInt | Self::Float | Self::Double | Self::Decimal
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Char => "char",
            Self::Uuid => "uuid",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Json => "json",
            Self::Enum => "enum",
            Self::Blob => "blob",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown column kind name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColumnKind(pub String);

impl FromStr for ColumnKind {
    type Err = UnknownColumnKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "string" | "varchar" => Self::String,
            "text" => Self::Text,
            "char" => Self::Char,
            "uuid" => Self::Uuid,
            "integer" | "int" => Self::Integer,
            "bigint" => Self::BigInt,
            "float" | "real" => Self::Float,
            "double" => Self::Double,
            "decimal" | "numeric" => Self::Decimal,
            "boolean" | "bool" => Self::Boolean,
            "date" | "dateonly" => Self::Date,
            "datetime" | "timestamp" => Self::DateTime,
            "time" => Self::Time,
            "json" | "jsonb" => Self::Json,
            "enum" => Self::Enum,
            "blob" => Self::Blob,
            _ => return Err(UnknownColumnKind(s.to_string())),
        })
    }
}

/// Foreign-key style pointer to a column of another resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub resource: String,
    pub column: String,
}

/// One column of a resource.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    pub primary_key: bool,
    pub allow_null: bool,
    pub required: bool,
    pub default_value: Option<Value>,
    pub min: Option<Number>,
    pub max: Option<Number>,
    pub max_length: Option<u64>,
    pub enum_values: Vec<String>,
    pub unique: bool,
    pub private: bool,
    pub protected: bool,
    pub immutable: bool,
    pub description: Option<String>,
    pub reference: Option<Reference>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            primary_key: false,
            allow_null: true,
            required: false,
            default_value: None,
            min: None,
            max: None,
            max_length: None,
            enum_values: Vec::new(),
            unique: false,
            private: false,
            protected: false,
            immutable: false,
            description: None,
            reference: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.allow_null = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.allow_null = false;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn min(mut self, n: impl Into<Number>) -> Self {
        self.min = Some(n.into());
        self
    }

    pub fn max(mut self, n: impl Into<Number>) -> Self {
        self.max = Some(n.into());
        self
    }

    pub fn max_length(mut self, len: u64) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn references(mut self, resource: impl Into<String>, column: impl Into<String>) -> Self {
        self.reference = Some(Reference {
            resource: resource.into(),
            column: column.into(),
        });
        self
    }
}

/// Relation from one resource to another, exposed under `alias`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub target: String,
    pub alias: String,
    /// To-many relation: the alias holds a list of target items.
    pub many: bool,
}

impl Relationship {
    pub fn one(target: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            alias: alias.into(),
            many: false,
        }
    }

    pub fn many(target: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            alias: alias.into(),
            many: true,
        }
    }
}

/// A named, column-described entity exposed as a REST collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub name: String,
    /// Handle of the backing table/model.
    pub table: String,
    /// Columns in declaration order.
    pub columns: Vec<Column>,
    pub search_fields: Vec<String>,
    pub relationships: Vec<Relationship>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            table: crate::naming::collection_segment(&name),
            name,
            columns: Vec::new(),
            search_fields: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_searchable(&self) -> bool {
        !self.search_fields.is_empty()
    }

    /// Resolve the single primary key column.
    ///
    /// An explicitly flagged column wins; otherwise a column named `id` is used.
    pub fn primary_key(&self) -> Result<&Column, ResourceError> {
        let flagged: Vec<&Column> = self.columns.iter().filter(|c| c.primary_key).collect();
        match flagged.as_slice() {
            [pk] => Ok(pk),
            [] => self
                .get_column("id")
                .ok_or_else(|| ResourceError::MissingPrimaryKey(self.name.clone())),
            many => Err(ResourceError::MultiplePrimaryKeys {
                resource: self.name.clone(),
                columns: many.iter().map(|c| c.name.clone()).collect(),
            }),
        }
    }

    pub fn private_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.private)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn protected_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.protected)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Columns never propagated to clients: private ∪ protected.
    pub fn no_propagate_columns(&self) -> BTreeSet<&str> {
        self.private_columns()
            .into_iter()
            .chain(self.protected_columns())
            .collect()
    }

    /// Checks that only need this resource (relationship targets are checked by the model).
    pub fn validate(&self) -> Result<(), ResourceError> {
        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ResourceError::DuplicateColumn {
                    resource: self.name.clone(),
                    column: column.name.clone(),
                });
            }
            if column.kind == ColumnKind::Enum && column.enum_values.is_empty() {
                return Err(ResourceError::EmptyEnum {
                    resource: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }
        self.primary_key()?;
        for field in &self.search_fields {
            if self.get_column(field).is_none() {
                return Err(ResourceError::UnknownSearchField {
                    resource: self.name.clone(),
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }
}

/// All resources of an application, keyed by resource name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResourceModel {
    pub resources: BTreeMap<String, Resource>,
}

impl ResourceModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: Resource) -> Self {
        self.insert(resource);
        self
    }

    pub fn insert(&mut self, resource: Resource) {
        self.resources.insert(resource.name.clone(), resource);
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn validate(&self) -> Result<(), ResourceError> {
        for resource in self.iter() {
            resource.validate()?;
            for rel in &resource.relationships {
                if !self.resources.contains_key(&rel.target) {
                    return Err(ResourceError::UnknownRelationTarget {
                        resource: resource.name.clone(),
                        alias: rel.alias.clone(),
                        target: rel.target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
