//! Column → property schema mapping and the create/update/response partition.

use std::collections::BTreeSet;

use resource_core::{Column, ColumnKind, Resource};
use serde_json::{json, Map, Value};

use crate::error::CompileError;

/// Columns that are never accepted on create, whatever their flags.
pub const SERVER_MANAGED: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// Which property sets a column belongs to, derived from its flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// Readable and writable.
    Public,
    /// Writable, never returned.
    Protected,
    /// Returned, never written after creation.
    Immutable,
    /// Both protected and immutable: in no set at all.
    Sealed,
    /// Never serialized, never accepted.
    Private,
}

impl Visibility {
    pub fn of(column: &Column) -> Self {
        match (column.private, column.protected, column.immutable) {
            (true, _, _) => Visibility::Private,
            (false, true, true) => Visibility::Sealed,
            (false, true, false) => Visibility::Protected,
            (false, false, true) => Visibility::Immutable,
            (false, false, false) => Visibility::Public,
        }
    }

    pub fn writable(self) -> bool {
        matches!(self, Visibility::Public | Visibility::Protected)
    }

    pub fn readable(self) -> bool {
        matches!(self, Visibility::Public | Visibility::Immutable)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub name: String,
    pub schema: Value,
    pub visibility: Visibility,
    pub primary_key: bool,
}

/// An object schema under construction: ordered keys plus a `required` list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertySet {
    pub properties: Map<String, Value>,
    pub required: Vec<String>,
}

impl PropertySet {
    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn to_schema(&self) -> Value {
        let mut schema = json!({
            "type": "object",
            "properties": Value::Object(self.properties.clone()),
        });
        if !self.required.is_empty() {
            schema["required"] = json!(self.required);
        }
        schema
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertySets {
    pub all: Vec<Property>,
    pub create: PropertySet,
    pub update: PropertySet,
    pub response: PropertySet,
    pub list_response: PropertySet,
}

/// `{type, format}` for a column kind; a total mapping over the closed enum.
pub fn kind_type(kind: ColumnKind) -> (&'static str, Option<&'static str>) {
    match kind {
        ColumnKind::String | ColumnKind::Text | ColumnKind::Char | ColumnKind::Enum => {
            ("string", None)
        }
        ColumnKind::Uuid => ("string", Some("uuid")),
        ColumnKind::Integer => ("integer", Some("int32")),
        ColumnKind::BigInt => ("integer", Some("int64")),
        ColumnKind::Float => ("number", Some("float")),
        ColumnKind::Double | ColumnKind::Decimal => ("number", Some("double")),
        ColumnKind::Boolean => ("boolean", None),
        ColumnKind::Date => ("string", Some("date")),
        ColumnKind::DateTime => ("string", Some("date-time")),
        ColumnKind::Time => ("string", Some("time")),
        ColumnKind::Json => ("object", None),
        ColumnKind::Blob => ("string", Some("binary")),
    }
}

pub fn column_schema(column: &Column, primary_key: bool) -> Value {
    let (ty, format) = kind_type(column.kind);
    let mut schema = Map::new();
    schema.insert("type".into(), json!(ty));
    if let Some(format) = format {
        schema.insert("format".into(), json!(format));
    }
    if let Some(text) = &column.description {
        schema.insert("description".into(), json!(text));
    }
    if column.kind == ColumnKind::Enum {
        schema.insert("enum".into(), json!(column.enum_values));
    }
    if let Some(min) = &column.min {
        schema.insert("minimum".into(), Value::Number(min.clone()));
    }
    if let Some(max) = &column.max {
        schema.insert("maximum".into(), Value::Number(max.clone()));
    }
    if let Some(len) = column.max_length.filter(|_| column.kind.is_string_like()) {
        schema.insert("maxLength".into(), json!(len));
    }
    if let Some(default) = &column.default_value {
        schema.insert("default".into(), default.clone());
    }
    if column.allow_null {
        schema.insert("nullable".into(), json!(true));
    }
    if primary_key {
        schema.insert("x-primary-key".into(), json!(true));
    }
    if column.unique {
        schema.insert("x-unique".into(), json!(true));
    }
    if let Some(reference) = &column.reference {
        schema.insert(
            "x-reference".into(),
            json!({ "resource": reference.resource, "column": reference.column }),
        );
    }
    Value::Object(schema)
}

pub fn generate_properties(resource: &Resource) -> Result<PropertySets, CompileError> {
    let pk = resource.primary_key()?.name.clone();

    let all: Vec<Property> = resource
        .columns
        .iter()
        .map(|column| {
            let primary_key = column.name == pk;
            Property {
                name: column.name.clone(),
                schema: column_schema(column, primary_key),
                visibility: Visibility::of(column),
                primary_key,
            }
        })
        .collect();

    let mut create = PropertySet::default();
    let mut update = PropertySet::default();
    let mut response = PropertySet::default();

    for (prop, column) in all.iter().zip(&resource.columns) {
        if prop.visibility.writable() && !prop.primary_key {
            if !SERVER_MANAGED.contains(&prop.name.as_str()) {
                create
                    .properties
                    .insert(prop.name.clone(), prop.schema.clone());
                let must_send =
                    column.required || (!column.allow_null && column.default_value.is_none());
                if must_send {
                    create.required.push(prop.name.clone());
                }
            }
            update
                .properties
                .insert(prop.name.clone(), prop.schema.clone());
        }
        if prop.visibility.readable() {
            response
                .properties
                .insert(prop.name.clone(), prop.schema.clone());
        }
    }

    Ok(PropertySets {
        all,
        list_response: response.clone(),
        create,
        update,
        response,
    })
}

/// `orderBy` values: keys with any leading `-` stripped, first occurrence wins.
pub fn order_by_values<'a, I>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = BTreeSet::new();
    keys.into_iter()
        .map(|k| k.trim_start_matches('-'))
        .filter(|k| seen.insert(*k))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Resource {
        Resource::new("Account")
            .column(Column::new("id", ColumnKind::Uuid).primary_key())
            .column(Column::new("login", ColumnKind::String).not_null().max_length(40))
            .column(Column::new("password", ColumnKind::String).private())
            .column(Column::new("pin", ColumnKind::Integer).protected())
            .column(Column::new("ssn", ColumnKind::String).immutable())
            .column(Column::new("role", ColumnKind::Enum).values(["admin", "user"]).default_value("user").not_null())
            .column(Column::new("createdAt", ColumnKind::DateTime))
    }

    #[test]
    fn private_columns_are_nowhere() {
        let sets = generate_properties(&account()).unwrap();
        for set in [&sets.create, &sets.update, &sets.response, &sets.list_response] {
            assert!(!set.contains("password"));
        }
    }

    #[test]
    fn protected_columns_are_write_only() {
        let sets = generate_properties(&account()).unwrap();
        assert!(sets.create.contains("pin"));
        assert!(sets.update.contains("pin"));
        assert!(!sets.response.contains("pin"));
        assert!(!sets.list_response.contains("pin"));
    }

    #[test]
    fn immutable_columns_are_read_only() {
        let sets = generate_properties(&account()).unwrap();
        assert!(!sets.create.contains("ssn"));
        assert!(!sets.update.contains("ssn"));
        assert!(sets.response.contains("ssn"));
    }

    #[test]
    fn server_managed_columns_are_not_created() {
        let sets = generate_properties(&account()).unwrap();
        assert!(!sets.create.contains("id"));
        assert!(!sets.create.contains("createdAt"));
        assert!(sets.response.contains("id"));
        assert!(sets.response.contains("createdAt"));
    }

    #[test]
    fn create_required_list() {
        let sets = generate_properties(&account()).unwrap();
        // login is non-null without default; role has a default.
        assert_eq!(sets.create.required, vec!["login"]);
        assert!(sets.update.required.is_empty());
        assert_eq!(sets.create.to_schema()["required"], json!(["login"]));
        assert!(sets.update.to_schema().get("required").is_none());
    }

    #[test]
    fn column_schema_copies_constraints() {
        let sets = generate_properties(&account()).unwrap();
        let login = &sets.response.properties["login"];
        assert_eq!(login["type"], "string");
        assert_eq!(login["maxLength"], 40);
        assert!(login.get("nullable").is_none());

        let role = &sets.response.properties["role"];
        assert_eq!(role["enum"], json!(["admin", "user"]));
        assert_eq!(role["default"], "user");

        let id = &sets.response.properties["id"];
        assert_eq!(id["format"], "uuid");
        assert_eq!(id["x-primary-key"], true);

        let age = column_schema(
            &Column::new("age", ColumnKind::Integer).min(0).max(150).max_length(3),
            false,
        );
        assert_eq!(age["minimum"], 0);
        assert_eq!(age["maximum"], 150);
        assert!(age.get("maxLength").is_none());
        assert_eq!(age["nullable"], true);
    }

    #[test]
    fn visibility_tags() {
        let c = Column::new("x", ColumnKind::String);
        assert_eq!(Visibility::of(&c), Visibility::Public);
        assert_eq!(Visibility::of(&c.clone().protected().immutable()), Visibility::Sealed);
        assert_eq!(Visibility::of(&c.clone().private().protected()), Visibility::Private);
    }

    #[test]
    fn order_by_strips_descending_prefix() {
        assert_eq!(
            order_by_values(["name", "-name", "-createdAt", "id"]),
            vec!["name", "createdAt", "id"]
        );
    }
}
