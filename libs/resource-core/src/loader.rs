//! Resource model files (YAML or JSON) → [`ResourceModel`].
//!
//! Column declaration order is kept: the `columns` mapping is read into an ordered
//! [`serde_yaml::Mapping`] before being converted.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Number, Value};
use serde_yaml::Mapping;

use crate::error::ResourceError;
use crate::model::{Column, ColumnKind, Reference, Relationship, Resource, ResourceModel};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawModel {
    #[serde(default)]
    resources: BTreeMap<String, RawResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawResource {
    table: Option<String>,
    #[serde(default)]
    columns: Mapping,
    #[serde(default)]
    search_fields: Vec<String>,
    #[serde(default)]
    relationships: Vec<RawRelationship>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawColumn {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    primary_key: bool,
    allow_null: Option<bool>,
    #[serde(default)]
    required: bool,
    default_value: Option<Value>,
    min: Option<Number>,
    max: Option<Number>,
    max_length: Option<u64>,
    #[serde(default, alias = "values")]
    enum_values: Vec<String>,
    #[serde(default)]
    unique: bool,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    protected: bool,
    #[serde(default)]
    immutable: bool,
    description: Option<String>,
    references: Option<Reference>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRelationship {
    target: String,
    alias: Option<String>,
    #[serde(default)]
    many: bool,
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Raw {
            resource: String,
            #[serde(default = "default_reference_column")]
            column: String,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(Reference {
            resource: raw.resource,
            column: raw.column,
        })
    }
}

fn default_reference_column() -> String {
    "id".to_string()
}

/// Load a model file; `.json` files go through `serde_json`, anything else through `serde_yaml`.
pub fn load_from_path(path: &Path) -> Result<ResourceModel, ResourceError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ResourceError::Io(format!("{}: {e}", path.display())))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let model = if is_json {
        from_json_str(&text)?
    } else {
        from_yaml_str(&text)?
    };
    tracing::debug!(
        path = %path.display(),
        resources = model.len(),
        "loaded resource model"
    );
    Ok(model)
}

pub fn from_yaml_str(text: &str) -> Result<ResourceModel, ResourceError> {
    let raw: RawModel =
        serde_yaml::from_str(text).map_err(|e| ResourceError::Parse(e.to_string()))?;
    normalize(raw)
}

pub fn from_json_str(text: &str) -> Result<ResourceModel, ResourceError> {
    let raw: RawModel =
        serde_json::from_str(text).map_err(|e| ResourceError::Parse(e.to_string()))?;
    normalize(raw)
}

fn normalize(raw: RawModel) -> Result<ResourceModel, ResourceError> {
    let mut model = ResourceModel::new();
    for (name, raw_resource) in raw.resources {
        model.insert(normalize_resource(name, raw_resource)?);
    }
    model.validate()?;
    Ok(model)
}

fn normalize_resource(name: String, raw: RawResource) -> Result<Resource, ResourceError> {
    let mut resource = Resource::new(name);
    if let Some(table) = raw.table {
        resource.table = table;
    }

    for (key, value) in raw.columns {
        let column_name = match key {
            serde_yaml::Value::String(s) => s,
            other => {
                return Err(ResourceError::Parse(format!(
                    "resource '{}': column names must be strings, got {other:?}",
                    resource.name
                )))
            }
        };
        let raw_column: RawColumn = serde_yaml::from_value(value).map_err(|e| {
            ResourceError::Parse(format!(
                "resource '{}', column '{column_name}': {e}",
                resource.name
            ))
        })?;
        let column = normalize_column(&resource.name, column_name, raw_column)?;
        resource.columns.push(column);
    }

    resource.search_fields = raw.search_fields;
    resource.relationships = raw
        .relationships
        .into_iter()
        .map(|r| Relationship {
            alias: r.alias.unwrap_or_else(|| r.target.to_lowercase()),
            target: r.target,
            many: r.many,
        })
        .collect();
    Ok(resource)
}

fn normalize_column(
    resource: &str,
    name: String,
    raw: RawColumn,
) -> Result<Column, ResourceError> {
    let kind: ColumnKind = raw
        .kind
        .parse()
        .map_err(|_| ResourceError::UnknownColumnType {
            resource: resource.to_string(),
            column: name.clone(),
            kind: raw.kind.clone(),
        })?;

    let mut column = Column::new(name, kind);
    column.primary_key = raw.primary_key;
    // Key columns are never nullable unless the file says so explicitly.
    let key_like = raw.primary_key || column.name == "id";
    column.allow_null = raw.allow_null.unwrap_or(!key_like);
    column.required = raw.required;
    column.default_value = raw.default_value;
    column.min = raw.min;
    column.max = raw.max;
    column.max_length = raw.max_length;
    column.enum_values = raw.enum_values;
    column.unique = raw.unique;
    column.private = raw.private;
    column.protected = raw.protected;
    column.immutable = raw.immutable;
    column.description = raw.description;
    column.reference = raw.references;
    Ok(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOG: &str = r#"
resources:
  Author:
    columns:
      id:    { type: integer, primaryKey: true }
      name:  { type: string, maxLength: 120, allowNull: false }
      email: { type: varchar, protected: true }
    searchFields: [name]
  Message:
    table: msgs
    columns:
      id:       { type: integer }
      message:  { type: text }
      authorId: { type: integer, references: { resource: Author } }
      status:   { type: enum, values: [draft, sent], defaultValue: draft }
    relationships:
      - { target: Author, alias: author }
"#;

    #[test]
    fn loads_yaml_and_keeps_column_order() {
        let model = from_yaml_str(BLOG).unwrap();
        let message = model.get("Message").unwrap();
        let names: Vec<&str> = message.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "message", "authorId", "status"]);
        assert_eq!(message.table, "msgs");
        assert_eq!(message.primary_key().unwrap().name, "id");

        let author_id = message.get_column("authorId").unwrap();
        assert_eq!(
            author_id.reference,
            Some(Reference {
                resource: "Author".into(),
                column: "id".into()
            })
        );
        let status = message.get_column("status").unwrap();
        assert_eq!(status.enum_values, vec!["draft", "sent"]);
        assert_eq!(status.default_value, Some(Value::from("draft")));
    }

    #[test]
    fn defaults_table_and_nullability() {
        let model = from_yaml_str(BLOG).unwrap();
        let author = model.get("Author").unwrap();
        assert_eq!(author.table, "authors");
        assert!(!author.get_column("id").unwrap().allow_null);
        assert!(!author.get_column("name").unwrap().allow_null);
        assert!(author.get_column("email").unwrap().allow_null);
        assert_eq!(author.get_column("email").unwrap().kind, ColumnKind::String);
    }

    #[test]
    fn json_is_accepted() {
        let text = r#"{"resources":{"Tag":{"columns":{"id":{"type":"uuid"},"label":{"type":"string"}}}}}"#;
        let model = from_json_str(text).unwrap();
        assert_eq!(model.get("Tag").unwrap().columns.len(), 2);
    }

    #[test]
    fn unknown_column_type_is_fatal() {
        let text = "resources:\n  Place:\n    columns:\n      id: { type: integer }\n      geom: { type: geometry }\n";
        assert_eq!(
            from_yaml_str(text).unwrap_err(),
            ResourceError::UnknownColumnType {
                resource: "Place".into(),
                column: "geom".into(),
                kind: "geometry".into(),
            }
        );
    }

    #[test]
    fn unknown_relation_target_is_fatal() {
        let text = "resources:\n  Post:\n    columns:\n      id: { type: integer }\n    relationships:\n      - { target: Ghost }\n";
        assert!(matches!(
            from_yaml_str(text),
            Err(ResourceError::UnknownRelationTarget { alias, .. }) if alias == "ghost"
        ));
    }

    #[test]
    fn load_from_path_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.yaml");
        std::fs::write(&path, BLOG).unwrap();
        let model = load_from_path(&path).unwrap();
        assert_eq!(model.len(), 2);

        let missing = load_from_path(&dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(ResourceError::Io(_))));
    }
}
