//! The five CRUD operations of a resource.

use resource_core::naming::collection_segment;
use resource_core::{ListMeta, Resource};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::admin::collect_admin;
use crate::api::document::{AdminData, AdminType, HttpMethod, Paths};
use crate::api::operation_builder::{OperationBuilder, OperationSpec};
use crate::api::property::{column_schema, generate_properties, order_by_values};
use crate::error::CompileError;

/// Placeholder substituted with the lower-cased resource name.
pub const NAME_PLACEHOLDER: &str = "$name";

/// Tags per CRUD role; every list defaults to `["$name"]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagsConfig {
    pub create: Vec<String>,
    pub read: Vec<String>,
    pub update: Vec<String>,
    pub delete: Vec<String>,
    pub list: Vec<String>,
}

impl Default for TagsConfig {
    fn default() -> Self {
        let name = vec![NAME_PLACEHOLDER.to_string()];
        Self {
            create: name.clone(),
            read: name.clone(),
            update: name.clone(),
            delete: name.clone(),
            list: name,
        }
    }
}

fn resolve_tags(tags: &[String], resource: &str) -> Vec<String> {
    let lower = resource.to_lowercase();
    tags.iter()
        .map(|t| t.replace(NAME_PLACEHOLDER, &lower))
        .collect()
}

/// Output of [`generate_resource_schemas`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceSchemas {
    pub paths: Paths,
    pub admin_data: AdminData,
}

pub fn collection_path(prefix: &str, resource: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), collection_segment(resource))
}

pub fn item_path(prefix: &str, resource: &str) -> String {
    format!("{}/{{id}}", collection_path(prefix, resource))
}

/// Schema of the list envelope `meta` block.
pub fn list_meta_schema() -> Value {
    let schema = <ListMeta as utoipa::PartialSchema>::schema();
    serde_json::to_value(schema).unwrap_or_else(|_| {
        let int = json!({ "type": "integer", "minimum": 0 });
        json!({
            "type": "object",
            "properties": {
                "offset": int, "page": int, "limit": int,
                "totalPages": int, "totalItems": int
            }
        })
    })
}

pub fn list_envelope(item: Value) -> Value {
    json!({
        "type": "object",
        "properties": {
            "data": { "type": "array", "items": item },
            "meta": list_meta_schema(),
        }
    })
}

pub fn generate_resource_schemas(
    resource: &Resource,
    tags: &TagsConfig,
    prefix: &str,
) -> Result<ResourceSchemas, CompileError> {
    let sets = generate_properties(resource)?;
    let pk = resource.primary_key()?;
    let name = resource.name.as_str();
    let lower = name.to_lowercase();
    let collection = collection_path(prefix, name);
    let item = item_path(prefix, name);

    let item_schema = sets.response.to_schema();
    let list_item_schema = sets.list_response.to_schema();
    let mut id_schema = column_schema(pk, false);
    if let Some(obj) = id_schema.as_object_mut() {
        obj.remove("nullable");
        obj.remove("default");
    }

    let list_types = if resource.is_searchable() {
        vec![AdminType::List, AdminType::Search]
    } else {
        vec![AdminType::List]
    };

    let mut list = OperationBuilder::get(collection.as_str())
        .operation_id(format!("{lower}.list"))
        .summary(format!("List {name} items"))
        .tags(resolve_tags(&tags.list, name))
        .resource(name)
        .admin_types(list_types)
        .query_param_typed(
            "offset",
            false,
            "Number of items to skip",
            json!({ "type": "integer", "minimum": 0 }),
        )
        .query_param_typed(
            "page",
            false,
            "1-based page number (ignored when offset is given)",
            json!({ "type": "integer", "minimum": 1 }),
        )
        .query_param_typed(
            "limit",
            false,
            "Page size",
            json!({ "type": "integer", "minimum": 1, "maximum": resource_core::page::MAX_LIMIT }),
        );
    list = list.query_param("search", false, "Free-text search term");
    if resource.is_searchable() {
        list = list.search_fields(&resource.search_fields);
    }
    let list = list
        .query_param_typed(
            "orderBy",
            false,
            "Sort field; prefix with '-' for descending",
            json!({ "type": "string", "enum": order_by_values(sets.list_response.keys()) }),
        )
        .query_param_typed(
            "order",
            false,
            "Sort direction",
            json!({ "type": "string", "enum": ["asc", "desc"] }),
        )
        .json_response(200, format!("Page of {name} items"), list_envelope(list_item_schema))
        .standard_errors()
        .build();

    let create = OperationBuilder::post(collection.as_str())
        .operation_id(format!("{lower}.create"))
        .summary(format!("Create a {name}"))
        .tags(resolve_tags(&tags.create, name))
        .resource(name)
        .admin_types([AdminType::Create])
        .json_request(sets.create.to_schema(), format!("New {name}"))
        .json_response(201, format!("Created {name}"), item_schema.clone())
        .standard_errors()
        .build();

    let read = OperationBuilder::get(item.as_str())
        .operation_id(format!("{lower}.read"))
        .summary(format!("Get a {name} by id"))
        .tags(resolve_tags(&tags.read, name))
        .resource(name)
        .admin_types([AdminType::Read])
        .path_param("id", format!("{name} id"), id_schema.clone())
        .json_response(200, format!("The {name}"), item_schema.clone())
        .standard_errors()
        .build();

    let update = OperationBuilder::put(item.as_str())
        .operation_id(format!("{lower}.update"))
        .summary(format!("Update a {name}"))
        .tags(resolve_tags(&tags.update, name))
        .resource(name)
        .admin_types([AdminType::Update])
        .path_param("id", format!("{name} id"), id_schema.clone())
        .json_request(sets.update.to_schema(), format!("{name} fields to change"))
        .json_response(200, format!("Updated {name}"), item_schema)
        .standard_errors()
        .build();

    let delete = OperationBuilder::delete(item.as_str())
        .operation_id(format!("{lower}.delete"))
        .summary(format!("Delete a {name}"))
        .tags(resolve_tags(&tags.delete, name))
        .resource(name)
        .admin_types([AdminType::Delete])
        .path_param("id", format!("{name} id"), id_schema)
        .empty_response(204, format!("{name} deleted"))
        .standard_errors()
        .build();

    let mut paths = Paths::new();
    for spec in [list, create, read, update, delete] {
        insert_operation(&mut paths, spec);
    }
    tracing::debug!(resource = %name, collection = %collection, "generated CRUD operations");

    Ok(ResourceSchemas {
        admin_data: collect_admin(&paths),
        paths,
    })
}

pub fn insert_operation(paths: &mut Paths, spec: OperationSpec) {
    tracing::trace!(method = %spec.method, path = %spec.path, "operation");
    paths
        .entry(spec.path)
        .or_default()
        .insert(spec.method, spec.operation);
}

/// 200 response schema of a resource's item GET.
pub fn item_get<'a>(paths: &'a Paths, prefix: &str, resource: &str) -> Option<&'a Value> {
    paths
        .get(&item_path(prefix, resource))
        .and_then(|item| item.get(&HttpMethod::Get))
        .and_then(|op| op.responses.get("200"))
        .and_then(|r| r.json_schema())
}
