//! Relationship expansion: `include` parameter plus nested related shapes.

use resource_core::ResourceModel;
use serde_json::{json, Value};

use crate::api::document::{HttpMethod, Parameter, ParamLocation, Paths};
use crate::api::paths::{collection_path, item_get, item_path};
use crate::error::CompileError;

/// Returns a new path map in which every resource with relationships accepts
/// `include` on its list and item GETs and exposes each related item shape under
/// the relation alias. Related shapes are read from `paths` (the input), one hop.
pub fn expand_includes(
    paths: &Paths,
    resources: &ResourceModel,
    prefix: &str,
) -> Result<Paths, CompileError> {
    let mut out = paths.clone();

    for resource in resources.iter().filter(|r| !r.relationships.is_empty()) {
        let mut nested = serde_json::Map::new();
        for rel in &resource.relationships {
            let target = item_get(paths, prefix, &rel.target).ok_or_else(|| {
                CompileError::UnknownRelationTarget {
                    resource: resource.name.clone(),
                    alias: rel.alias.clone(),
                    target: rel.target.clone(),
                }
            })?;
            nested.insert(rel.alias.clone(), related_shape(target, rel.many));
        }

        let include = Parameter {
            name: "include".to_string(),
            location: ParamLocation::Query,
            required: false,
            description: Some("Relations to embed in the response".to_string()),
            schema: json!({
                "type": "array",
                "items": {
                    "type": "string",
                    "enum": resource.relationships.iter().map(|r| r.alias.as_str()).collect::<Vec<_>>(),
                }
            }),
        };

        let list_path = collection_path(prefix, &resource.name);
        if let Some(op) = out
            .get_mut(&list_path)
            .and_then(|item| item.get_mut(&HttpMethod::Get))
        {
            op.parameters.push(include.clone());
            if let Some(props) = op
                .responses
                .get_mut("200")
                .and_then(|r| r.content.values_mut().next())
                .and_then(|m| m.schema.pointer_mut("/properties/data/items/properties"))
            {
                splice(props, &nested);
            }
        }

        let one_path = item_path(prefix, &resource.name);
        if let Some(op) = out
            .get_mut(&one_path)
            .and_then(|item| item.get_mut(&HttpMethod::Get))
        {
            op.parameters.push(include);
            if let Some(props) = op
                .responses
                .get_mut("200")
                .and_then(|r| r.content.values_mut().next())
                .and_then(|m| m.schema.pointer_mut("/properties"))
            {
                splice(props, &nested);
            }
        }

        tracing::debug!(
            resource = %resource.name,
            relations = resource.relationships.len(),
            "expanded includes"
        );
    }

    Ok(out)
}

/// Nullable object, or nullable array of objects for to-many relations.
fn related_shape(item: &Value, many: bool) -> Value {
    if many {
        json!({ "type": "array", "items": item, "nullable": true })
    } else {
        let mut shape = item.clone();
        if let Some(obj) = shape.as_object_mut() {
            obj.insert("nullable".to_string(), Value::Bool(true));
        }
        shape
    }
}

fn splice(props: &mut Value, nested: &serde_json::Map<String, Value>) {
    if let Some(obj) = props.as_object_mut() {
        for (alias, shape) in nested {
            obj.insert(alias.clone(), shape.clone());
        }
    }
}
