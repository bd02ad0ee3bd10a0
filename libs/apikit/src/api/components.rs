//! Schema deduplication pass.
//!
//! Inline request/response schemas are interned into `components.schemas` by
//! structural equality and replaced with `$ref`s. The registry is built fresh per
//! call and seeded from the components already present, so running the pass on
//! its own output changes nothing.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::api::document::{schema_ref, OpenApiDocument, ParamLocation};
use crate::error::CompileError;

/// Structural-equality cache of component schemas.
#[derive(Debug, Default)]
pub struct ComponentsRegistry {
    by_key: HashMap<String, String>,
    schemas: BTreeMap<String, Value>,
}

impl ComponentsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with existing components (first name wins per shape).
    pub fn seeded(existing: &BTreeMap<String, Value>) -> Self {
        let mut registry = Self::new();
        for (name, schema) in existing {
            registry
                .by_key
                .entry(canonical_key(schema))
                .or_insert_with(|| name.clone());
            registry.schemas.insert(name.clone(), schema.clone());
        }
        registry
    }

    /// Name under which `schema` is registered, interning it as `preferred` (or a
    /// suffixed variant on a name clash) if the shape is new.
    pub fn intern(&mut self, preferred: &str, schema: &Value) -> String {
        let key = canonical_key(schema);
        if let Some(name) = self.by_key.get(&key) {
            return name.clone();
        }
        let mut name = preferred.to_string();
        let mut n = 2;
        while self.schemas.contains_key(&name) {
            tracing::warn!(component = %preferred, "component name already taken by another shape");
            name = format!("{preferred}_{n}");
            n += 1;
        }
        self.by_key.insert(key, name.clone());
        self.schemas.insert(name.clone(), schema.clone());
        name
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn into_schemas(self) -> BTreeMap<String, Value> {
        self.schemas
    }
}

/// Compact serialization with object keys sorted at every level.
pub fn canonical_key(schema: &Value) -> String {
    let mut out = String::new();
    write_canonical(schema, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// `{METHOD}_{path}_{suffix}` with `/ { } - .` turned into `_` and runs collapsed.
pub fn component_name(method: &str, path: &str, suffix: &str) -> String {
    let raw = format!("{method}_{path}_{suffix}");
    let mut name = String::with_capacity(raw.len());
    for ch in raw.chars() {
        let ch = if matches!(ch, '/' | '{' | '}' | '-' | '.') {
            '_'
        } else {
            ch
        };
        if ch == '_' && name.ends_with('_') {
            continue;
        }
        name.push(ch);
    }
    name.trim_matches('_').to_string()
}

fn is_ref(schema: &Value) -> bool {
    schema.get("$ref").is_some()
}

/// Intern every inline response and request-body schema and check path parameters.
pub fn intern_schemas(doc: &OpenApiDocument) -> Result<OpenApiDocument, CompileError> {
    let mut out = doc.clone();
    let mut registry = ComponentsRegistry::seeded(&doc.components.schemas);
    let seeded = registry.len();

    for (path, item) in out.paths.iter_mut() {
        for (method, op) in item.iter_mut() {
            for param in op.params_in(ParamLocation::Path) {
                if !path.contains(&format!("{{{}}}", param.name)) {
                    return Err(CompileError::PathParamMismatch {
                        method: *method,
                        path: path.clone(),
                        param: param.name.clone(),
                    });
                }
            }

            for (status, response) in op.responses.iter_mut() {
                for media in response.content.values_mut() {
                    if is_ref(&media.schema) {
                        continue;
                    }
                    let preferred = component_name(method.as_str(), path, status);
                    let name = registry.intern(&preferred, &media.schema);
                    media.schema = schema_ref(&name);
                }
            }

            if let Some(body) = op.request_body.as_mut() {
                for media in body.content.values_mut() {
                    if is_ref(&media.schema) {
                        continue;
                    }
                    let preferred = component_name(method.as_str(), path, "request");
                    let name = registry.intern(&preferred, &media.schema);
                    media.schema = schema_ref(&name);
                }
            }
        }
    }

    tracing::debug!(
        seeded,
        interned = registry.len() - seeded,
        "schema deduplication finished"
    );
    out.components.schemas = registry.into_schemas();
    Ok(out)
}
