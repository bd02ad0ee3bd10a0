//! OpenAPI 3.0 document model emitted by the compiler.
//!
//! Schemas are kept as plain JSON values: the include expander, the dedup pass and the
//! route binder all rewrite them structurally.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OPENAPI_VERSION: &str = "3.0.0";
pub const APPLICATION_JSON: &str = "application/json";
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// URL template → method → operation.
pub type Paths = BTreeMap<String, PathItem>;
pub type PathItem = BTreeMap<HttpMethod, Operation>;

/// Path → method → admin entry; mirrors a subset of [`Paths`].
pub type AdminData = BTreeMap<String, BTreeMap<HttpMethod, AdminEntry>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for http::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
        }
    }
}

/// Semantic role of an operation, consumed by admin tooling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminType {
    List,
    Search,
    Create,
    Read,
    Update,
    Delete,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminEntry {
    pub types: Vec<AdminType>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
}

impl Response {
    pub fn json_schema(&self) -> Option<&Value> {
        self.content.get(APPLICATION_JSON).map(|m| &m.schema)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Status code → response, e.g. `"200"`.
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
    #[serde(rename = "x-admin", default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminEntry>,
    #[serde(rename = "x-resource", default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Columns the `search` parameter is matched against.
    #[serde(
        rename = "x-search-fields",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub search_fields: Vec<String>,
}

impl Operation {
    pub fn params_in(&self, location: ParamLocation) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(move |p| p.location == location)
    }

    pub fn has_admin_type(&self, ty: AdminType) -> bool {
        self.admin.as_ref().is_some_and(|a| a.types.contains(&ty))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            version: "0.1.0".to_string(),
            description: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSection {
    #[serde(default)]
    pub resources: AdminData,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: Paths,
    #[serde(rename = "x-admin", default)]
    pub admin: AdminSection,
    #[serde(default)]
    pub components: Components,
}

impl OpenApiDocument {
    pub fn new(info: Info, servers: Vec<Server>) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info,
            servers,
            paths: Paths::new(),
            admin: AdminSection::default(),
            components: Components::default(),
        }
    }

    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.get(&method))
    }

    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &Operation)> {
        self.paths.iter().flat_map(|(path, item)| {
            item.iter()
                .map(move |(method, op)| (path.as_str(), *method, op))
        })
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// `{"$ref": "#/components/schemas/<name>"}`
pub fn schema_ref(name: &str) -> Value {
    serde_json::json!({ "$ref": format!("{SCHEMA_REF_PREFIX}{name}") })
}

/// Component name of a local `$ref`, if `schema` is one.
pub fn ref_target(schema: &Value) -> Option<&str> {
    schema
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix(SCHEMA_REF_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_openapi_field_names() {
        let mut doc = OpenApiDocument::new(Info::default(), vec![]);
        let op = Operation {
            operation_id: Some("author.list".into()),
            admin: Some(AdminEntry {
                types: vec![AdminType::List],
            }),
            ..Operation::default()
        };
        doc.paths
            .entry("/api/authors".into())
            .or_default()
            .insert(HttpMethod::Get, op);

        let json = doc.to_json().unwrap();
        assert_eq!(json["openapi"], "3.0.0");
        let get = &json["paths"]["/api/authors"]["get"];
        assert_eq!(get["operationId"], "author.list");
        assert_eq!(get["x-admin"]["types"][0], "list");
        assert!(json.get("x-admin").is_some());

        let back: OpenApiDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn ref_helpers() {
        let r = schema_ref("Error");
        assert_eq!(r["$ref"], "#/components/schemas/Error");
        assert_eq!(ref_target(&r), Some("Error"));
        assert_eq!(ref_target(&serde_json::json!({"type": "object"})), None);
    }
}
