//! Route binder: compiled document → executable route table.
//!
//! Each operation gets a handler (explicit override or a default picked by its admin
//! role), a router path and pre-compiled request/response validators. The table can
//! be mounted on axum with [`into_router`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{Query, RawPathParams},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter},
    Json, Router,
};
use resource_core::{compile_search, ListQuery, SearchExpr};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::api::document::{
    ref_target, AdminType, HttpMethod, OpenApiDocument, Operation, ParamLocation, Parameter,
    APPLICATION_JSON,
};
use crate::api::problem::{bad_request, Problem, ProblemResponse, ValidationError};
use crate::error::CompileError;

const MAX_REF_DEPTH: usize = 32;

/// CRUD role a handler fulfils.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrudKind {
    List,
    Create,
    Read,
    Update,
    Delete,
}

impl CrudKind {
    pub const ALL: [CrudKind; 5] = [
        CrudKind::List,
        CrudKind::Create,
        CrudKind::Read,
        CrudKind::Update,
        CrudKind::Delete,
    ];

    /// Role of an operation: list-tagged GET → list, other GET → read, and so on.
    pub fn of(method: HttpMethod, op: &Operation) -> Self {
        match method {
            HttpMethod::Get if op.has_admin_type(AdminType::List) => CrudKind::List,
            HttpMethod::Get => CrudKind::Read,
            HttpMethod::Post => CrudKind::Create,
            HttpMethod::Put | HttpMethod::Patch => CrudKind::Update,
            HttpMethod::Delete => CrudKind::Delete,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CrudKind::List => "list",
            CrudKind::Create => "create",
            CrudKind::Read => "read",
            CrudKind::Update => "update",
            CrudKind::Delete => "delete",
        }
    }
}

impl fmt::Display for CrudKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Router path parameter syntax.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathSyntax {
    /// `/authors/:id`
    Colon,
    /// `/authors/{id}` (axum 0.8)
    #[default]
    Braces,
}

/// Translate an OpenAPI `{param}` template into the router's syntax.
pub fn translate_path(template: &str, syntax: PathSyntax) -> String {
    match syntax {
        PathSyntax::Braces => template.to_string(),
        PathSyntax::Colon => template
            .split('/')
            .map(|seg| match seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => format!(":{name}"),
                None => seg.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/"),
    }
}

/// Everything a handler receives for one request, already validated.
#[derive(Clone, Debug, Default)]
pub struct CrudRequest {
    pub resource: Option<String>,
    pub kind: Option<CrudKind>,
    pub operation_id: Option<String>,
    pub path_params: BTreeMap<String, String>,
    /// Raw query pairs in arrival order.
    pub query: Vec<(String, String)>,
    /// Parsed list parameters (list routes only).
    pub list: Option<ListQuery>,
    /// Compiled `search` term (list routes of searchable resources only).
    pub search: Option<SearchExpr>,
    pub include: Vec<String>,
    pub body: Option<Value>,
}

impl CrudRequest {
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CrudReply {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl CrudReply {
    pub fn ok(body: Value) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    pub fn created(body: Value) -> Self {
        Self::with_status(StatusCode::CREATED, body)
    }

    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
        }
    }

    pub fn with_status(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }
}

/// A request handler bound to one or more routes.
#[async_trait]
pub trait CrudHandler: Send + Sync {
    async fn handle(&self, req: CrudRequest) -> Result<CrudReply, Problem>;
}

#[async_trait]
impl<F, Fut> CrudHandler for F
where
    F: Fn(CrudRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<CrudReply, Problem>> + Send,
{
    async fn handle(&self, req: CrudRequest) -> Result<CrudReply, Problem> {
        (self)(req).await
    }
}

/// Explicit handler registration table.
///
/// Precedence when binding: exact `(path, method)` → `(resource, kind)` → default for
/// `kind`.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    routes: HashMap<(String, HttpMethod), Arc<dyn CrudHandler>>,
    resources: HashMap<(String, CrudKind), Arc<dyn CrudHandler>>,
    defaults: HashMap<CrudKind, Arc<dyn CrudHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override for one OpenAPI path template and method.
    pub fn route(
        mut self,
        path: impl Into<String>,
        method: HttpMethod,
        handler: impl CrudHandler + 'static,
    ) -> Self {
        self.routes.insert((path.into(), method), Arc::new(handler));
        self
    }

    /// Override for one CRUD role of a resource.
    pub fn resource(
        mut self,
        resource: impl Into<String>,
        kind: CrudKind,
        handler: impl CrudHandler + 'static,
    ) -> Self {
        self.resources
            .insert((resource.into(), kind), Arc::new(handler));
        self
    }

    pub fn default_handler(mut self, kind: CrudKind, handler: impl CrudHandler + 'static) -> Self {
        self.defaults.insert(kind, Arc::new(handler));
        self
    }

    /// One shared handler as the default for every role.
    pub fn default_for_all(mut self, handler: Arc<dyn CrudHandler>) -> Self {
        for kind in CrudKind::ALL {
            self.defaults.insert(kind, handler.clone());
        }
        self
    }

    pub fn resolve(
        &self,
        path: &str,
        method: HttpMethod,
        resource: Option<&str>,
        kind: CrudKind,
    ) -> Option<Arc<dyn CrudHandler>> {
        if let Some(h) = self.routes.get(&(path.to_string(), method)) {
            return Some(h.clone());
        }
        if let Some(h) = resource.and_then(|r| self.resources.get(&(r.to_string(), kind))) {
            return Some(h.clone());
        }
        self.defaults.get(&kind).cloned()
    }
}

/// A compiled JSON schema plus the source it was compiled from.
pub struct SchemaCheck {
    schema: Value,
    validator: jsonschema::Validator,
}

impl SchemaCheck {
    pub fn compile(schema: Value) -> Result<Self, String> {
        let validator = jsonschema::validator_for(&schema).map_err(|e| e.to_string())?;
        Ok(Self { schema, validator })
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    pub fn errors(&self, instance: &Value) -> Vec<ValidationError> {
        self.validator
            .iter_errors(instance)
            .map(|e| ValidationError {
                detail: e.to_string(),
                pointer: e.instance_path.to_string(),
            })
            .collect()
    }
}

impl fmt::Debug for SchemaCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCheck")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// One executable route.
#[derive(Clone)]
pub struct BoundRoute {
    pub method: HttpMethod,
    /// OpenAPI template, e.g. `/api/authors/{id}`.
    pub template: String,
    /// Router path in axum syntax.
    pub path: String,
    pub kind: CrudKind,
    pub resource: Option<String>,
    pub operation_id: Option<String>,
    pub search_fields: Vec<String>,
    pub query_params: Vec<Parameter>,
    pub body: Option<Arc<SchemaCheck>>,
    pub body_required: bool,
    pub query: Option<Arc<SchemaCheck>>,
    pub responses: BTreeMap<u16, Arc<SchemaCheck>>,
    pub handler: Arc<dyn CrudHandler>,
}

impl BoundRoute {
    pub fn router_path(&self, syntax: PathSyntax) -> String {
        translate_path(&self.template, syntax)
    }
}

impl fmt::Debug for BoundRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundRoute")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("resource", &self.resource)
            .field("body", &self.body.is_some())
            .field("query", &self.query.is_some())
            .field("responses", &self.responses.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Bind every operation of `doc` to a handler and compile its validators.
pub fn bind_routes(
    doc: &OpenApiDocument,
    handlers: &HandlerRegistry,
) -> Result<Vec<BoundRoute>, CompileError> {
    let mut routes = Vec::new();
    for (template, method, op) in doc.operations() {
        let kind = CrudKind::of(method, op);
        let resource = op.resource.as_deref();
        let handler = handlers
            .resolve(template, method, resource, kind)
            .ok_or_else(|| CompileError::MissingHandler {
                method,
                path: template.to_string(),
                kind: kind.to_string(),
            })?;

        let invalid = |part: &str, reason: String| CompileError::InvalidSchema {
            method,
            path: template.to_string(),
            part: part.to_string(),
            reason,
        };

        let mut responses = BTreeMap::new();
        for (status, response) in &op.responses {
            let (Ok(code), Some(schema)) = (status.parse::<u16>(), response.json_schema()) else {
                continue;
            };
            let resolved = resolve_refs(schema, doc, 0).map_err(|r| invalid("response", r))?;
            let lowered = lower_schema(&normalize_response(resolved));
            let check = SchemaCheck::compile(lowered).map_err(|r| invalid("response", r))?;
            responses.insert(code, Arc::new(check));
        }

        let mut body = None;
        let mut body_required = false;
        if let Some(rb) = &op.request_body {
            body_required = rb.required;
            if let Some(media) = rb.content.get(APPLICATION_JSON) {
                let resolved =
                    resolve_refs(&media.schema, doc, 0).map_err(|r| invalid("request body", r))?;
                let check = SchemaCheck::compile(lower_schema(&resolved))
                    .map_err(|r| invalid("request body", r))?;
                body = Some(Arc::new(check));
            }
        }

        let query_params: Vec<Parameter> = op.params_in(ParamLocation::Query).cloned().collect();
        let query = if op.request_body.is_some() && !query_params.is_empty() {
            let schema = querystring_schema(&query_params);
            let check = SchemaCheck::compile(schema).map_err(|r| invalid("querystring", r))?;
            Some(Arc::new(check))
        } else {
            None
        };

        tracing::debug!(%method, path = %template, %kind, "bound route");
        routes.push(BoundRoute {
            method,
            template: template.to_string(),
            path: translate_path(template, PathSyntax::Braces),
            kind,
            resource: op.resource.clone(),
            operation_id: op.operation_id.clone(),
            search_fields: op.search_fields.clone(),
            query_params,
            body,
            body_required,
            query,
            responses,
            handler,
        });
    }
    Ok(routes)
}

/// Inline every local `$ref` against `doc.components`.
fn resolve_refs(schema: &Value, doc: &OpenApiDocument, depth: usize) -> Result<Value, String> {
    if depth > MAX_REF_DEPTH {
        return Err("reference nesting too deep".to_string());
    }
    if let Some(name) = ref_target(schema) {
        let target = doc
            .components
            .schemas
            .get(name)
            .ok_or_else(|| format!("unresolved reference to '{name}'"))?;
        return resolve_refs(target, doc, depth + 1);
    }
    Ok(match schema {
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k.clone(), resolve_refs(v, doc, depth)?);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| resolve_refs(v, doc, depth))
                .collect::<Result<_, _>>()?,
        ),
        other => other.clone(),
    })
}

/// Object schemas pass; a non-object schema carrying `properties` describes the
/// elements of a list and becomes `{type: array, items}`.
fn normalize_response(schema: Value) -> Value {
    let is_object = schema.get("type").and_then(Value::as_str) == Some("object");
    if is_object || schema.get("properties").is_none() {
        return schema;
    }
    let mut items = schema;
    if let Some(obj) = items.as_object_mut() {
        obj.insert("type".to_string(), json!("object"));
    }
    json!({ "type": "array", "items": items })
}

/// OpenAPI schema → JSON Schema: drop `x-` keys, turn `nullable` into a `null` union.
pub fn lower_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::new();
            let mut nullable = false;
            for (k, v) in map {
                if k.starts_with("x-") {
                    continue;
                }
                if k == "nullable" {
                    nullable = v.as_bool().unwrap_or(false);
                    continue;
                }
                // Keys under `properties` are names, not keywords.
                let lowered = if k == "properties" {
                    match v {
                        Value::Object(props) => Value::Object(
                            props
                                .iter()
                                .map(|(name, s)| (name.clone(), lower_schema(s)))
                                .collect(),
                        ),
                        other => other.clone(),
                    }
                } else {
                    lower_schema(v)
                };
                out.insert(k.clone(), lowered);
            }
            if nullable {
                allow_null(&mut out);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(lower_schema).collect()),
        other => other.clone(),
    }
}

fn allow_null(schema: &mut Map<String, Value>) {
    match schema.get("type").cloned() {
        Some(Value::String(ty)) => {
            schema.insert("type".to_string(), json!([ty, "null"]));
            if let Some(Value::Array(values)) = schema.get_mut("enum") {
                if !values.contains(&Value::Null) {
                    values.push(Value::Null);
                }
            }
        }
        Some(_) => {}
        None => {
            let inner = Value::Object(std::mem::take(schema));
            schema.insert("anyOf".to_string(), json!([inner, { "type": "null" }]));
        }
    }
}

fn querystring_schema(params: &[Parameter]) -> Value {
    let properties: Map<String, Value> = params
        .iter()
        .map(|p| (p.name.clone(), lower_schema(&p.schema)))
        .collect();
    let required: Vec<&str> = params
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name.as_str())
        .collect();
    let mut schema = json!({ "type": "object", "properties": properties });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

/// Query pairs → JSON object typed after the declared parameter schemas.
fn coerce_query(pairs: &[(String, String)], params: &[Parameter]) -> Value {
    let mut out = Map::new();
    for (name, value) in pairs {
        let schema = params.iter().find(|p| &p.name == name).map(|p| &p.schema);
        let ty = schema.and_then(|s| s.get("type")).and_then(Value::as_str);
        if ty == Some("array") {
            let item_ty = schema
                .and_then(|s| s.pointer("/items/type"))
                .and_then(Value::as_str);
            let entry = out.entry(name.clone()).or_insert_with(|| json!([]));
            if let Value::Array(items) = entry {
                items.extend(
                    value
                        .split(',')
                        .filter(|s| !s.is_empty())
                        .map(|s| coerce_scalar(s, item_ty)),
                );
            }
        } else {
            out.insert(name.clone(), coerce_scalar(value, ty));
        }
    }
    Value::Object(out)
}

fn coerce_scalar(raw: &str, ty: Option<&str>) -> Value {
    match ty {
        Some("integer") => raw.parse::<i64>().map(Value::from).ok(),
        Some("number") => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        Some("boolean") => raw.parse::<bool>().map(Value::Bool).ok(),
        _ => None,
    }
    .unwrap_or_else(|| Value::String(raw.to_string()))
}

fn invalid_request(detail: &str, errors: Vec<ValidationError>) -> Response {
    ProblemResponse(bad_request(detail).with_errors(errors)).into_response()
}

impl BoundRoute {
    async fn dispatch(
        &self,
        path_params: BTreeMap<String, String>,
        query: Vec<(String, String)>,
        raw_body: Bytes,
    ) -> Response {
        let body = if raw_body.is_empty() {
            None
        } else {
            match serde_json::from_slice::<Value>(&raw_body) {
                Ok(v) => Some(v),
                Err(e) => {
                    return ProblemResponse(bad_request(format!("invalid JSON body: {e}")))
                        .into_response()
                }
            }
        };

        if let Some(check) = &self.body {
            match &body {
                Some(value) => {
                    let errors = check.errors(value);
                    if !errors.is_empty() {
                        return invalid_request("request body failed validation", errors);
                    }
                }
                None if self.body_required => {
                    return ProblemResponse(bad_request("request body is required"))
                        .into_response()
                }
                None => {}
            }
        }

        if let Some(check) = &self.query {
            let errors = check.errors(&coerce_query(&query, &self.query_params));
            if !errors.is_empty() {
                return invalid_request("query string failed validation", errors);
            }
        }

        let pairs = || query.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        let (list, search) = if self.kind == CrudKind::List {
            let list = match ListQuery::from_pairs(pairs()) {
                Ok(list) => list,
                Err(e) => return ProblemResponse(bad_request(e.to_string())).into_response(),
            };
            let search = match (&list.search, self.search_fields.is_empty()) {
                (Some(term), false) => Some(compile_search(&self.search_fields, term)),
                _ => None,
            };
            (Some(list), search)
        } else {
            (None, None)
        };
        let include = match &list {
            Some(list) => list.include.clone(),
            None => ListQuery::from_pairs(pairs().filter(|(k, _)| *k == "include"))
                .map(|q| q.include)
                .unwrap_or_default(),
        };

        let request = CrudRequest {
            resource: self.resource.clone(),
            kind: Some(self.kind),
            operation_id: self.operation_id.clone(),
            path_params,
            query,
            list,
            search,
            include,
            body,
        };

        match self.handler.handle(request).await {
            Ok(reply) => {
                if let (Some(check), Some(body)) =
                    (self.responses.get(&reply.status.as_u16()), &reply.body)
                {
                    let errors = check.errors(body);
                    if !errors.is_empty() {
                        tracing::warn!(
                            method = %self.method,
                            path = %self.template,
                            status = reply.status.as_u16(),
                            errors = ?errors,
                            "response does not match its declared schema"
                        );
                    }
                }
                match reply.body {
                    Some(body) => (reply.status, Json(body)).into_response(),
                    None => reply.status.into_response(),
                }
            }
            Err(problem) => ProblemResponse(problem).into_response(),
        }
    }
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Delete => MethodFilter::DELETE,
    }
}

/// Mount bound routes on an axum router, one adapter per route.
pub fn into_router(routes: Vec<BoundRoute>) -> Router {
    let mut by_path: BTreeMap<String, MethodRouter> = BTreeMap::new();
    for route in routes {
        let path = route.router_path(PathSyntax::Braces);
        let filter = method_filter(route.method);
        let route = Arc::new(route);
        let adapter = move |params: RawPathParams,
                            Query(query): Query<Vec<(String, String)>>,
                            body: Bytes| {
            let route = route.clone();
            let path_params: BTreeMap<String, String> = params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            async move { route.dispatch(path_params, query, body).await }
        };
        let method_router = by_path.remove(&path).unwrap_or_default();
        by_path.insert(path, method_router.on(filter, adapter));
    }

    by_path
        .into_iter()
        .fold(Router::new(), |router, (path, mr)| router.route(&path, mr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_templates() {
        assert_eq!(
            translate_path("/api/authors/{id}", PathSyntax::Colon),
            "/api/authors/:id"
        );
        assert_eq!(
            translate_path("/api/authors/{id}", PathSyntax::Braces),
            "/api/authors/{id}"
        );
        assert_eq!(translate_path("/api/authors", PathSyntax::Colon), "/api/authors");
    }

    #[test]
    fn lowering_strips_extensions_and_nullable() {
        let schema = json!({
            "type": "object",
            "properties": {
                "id": { "type": "integer", "x-primary-key": true },
                "nullable": { "type": "string", "nullable": true },
                "role": { "type": "string", "enum": ["a"], "nullable": true },
                "author": { "properties": {}, "nullable": true, "x-reference": {} }
            },
            "x-resource": "Thing"
        });
        let lowered = lower_schema(&schema);
        assert!(lowered.get("x-resource").is_none());
        let props = &lowered["properties"];
        assert_eq!(props["id"], json!({ "type": "integer" }));
        assert_eq!(props["nullable"]["type"], json!(["string", "null"]));
        assert_eq!(props["role"]["enum"], json!(["a", null]));
        assert_eq!(props["author"]["anyOf"][1], json!({ "type": "null" }));
    }

    #[test]
    fn non_object_with_properties_becomes_array() {
        let s = normalize_response(json!({ "properties": { "a": { "type": "string" } } }));
        assert_eq!(s["type"], "array");
        assert_eq!(s["items"]["type"], "object");

        let obj = json!({ "type": "object", "properties": {} });
        assert_eq!(normalize_response(obj.clone()), obj);
        let scalar = json!({ "type": "string" });
        assert_eq!(normalize_response(scalar.clone()), scalar);
    }

    #[test]
    fn query_coercion_follows_param_types() {
        let params = vec![
            Parameter {
                name: "limit".into(),
                location: ParamLocation::Query,
                required: false,
                description: None,
                schema: json!({ "type": "integer" }),
            },
            Parameter {
                name: "include".into(),
                location: ParamLocation::Query,
                required: false,
                description: None,
                schema: json!({ "type": "array", "items": { "type": "string" } }),
            },
        ];
        let pairs = vec![
            ("limit".to_string(), "10".to_string()),
            ("include".to_string(), "a,b".to_string()),
            ("include".to_string(), "c".to_string()),
            ("other".to_string(), "x".to_string()),
        ];
        let q = coerce_query(&pairs, &params);
        assert_eq!(q, json!({ "limit": 10, "include": ["a", "b", "c"], "other": "x" }));
        assert_eq!(coerce_scalar("ten", Some("integer")), json!("ten"));
    }

    #[test]
    fn kind_from_method_and_admin_type() {
        let list = Operation {
            admin: Some(crate::api::document::AdminEntry {
                types: vec![AdminType::List],
            }),
            ..Operation::default()
        };
        assert_eq!(CrudKind::of(HttpMethod::Get, &list), CrudKind::List);
        assert_eq!(CrudKind::of(HttpMethod::Get, &Operation::default()), CrudKind::Read);
        assert_eq!(CrudKind::of(HttpMethod::Patch, &Operation::default()), CrudKind::Update);
        assert_eq!(CrudKind::of(HttpMethod::Delete, &Operation::default()), CrudKind::Delete);
    }

    #[test]
    fn schema_check_reports_pointers() {
        let check = SchemaCheck::compile(json!({
            "type": "object",
            "properties": { "name": { "type": "string" } }
        }))
        .unwrap();
        assert!(check.is_valid(&json!({ "name": "x" })));
        let errors = check.errors(&json!({ "name": 5 }));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].pointer, "/name");
        assert!(SchemaCheck::compile(json!({ "type": 12 })).is_err());
    }
}
