//! Type-state operation builder.
//!
//! `build()` is only available once at least one response has been declared;
//! descriptive methods stay available at every stage.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde_json::{json, Value};

use crate::api::document::{
    schema_ref, AdminEntry, AdminType, HttpMethod, MediaType, Operation, ParamLocation,
    Parameter, RequestBody, Response, APPLICATION_JSON,
};
use crate::api::problem::{APPLICATION_PROBLEM_JSON, ERROR_SCHEMA_NAME};

/// Type-state markers for compile-time enforcement
pub mod state {
    /// Marker for missing required components
    #[derive(Debug, Clone, Copy)]
    pub struct Missing;

    /// Marker for present required components
    #[derive(Debug, Clone, Copy)]
    pub struct Present;
}

pub use state::{Missing, Present};

/// Error responses attached to every generated operation.
pub const STANDARD_ERRORS: [(u16, &str); 6] = [
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (409, "Conflict"),
    (500, "Internal Server Error"),
];

/// A finished operation together with where it is mounted.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationSpec {
    pub method: HttpMethod,
    pub path: String,
    pub operation: Operation,
}

/// Operation builder; `R` tracks whether a response was declared.
pub struct OperationBuilder<R> {
    spec: OperationSpec,
    _has_response: PhantomData<R>,
}

impl OperationBuilder<Missing> {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            spec: OperationSpec {
                method,
                path: path.into(),
                operation: Operation::default(),
            },
            _has_response: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }
}

// -------------------------------------------------------------------------------------------------
// Descriptive methods, available at any stage
// -------------------------------------------------------------------------------------------------
impl<R> OperationBuilder<R> {
    /// Inspect the spec (primarily for tests)
    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.spec.operation.operation_id = Some(id.into());
        self
    }

    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.spec.operation.summary = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.spec.operation.description = Some(text.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.spec.operation.tags.push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.operation.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Record the owning resource (`x-resource`).
    pub fn resource(mut self, name: impl Into<String>) -> Self {
        self.spec.operation.resource = Some(name.into());
        self
    }

    /// Record the semantic role (`x-admin`).
    pub fn admin_types(mut self, types: impl Into<Vec<AdminType>>) -> Self {
        self.spec.operation.admin = Some(AdminEntry {
            types: types.into(),
        });
        self
    }

    pub fn search_fields(mut self, fields: &[String]) -> Self {
        self.spec.operation.search_fields = fields.to_vec();
        self
    }

    pub fn param(mut self, param: Parameter) -> Self {
        self.spec.operation.parameters.push(param);
        self
    }

    /// Required path parameter with an explicit schema.
    pub fn path_param(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        schema: Value,
    ) -> Self {
        self.param(Parameter {
            name: name.into(),
            location: ParamLocation::Path,
            required: true,
            description: Some(description.into()),
            schema,
        })
    }

    /// Query parameter (defaults to string)
    pub fn query_param(
        self,
        name: impl Into<String>,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        self.query_param_typed(name, required, description, json!({ "type": "string" }))
    }

    /// Query parameter with an explicit schema
    pub fn query_param_typed(
        self,
        name: impl Into<String>,
        required: bool,
        description: impl Into<String>,
        schema: Value,
    ) -> Self {
        self.param(Parameter {
            name: name.into(),
            location: ParamLocation::Query,
            required,
            description: Some(description.into()),
            schema,
        })
    }

    /// Attach a required JSON request body with an inline schema.
    pub fn json_request(mut self, schema: Value, desc: impl Into<String>) -> Self {
        self.spec.operation.request_body = Some(RequestBody {
            description: Some(desc.into()),
            required: true,
            content: BTreeMap::from([(APPLICATION_JSON.to_string(), MediaType { schema })]),
        });
        self
    }

    /// Make the previously attached request body **optional** (if any).
    pub fn request_optional(mut self) -> Self {
        if let Some(rb) = &mut self.spec.operation.request_body {
            rb.required = false;
        }
        self
    }

    fn push_response(
        mut self,
        status: u16,
        description: String,
        content: Option<(&str, Value)>,
    ) -> OperationBuilder<Present> {
        let content = content
            .map(|(ct, schema)| BTreeMap::from([(ct.to_string(), MediaType { schema })]))
            .unwrap_or_default();
        self.spec.operation.responses.insert(
            status.to_string(),
            Response {
                description,
                content,
            },
        );
        OperationBuilder {
            spec: self.spec,
            _has_response: PhantomData,
        }
    }

    /// JSON response with an inline schema.
    pub fn json_response(
        self,
        status: u16,
        description: impl Into<String>,
        schema: Value,
    ) -> OperationBuilder<Present> {
        self.push_response(status, description.into(), Some((APPLICATION_JSON, schema)))
    }

    /// Response without a body, e.g. `204`.
    pub fn empty_response(
        self,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<Present> {
        self.push_response(status, description.into(), None)
    }

    /// RFC 9457 `application/problem+json` response referencing the `Error` schema.
    pub fn problem_response(
        self,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<Present> {
        self.push_response(
            status,
            description.into(),
            Some((APPLICATION_PROBLEM_JSON, schema_ref(ERROR_SCHEMA_NAME))),
        )
    }
}

impl OperationBuilder<Present> {
    /// Add the standard error responses (400, 401, 403, 404, 409, 500), all referencing
    /// the shared `Error` schema.
    pub fn standard_errors(self) -> Self {
        STANDARD_ERRORS
            .iter()
            .fold(self, |b, (status, desc)| b.problem_response(*status, *desc))
    }

    pub fn build(self) -> OperationSpec {
        self.spec
    }
}
