//! Orchestrates the generators into one finished document.

use resource_core::ResourceModel;
use serde::{Deserialize, Serialize};

use crate::api::admin::{collect_admin, validate_alignment};
use crate::api::binder::{bind_routes, BoundRoute, HandlerRegistry};
use crate::api::components::intern_schemas;
use crate::api::document::{Info, OpenApiDocument, Paths, Server};
use crate::api::include::expand_includes;
use crate::api::paths::{generate_resource_schemas, TagsConfig};
use crate::api::problem::error_components;
use crate::error::CompileError;

fn default_prefix() -> String {
    "/api".to_string()
}

/// Compiler inputs besides the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    pub info: Info,
    pub servers: Vec<Server>,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    pub tags: TagsConfig,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            info: Info::default(),
            servers: Vec::new(),
            prefix: default_prefix(),
            tags: TagsConfig::default(),
        }
    }
}

/// A finished, deduplicated document.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledApi {
    pub document: OpenApiDocument,
}

impl CompiledApi {
    pub fn bind(&self, handlers: &HandlerRegistry) -> Result<Vec<BoundRoute>, CompileError> {
        bind_routes(&self.document, handlers)
    }

    pub fn to_json_pretty(&self) -> Result<String, CompileError> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    pub fn operation_count(&self) -> usize {
        self.document.operations().count()
    }
}

/// Model → document: CRUD generation, include expansion, dedup, admin map.
pub fn compile(model: &ResourceModel, options: &CompileOptions) -> Result<CompiledApi, CompileError> {
    model.validate()?;

    let mut paths = Paths::new();
    for resource in model.iter() {
        let generated = generate_resource_schemas(resource, &options.tags, &options.prefix)?;
        paths.extend(generated.paths);
    }
    let paths = expand_includes(&paths, model, &options.prefix)?;

    let mut document = OpenApiDocument::new(options.info.clone(), options.servers.clone());
    document.paths = paths;
    for (name, schema) in error_components() {
        document.components.schemas.insert(name, schema);
    }

    let mut document = intern_schemas(&document)?;
    document.admin.resources = collect_admin(&document.paths);
    validate_alignment(&document)?;

    tracing::info!(
        resources = model.len(),
        paths = document.paths.len(),
        components = document.components.schemas.len(),
        "compiled API document"
    );
    Ok(CompiledApi { document })
}
