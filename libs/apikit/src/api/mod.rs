//! Generators and passes that turn a resource model into an OpenAPI document and a
//! bound route table.

pub mod admin;
pub mod binder;
pub mod components;
pub mod document;
pub mod include;
pub mod operation_builder;
pub mod paths;
pub mod problem;
pub mod property;

pub use binder::{
    bind_routes, into_router, BoundRoute, CrudHandler, CrudKind, CrudReply, CrudRequest,
    HandlerRegistry, PathSyntax,
};
pub use document::{AdminType, HttpMethod, OpenApiDocument, Operation};
pub use operation_builder::{state, Missing, OperationBuilder, OperationSpec, Present};
pub use problem::{Problem, ProblemResponse};
