//! Schema-driven REST API compiler.
//!
//! A [`ResourceModel`](resource_core::ResourceModel) goes in; a deduplicated OpenAPI 3.0
//! document with `x-admin` metadata and a validated, executable route table come out.

pub mod api;
pub mod compiler;
pub mod error;

pub use compiler::{compile, CompileOptions, CompiledApi};
pub use error::CompileError;
pub use resource_core;
