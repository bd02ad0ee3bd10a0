//! Transport-agnostic resource descriptions and the pure helpers built on them.
//!
//! - [`model`]: normalized resource/column descriptions (the compiler input)
//! - [`loader`]: YAML/JSON resource model files → [`model::ResourceModel`]
//! - [`naming`]: pluralization and casing helpers used for path templates
//! - [`search`]: free-text search → OR-of-LIKE condition tree
//! - [`page`]: list query parameters and the list envelope metadata

pub mod error;
pub mod loader;
pub mod model;
pub mod naming;
pub mod page;
pub mod search;

pub use error::{QueryError, ResourceError};
pub use model::{Column, ColumnKind, Reference, Relationship, Resource, ResourceModel};
pub use page::{ListMeta, ListPage, ListQuery, OrderKey, SortDir};
pub use search::{compile_search, SearchExpr};
