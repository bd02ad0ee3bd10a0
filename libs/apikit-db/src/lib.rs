//! SeaORM lowering for list queries: search trees, ordering and offset/limit paging.

pub mod search;

pub use search::{
    search_to_condition, FieldMap, ListQueryExt, SearchBuildError, SearchBuildResult,
};
