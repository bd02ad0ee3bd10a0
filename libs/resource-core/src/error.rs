use thiserror::Error;

/// Developer-time errors in a resource description. All of them are fatal for
/// compilation: a malformed model would silently under-validate requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("resource '{resource}': column '{column}' has unknown type '{kind}'")]
    UnknownColumnType {
        resource: String,
        column: String,
        kind: String,
    },

    #[error("resource '{0}' has no primary key (flag a column or declare 'id')")]
    MissingPrimaryKey(String),

    #[error("resource '{resource}' declares several primary keys: {columns:?}")]
    MultiplePrimaryKeys {
        resource: String,
        columns: Vec<String>,
    },

    #[error("resource '{resource}': enum column '{column}' has no values")]
    EmptyEnum { resource: String, column: String },

    #[error("resource '{resource}': search field '{field}' is not a column")]
    UnknownSearchField { resource: String, field: String },

    #[error("resource '{resource}': relationship '{alias}' targets unknown resource '{target}'")]
    UnknownRelationTarget {
        resource: String,
        alias: String,
        target: String,
    },

    #[error("resource '{resource}': duplicate column '{column}'")]
    DuplicateColumn { resource: String, column: String },

    #[error("failed to read resource model: {0}")]
    Io(String),

    #[error("failed to parse resource model: {0}")]
    Parse(String),
}

/// Request-time errors while reading list query parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("query parameter '{param}' must be a non-negative integer, got '{value}'")]
    InvalidNumber { param: &'static str, value: String },

    #[error("query parameter 'order' must be 'asc' or 'desc', got '{0}'")]
    InvalidOrder(String),
}
