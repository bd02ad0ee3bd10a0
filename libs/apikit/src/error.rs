use resource_core::ResourceError;
use thiserror::Error;

use crate::api::document::HttpMethod;

/// Fatal compile/bind errors. There is no partial-document fallback: any of these
/// aborts the whole compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Model(#[from] ResourceError),

    #[error("resource '{resource}': relationship '{alias}' targets '{target}', which has no generated item operation")]
    UnknownRelationTarget {
        resource: String,
        alias: String,
        target: String,
    },

    #[error("{method} {path}: path parameter '{param}' has no '{{{param}}}' placeholder")]
    PathParamMismatch {
        method: HttpMethod,
        path: String,
        param: String,
    },

    #[error("{method} {path}: no handler registered and no default for '{kind}'")]
    MissingHandler {
        method: HttpMethod,
        path: String,
        kind: String,
    },

    #[error("{method} {path}: invalid {part} schema: {reason}")]
    InvalidSchema {
        method: HttpMethod,
        path: String,
        part: String,
        reason: String,
    },

    #[error("x-admin entry {method} {path} does not match the document: {reason}")]
    AdminDrift {
        method: HttpMethod,
        path: String,
        reason: String,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}
