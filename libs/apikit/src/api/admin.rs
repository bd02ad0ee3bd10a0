//! `x-admin` metadata.
//!
//! The document-level map is derived from each operation's own `x-admin` extension, so
//! both views come from one value.

use crate::api::document::{AdminData, OpenApiDocument, Paths};
use crate::error::CompileError;

/// Path → method → types, for every operation that carries an admin role.
pub fn collect_admin(paths: &Paths) -> AdminData {
    let mut data = AdminData::new();
    for (path, item) in paths {
        for (method, op) in item {
            if let Some(entry) = &op.admin {
                data.entry(path.clone())
                    .or_default()
                    .insert(*method, entry.clone());
            }
        }
    }
    data
}

/// Every admin entry must name an existing operation with the same types.
pub fn validate_alignment(doc: &OpenApiDocument) -> Result<(), CompileError> {
    for (path, methods) in &doc.admin.resources {
        for (method, entry) in methods {
            let drift = |reason: &str| CompileError::AdminDrift {
                method: *method,
                path: path.clone(),
                reason: reason.to_string(),
            };
            let op = doc
                .operation(path, *method)
                .ok_or_else(|| drift("no such operation"))?;
            match &op.admin {
                Some(own) if own == entry => {}
                Some(_) => return Err(drift("types differ from the operation's x-admin")),
                None => return Err(drift("operation has no x-admin extension")),
            }
        }
    }
    Ok(())
}
