use std::sync::Arc;

use apikit::api::problem::not_implemented;
use apikit::api::{CrudHandler, CrudReply, CrudRequest, HandlerRegistry, Problem};
use axum::response::{Html, Json};
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Stoplight Elements page reading `/openapi.json`.
pub async fn serve_docs() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>API Docs</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}

/// Registry answering every CRUD operation with `501 Not Implemented`.
pub fn placeholder_handlers() -> HandlerRegistry {
    let handler: Arc<dyn CrudHandler> = Arc::new(|req: CrudRequest| async move {
        let target = match (&req.resource, req.kind) {
            (Some(resource), Some(kind)) => format!("{kind} on {resource}"),
            _ => req.operation_id.unwrap_or_else(|| "this operation".to_string()),
        };
        Err::<CrudReply, Problem>(not_implemented(format!("no backend is bound for {target}")))
    });
    HandlerRegistry::new().default_for_all(handler)
}
