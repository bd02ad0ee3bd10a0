use std::sync::Arc;

use apikit::api::components::intern_schemas;
use apikit::api::document::{AdminType, HttpMethod};
use apikit::api::{CrudHandler, CrudKind, CrudReply, CrudRequest, HandlerRegistry, Problem};
use apikit::resource_core::loader::from_yaml_str;
use apikit::resource_core::ResourceModel;
use apikit::{compile, CompileError, CompileOptions};
use serde_json::{json, Value};

const BLOG: &str = r#"
resources:
  Author:
    columns:
      id:       { type: integer, primaryKey: true }
      name:     { type: string, allowNull: false }
      password: { type: string, private: true }
  Message:
    columns:
      id:       { type: integer }
      message:  { type: text }
      authorId: { type: integer, references: { resource: Author } }
    searchFields: [message]
    relationships:
      - { target: Author, alias: author }
"#;

fn model() -> ResourceModel {
    from_yaml_str(BLOG).unwrap()
}

fn resolve<'a>(doc: &'a apikit::api::OpenApiDocument, schema: &'a Value) -> &'a Value {
    match schema.get("$ref").and_then(Value::as_str) {
        Some(r) => {
            let name = r.trim_start_matches("#/components/schemas/");
            &doc.components.schemas[name]
        }
        None => schema,
    }
}

#[test]
fn document_shape() {
    let api = compile(&model(), &CompileOptions::default()).unwrap();
    let json = serde_json::to_value(&api.document).unwrap();

    assert_eq!(json["openapi"], "3.0.0");
    assert!(json["components"]["schemas"]["Error"].is_object());
    assert!(json["x-admin"]["resources"]["/api/authors"]["get"].is_object());
    assert_eq!(api.operation_count(), 10);
}

#[test]
fn admin_types_depend_on_search_fields() {
    let api = compile(&model(), &CompileOptions::default()).unwrap();
    let admin = &api.document.admin.resources;
    assert_eq!(admin["/api/authors"][&HttpMethod::Get].types, vec![AdminType::List]);
    assert_eq!(
        admin["/api/messages"][&HttpMethod::Get].types,
        vec![AdminType::List, AdminType::Search]
    );
    assert_eq!(admin["/api/messages/{id}"][&HttpMethod::Delete].types, vec![AdminType::Delete]);
    for path in admin.keys() {
        assert!(api.document.paths.contains_key(path));
    }
}

#[test]
fn message_read_embeds_author_response_shape() {
    let api = compile(&model(), &CompileOptions::default()).unwrap();
    let doc = &api.document;
    let read = doc.operation("/api/messages/{id}", HttpMethod::Get).unwrap();
    let schema = resolve(doc, read.responses["200"].json_schema().unwrap());
    let author = &schema["properties"]["author"];
    assert_eq!(author["nullable"], true);

    let author_read = doc.operation("/api/authors/{id}", HttpMethod::Get).unwrap();
    let author_schema = resolve(doc, author_read.responses["200"].json_schema().unwrap());
    assert_eq!(author["properties"], author_schema["properties"]);
    assert!(author["properties"].get("password").is_none());
}

#[test]
fn identical_item_schemas_share_a_component() {
    let api = compile(&model(), &CompileOptions::default()).unwrap();
    let doc = &api.document;
    let create = doc.operation("/api/authors", HttpMethod::Post).unwrap();
    let read = doc.operation("/api/authors/{id}", HttpMethod::Get).unwrap();
    let update = doc.operation("/api/authors/{id}", HttpMethod::Put).unwrap();
    let target = &create.responses["201"].json_schema().unwrap()["$ref"];
    assert!(target.is_string());
    assert_eq!(&read.responses["200"].json_schema().unwrap()["$ref"], target);
    assert_eq!(&update.responses["200"].json_schema().unwrap()["$ref"], target);
}

#[test]
fn dedup_is_idempotent_on_compiled_output() {
    let api = compile(&model(), &CompileOptions::default()).unwrap();
    let again = intern_schemas(&api.document).unwrap();
    assert_eq!(again.components.schemas.len(), api.document.components.schemas.len());
    assert_eq!(again, api.document);
}

#[test]
fn prefix_and_tags_from_options() {
    let options: CompileOptions = serde_json::from_value(json!({
        "prefix": "/v2",
        "info": { "title": "Blog", "version": "2.0.0" },
        "tags": { "list": ["$name", "browse"] }
    }))
    .unwrap();
    let api = compile(&model(), &options).unwrap();
    let list = api.document.operation("/v2/authors", HttpMethod::Get).unwrap();
    assert_eq!(list.tags, vec!["author", "browse"]);
    let read = api.document.operation("/v2/authors/{id}", HttpMethod::Get).unwrap();
    assert_eq!(read.tags, vec!["author"]);
    assert_eq!(api.document.info.title, "Blog");
}

#[test]
fn binding_without_handlers_fails() {
    let api = compile(&model(), &CompileOptions::default()).unwrap();
    let err = api.bind(&HandlerRegistry::new()).unwrap_err();
    assert!(matches!(err, CompileError::MissingHandler { .. }));
}

struct Echo;

#[async_trait::async_trait]
impl CrudHandler for Echo {
    async fn handle(&self, req: CrudRequest) -> Result<CrudReply, Problem> {
        Ok(CrudReply::ok(json!({ "kind": req.kind.map(|k| k.as_str()) })))
    }
}

#[test]
fn handler_precedence() {
    let api = compile(&model(), &CompileOptions::default()).unwrap();
    let shared: Arc<dyn CrudHandler> = Arc::new(Echo);
    let handlers = HandlerRegistry::new()
        .default_for_all(shared)
        .resource("Author", CrudKind::Delete, |_req: CrudRequest| async {
            Ok::<_, Problem>(CrudReply::no_content())
        });
    let routes = api.bind(&handlers).unwrap();
    assert_eq!(routes.len(), 10);

    let list = routes
        .iter()
        .find(|r| r.template == "/api/messages" && r.method == HttpMethod::Get)
        .unwrap();
    assert_eq!(list.kind, CrudKind::List);
    assert_eq!(list.search_fields, vec!["message"]);
    assert!(list.body.is_none());
    assert!(list.responses.contains_key(&200));

    let create = routes
        .iter()
        .find(|r| r.template == "/api/messages" && r.method == HttpMethod::Post)
        .unwrap();
    assert!(create.body.is_some());
    assert!(create.query.is_none());
}
