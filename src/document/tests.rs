//! Document builder tests

use super::*;
use crate::config::InfoConfig;
use crate::exchange::{Body, CapturedExchange};
use crate::schema::SchemaInferrer;
use crate::store::EndpointStore;
use crate::types::Method;
use pretty_assertions::assert_eq;
use serde_json::json;

fn exchange(method: Method, url: &str, status: u16, body: serde_json::Value) -> CapturedExchange {
    CapturedExchange::new(method, url)
        .unwrap()
        .with_status(status)
        .with_response_content_type("application/json")
        .with_response_body(Some(Body::json(body)))
}

fn build(store: &EndpointStore) -> OpenApiDocument {
    DocumentBuilder::default().build(&store.endpoints())
}

#[test]
fn test_empty_store_builds_valid_document() {
    let doc = build(&EndpointStore::new());
    let value = doc.to_json();

    assert_eq!(value["openapi"], json!("3.1.0"));
    assert_eq!(value["info"]["title"], json!("Recorded API"));
    assert_eq!(value["info"]["version"], json!("1.0.0"));
    assert_eq!(value["paths"], json!({}));
    assert!(value.get("servers").is_none());
    assert_eq!(doc.operation_count(), 0);
}

#[test]
fn test_info_comes_from_builder_settings() {
    let info = InfoConfig {
        title: "Shop".to_string(),
        version: "2.0".to_string(),
        description: Some("staging capture".to_string()),
    };
    let doc = DocumentBuilder::new(info, SchemaInferrer::new()).build(&[]);
    assert_eq!(doc.info.title, "Shop");
    assert_eq!(doc.to_json()["info"]["description"], json!("staging capture"));
}

#[test]
fn test_single_get_operation() {
    let mut store = EndpointStore::new();
    store.insert(exchange(
        Method::GET,
        "https://api.example.com/users",
        200,
        json!([{"id": 1, "name": "Ada"}]),
    ));

    let doc = build(&store);
    let op = doc.operation("/users", Method::GET).unwrap();
    assert_eq!(op.summary, "GET /users");
    assert_eq!(op.operation_id, "get_users");
    assert!(op.parameters.is_empty());
    assert!(op.request_body.is_none());

    let response = &op.responses["200"];
    assert_eq!(response.description, "OK");
    assert_eq!(
        response.content["application/json"].schema,
        json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "id": {"type": "integer"},
                    "name": {"type": "string"}
                },
                "required": ["id", "name"]
            }
        })
    );
    assert_eq!(
        doc.servers,
        vec![Server {
            url: "https://api.example.com".to_string()
        }]
    );
}

#[test]
fn test_responses_merge_across_samples() {
    let mut store = EndpointStore::new();
    let url = "https://api.example.com/me";
    store.insert(exchange(Method::GET, url, 200, json!({"id": 1, "nick": "a"})));
    store.insert(exchange(Method::GET, url, 200, json!({"id": 2.5, "nick": null})));
    store.insert(exchange(Method::GET, url, 404, json!({"error": "gone"})));

    let doc = build(&store);
    let op = doc.operation("/me", Method::GET).unwrap();
    assert_eq!(
        op.responses["200"].content["application/json"].schema,
        json!({
            "type": "object",
            "properties": {
                "id": {"type": "number"},
                "nick": {"type": ["null", "string"]}
            },
            "required": ["id", "nick"]
        })
    );
    assert_eq!(op.responses["404"].description, "Not Found");
    assert_eq!(
        op.responses["404"].content["application/json"].schema["required"],
        json!(["error"])
    );
}

#[test]
fn test_response_without_body_has_no_content() {
    let mut store = EndpointStore::new();
    store.insert(
        CapturedExchange::new(Method::DELETE, "https://api.example.com/users/1")
            .unwrap()
            .with_status(204),
    );

    let doc = build(&store);
    let op = doc.operation("/users/1", Method::DELETE).unwrap();
    assert_eq!(op.responses["204"].description, "No Content");
    assert!(op.responses["204"].content.is_empty());
    assert!(doc.to_json()["paths"]["/users/1"]["delete"]["responses"]["204"]
        .get("content")
        .is_none());
}

#[test]
fn test_path_parameters_typed_from_values() {
    let mut store = EndpointStore::new();
    store.insert(exchange(Method::GET, "https://api.example.com/users/1", 200, json!({})));
    store.insert(exchange(Method::GET, "https://api.example.com/users/22", 200, json!({})));
    store.insert(exchange(Method::GET, "https://api.example.com/tags/rust", 200, json!({})));
    store.parameterise(0, "/users/{id}", "api.example.com").unwrap();
    store.parameterise(1, "/tags/{tag}", "api.example.com").unwrap();

    let doc = build(&store);
    let users = doc.operation("/users/{id}", Method::GET).unwrap();
    assert_eq!(users.operation_id, "get_users_by_id");
    let id = users.parameter(ParameterLocation::Path, "id").unwrap();
    assert!(id.required);
    assert_eq!(id.schema, json!({"type": "integer"}));

    let tags = doc.operation("/tags/{tag}", Method::GET).unwrap();
    let tag = tags.parameter(ParameterLocation::Path, "tag").unwrap();
    assert_eq!(tag.schema, json!({"type": "string"}));
}

#[test]
fn test_query_parameters_required_only_when_always_present() {
    let mut store = EndpointStore::new();
    store.insert(exchange(
        Method::GET,
        "https://api.example.com/search?q=rust&page=1",
        200,
        json!([]),
    ));
    store.insert(exchange(
        Method::GET,
        "https://api.example.com/search?q=serde",
        200,
        json!([]),
    ));

    let doc = build(&store);
    let op = doc.operation("/search", Method::GET).unwrap();
    let names: Vec<&str> = op.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["q", "page"]);

    let q = op.parameter(ParameterLocation::Query, "q").unwrap();
    assert!(q.required);
    assert_eq!(q.schema, json!({"type": "string"}));

    let page = op.parameter(ParameterLocation::Query, "page").unwrap();
    assert!(!page.required);
    assert_eq!(page.schema, json!({"type": "integer"}));
}

#[test]
fn test_request_body_by_content_type() {
    let mut store = EndpointStore::new();
    let url = "https://api.example.com/users";
    store.insert(
        exchange(Method::POST, url, 201, json!({"id": 7}))
            .with_request_content_type("application/json; charset=utf-8")
            .with_request_body(Some(Body::json(json!({"name": "Ada"})))),
    );
    store.insert(exchange(Method::POST, url, 201, json!({"id": 8})));

    let doc = build(&store);
    let op = doc.operation("/users", Method::POST).unwrap();
    let body = op.request_body.as_ref().unwrap();
    assert!(!body.required);
    assert_eq!(
        body.content["application/json"].schema,
        json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"]
        })
    );
    assert_eq!(op.responses["201"].description, "Created");
}

#[test]
fn test_opaque_body_documented_as_string() {
    let mut store = EndpointStore::new();
    store.insert(
        exchange(Method::PUT, "https://api.example.com/avatar", 200, json!({"ok": true}))
            .with_request_content_type("image/png")
            .with_request_body(Some(Body::Opaque { len: 512 })),
    );

    let doc = build(&store);
    let op = doc.operation("/avatar", Method::PUT).unwrap();
    let body = op.request_body.as_ref().unwrap();
    assert!(body.required);
    assert_eq!(body.content["image/png"].schema, json!({"type": "string"}));
}

#[test]
fn test_same_path_on_two_hosts_folds_into_one_operation() {
    let mut store = EndpointStore::new();
    store.insert(exchange(Method::GET, "https://a.example.com/status", 200, json!({"up": true})));
    store.insert(exchange(Method::GET, "http://b.example.com/status", 200, json!({"up": true, "lag": 3})));

    let doc = build(&store);
    assert_eq!(doc.paths.len(), 1);
    assert_eq!(doc.operation_count(), 1);
    let schema = &doc.operation("/status", Method::GET).unwrap().responses["200"].content
        ["application/json"]
        .schema;
    assert_eq!(schema["required"], json!(["up"]));
    assert_eq!(
        doc.servers
            .iter()
            .map(|s| s.url.as_str())
            .collect::<Vec<_>>(),
        vec!["https://a.example.com", "http://b.example.com"]
    );
}

#[test]
fn test_operation_keys_unique_and_methods_lowercase() {
    let mut store = EndpointStore::new();
    let url = "https://api.example.com/items";
    store.insert(exchange(Method::GET, url, 200, json!([])));
    store.insert(exchange(Method::POST, url, 201, json!({})));
    store.insert(exchange(Method::GET, url, 200, json!([1])));

    let doc = build(&store);
    let item = &doc.paths["/items"];
    assert_eq!(item.keys().cloned().collect::<Vec<_>>(), vec!["get", "post"]);

    let mut ids: Vec<&str> = doc
        .paths
        .values()
        .flat_map(|item| item.values())
        .map(|op| op.operation_id.as_str())
        .collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn test_operation_ids_deduplicated() {
    let mut store = EndpointStore::new();
    store.insert(exchange(Method::GET, "https://api.example.com/a-b", 200, json!({})));
    store.insert(exchange(Method::GET, "https://api.example.com/a_b", 200, json!({})));

    let doc = build(&store);
    let first = &doc.operation("/a-b", Method::GET).unwrap().operation_id;
    let second = &doc.operation("/a_b", Method::GET).unwrap().operation_id;
    assert_ne!(first, second);
    assert!(first.starts_with("get_a_b"));
    assert!(second.starts_with("get_a_b"));
}

#[test]
fn test_root_path_operation() {
    let mut store = EndpointStore::new();
    store.insert(exchange(Method::GET, "https://api.example.com/", 200, json!({})));

    let doc = build(&store);
    let op = doc.operation("/", Method::GET).unwrap();
    assert_eq!(op.operation_id, "get_root");
}

#[test]
fn test_connect_is_not_documented() {
    let mut store = EndpointStore::new();
    store.insert(exchange(Method::CONNECT, "https://api.example.com/tunnel", 200, json!({})));

    let doc = build(&store);
    assert!(doc.paths.is_empty());
}

#[test]
fn test_sort_endpoints_by_path_then_method() {
    let mut store = EndpointStore::new();
    store.insert(exchange(Method::DELETE, "https://api.example.com/b", 200, json!({})));
    store.insert(exchange(Method::POST, "https://api.example.com/a", 200, json!({})));
    store.insert(exchange(Method::GET, "https://api.example.com/b", 200, json!({})));
    store.insert(exchange(Method::GET, "https://api.example.com/a", 200, json!({})));

    let mut endpoints = store.endpoints();
    sort_endpoints(&mut endpoints);
    let order: Vec<String> = endpoints
        .iter()
        .map(|e| format!("{} {}", e.method, e.template))
        .collect();
    assert_eq!(order, vec!["GET /a", "POST /a", "GET /b", "DELETE /b"]);
}

#[test]
fn test_disabled_hosts_excluded_from_document() {
    let mut store = EndpointStore::new();
    store.insert(exchange(Method::GET, "https://a.example.com/x", 200, json!({})));
    store.insert(exchange(Method::GET, "https://b.example.com/y", 200, json!({})));
    store.set_disabled_hosts(["b.example.com"]);

    let doc = build(&store);
    assert!(doc.paths.contains_key("/x"));
    assert!(!doc.paths.contains_key("/y"));
    assert_eq!(doc.servers.len(), 1);
}

#[test]
fn test_placeholder_names_unified_per_path_shape() {
    let mut store = EndpointStore::new();
    store.insert(exchange(Method::GET, "https://api.example.com/users/1", 200, json!({"id": 1})));
    store.insert(exchange(Method::DELETE, "https://api.example.com/users/2", 200, json!({})));
    store.parameterise(0, "/users/{id}", "api.example.com").unwrap();
    store.parameterise(1, "/users/{userId}", "api.example.com").unwrap();

    let doc = build(&store);
    assert_eq!(doc.paths.keys().cloned().collect::<Vec<_>>(), vec!["/users/{id}"]);

    let delete = doc.operation("/users/{id}", Method::DELETE).unwrap();
    assert_eq!(delete.summary, "DELETE /users/{id}");
    assert_eq!(delete.operation_id, "delete_users_by_id");
    let param = delete.parameter(ParameterLocation::Path, "id").unwrap();
    assert_eq!(param.schema, json!({"type": "integer"}));
    assert!(delete.parameter(ParameterLocation::Path, "userId").is_none());
    assert!(doc.operation("/users/{id}", Method::GET).is_some());
}

#[test]
fn test_placeholder_names_unified_across_hosts() {
    let mut store = EndpointStore::new();
    store.insert(exchange(Method::GET, "https://a.example.com/items/7", 200, json!({"a": 1})));
    store.insert(exchange(Method::GET, "https://b.example.com/items/8", 200, json!({"b": 2})));
    store.parameterise(0, "/items/{itemId}", "a.example.com").unwrap();
    store.parameterise(0, "/items/{id}", "b.example.com").unwrap();

    let doc = build(&store);
    assert_eq!(doc.paths.keys().cloned().collect::<Vec<_>>(), vec!["/items/{id}"]);
    assert_eq!(doc.operation_count(), 1);

    let op = doc.operation("/items/{id}", Method::GET).unwrap();
    assert_eq!(op.parameters.len(), 1);
    assert_eq!(op.parameters[0].name, "id");
    let schema = &op.responses["200"].content["application/json"].schema;
    assert!(schema["properties"].get("a").is_some());
    assert!(schema["properties"].get("b").is_some());
}

#[test]
fn test_literal_and_templated_siblings_stay_apart() {
    let mut store = EndpointStore::new();
    store.insert(exchange(Method::GET, "https://api.example.com/users/me", 200, json!({})));
    store.insert(exchange(Method::GET, "https://api.example.com/users/3", 200, json!({})));
    store.parameterise(1, "/users/{id}", "api.example.com").unwrap();

    let doc = build(&store);
    assert_eq!(
        doc.paths.keys().cloned().collect::<Vec<_>>(),
        vec!["/users/me", "/users/{id}"]
    );
}
