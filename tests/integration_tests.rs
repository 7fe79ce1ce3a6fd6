//! Integration tests
//!
//! Tests the full end-to-end flow: HAR capture → recorder → OpenAPI document,
//! and the HTTP server routes driven in-process.

use axum::body::Body;
use axum::http::{Method as HttpMethod, Request, StatusCode};
use http_body_util::BodyExt;
use oas_recorder::cli::router;
use oas_recorder::exchange::Har;
use oas_recorder::recorder::HarFileSource;
use oas_recorder::{load_config, Method, Recorder, RecorderConfig, RecordingStatus};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::ServiceExt;

fn har_entry(method: &str, url: &str, status: u16, body: Option<Value>) -> Value {
    let content = match body {
        Some(body) => json!({"mimeType": "application/json", "text": body.to_string()}),
        None => json!({"mimeType": "application/json"}),
    };
    json!({
        "startedDateTime": "2024-05-01T12:00:00.000Z",
        "request": {"method": method, "url": url},
        "response": {"status": status, "content": content}
    })
}

fn shop_har() -> Value {
    json!({
        "log": {
            "version": "1.2",
            "entries": [
                har_entry("GET", "https://shop.example.com/api/products?page=1", 200,
                    Some(json!([{"id": 1, "name": "Lamp", "price": 19.5}]))),
                har_entry("GET", "https://shop.example.com/api/products/1", 200,
                    Some(json!({"id": 1, "name": "Lamp", "price": 19.5, "tags": ["home"]}))),
                har_entry("GET", "https://shop.example.com/api/products/2", 200,
                    Some(json!({"id": 2, "name": "Desk", "price": 120, "tags": []}))),
                har_entry("GET", "https://shop.example.com/api/products/3", 404,
                    Some(json!({"error": "not found"}))),
                {
                    "request": {
                        "method": "POST",
                        "url": "https://shop.example.com/api/orders",
                        "postData": {
                            "mimeType": "application/json",
                            "text": "{\"product\": 1, \"quantity\": 2}"
                        }
                    },
                    "response": {
                        "status": 201,
                        "content": {"mimeType": "application/json", "text": "{\"order\": \"a1\"}"}
                    }
                },
                har_entry("GET", "https://cdn.example.com/logo.svg", 200, None)
            ]
        }
    })
}

async fn send(
    app: &axum::Router,
    method: HttpMethod,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

// ============================================================================
// HAR → Document
// ============================================================================

#[tokio::test]
async fn test_har_to_document() {
    let recorder = Recorder::started(&RecorderConfig::default()).await;
    let har = Har::from_json(&shop_har().to_string()).unwrap();
    let summary = recorder.import_har(har).await.unwrap();
    assert_eq!(summary.recorded, 6);

    recorder
        .parameterise(1, "/api/products/{productId}", "shop.example.com")
        .await
        .unwrap();

    let doc = recorder.document().await;
    let value = doc.to_json();
    assert_eq!(value["openapi"], json!("3.1.0"));

    let paths: Vec<&String> = doc.paths.keys().collect();
    assert_eq!(
        paths,
        vec!["/api/orders", "/api/products", "/api/products/{productId}", "/logo.svg"]
    );

    let product = doc
        .operation("/api/products/{productId}", Method::GET)
        .unwrap();
    assert_eq!(product.parameters[0].name, "productId");
    assert_eq!(product.parameters[0].schema, json!({"type": "integer"}));

    let ok = &product.responses["200"].content["application/json"].schema;
    assert_eq!(ok["properties"]["price"], json!({"type": "number"}));
    assert_eq!(ok["properties"]["tags"]["items"], json!({"type": "string"}));
    assert_eq!(ok["required"], json!(["id", "name", "price", "tags"]));
    assert!(product.responses.contains_key("404"));

    let list = doc.operation("/api/products", Method::GET).unwrap();
    assert_eq!(list.parameters[0].name, "page");
    assert!(list.parameters[0].required);

    let order = doc.operation("/api/orders", Method::POST).unwrap();
    let request = order.request_body.as_ref().unwrap();
    assert!(request.required);
    assert_eq!(
        request.content["application/json"].schema["required"],
        json!(["product", "quantity"])
    );

    let servers: Vec<&str> = doc.servers.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(
        servers,
        vec!["https://shop.example.com", "https://cdn.example.com"]
    );
}

#[tokio::test]
async fn test_har_file_import_with_config_file() {
    let dir = tempdir().unwrap();
    let har_path = dir.path().join("shop.har");
    std::fs::write(&har_path, shop_har().to_string()).unwrap();

    let config_path = dir.path().join("recorder.yaml");
    std::fs::write(
        &config_path,
        "info:\n  title: Shop\n  version: \"0.3.0\"\nparameters:\n  policy: heuristic\n",
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    let recorder = Recorder::started(&config).await;
    recorder
        .import(&HarFileSource::new(&har_path))
        .await
        .unwrap();

    let doc = recorder.document().await;
    assert_eq!(doc.info.title, "Shop");
    assert_eq!(doc.info.version, "0.3.0");
    assert!(doc.paths.contains_key("/api/products/{param1}"));
    assert!(!doc.paths.contains_key("/api/products/2"));
}

// ============================================================================
// HTTP server
// ============================================================================

#[tokio::test]
async fn test_server_health_and_empty_document() {
    let app = router(Recorder::default());

    let (status, body) = send(&app, HttpMethod::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = send(&app, HttpMethod::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("idle"));

    let (status, body) = send(&app, HttpMethod::GET, "/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["openapi"], json!("3.1.0"));
    assert_eq!(body["paths"], json!({}));
}

#[tokio::test]
async fn test_server_record_and_parameterise() {
    let recorder = Recorder::default();
    let app = router(recorder.clone());

    let (_, body) = send(&app, HttpMethod::POST, "/start", None).await;
    assert_eq!(body["data"]["status"], json!("recording"));

    for id in [1, 2] {
        let (status, body) = send(
            &app,
            HttpMethod::POST,
            "/exchanges",
            Some(json!({
                "method": "GET",
                "url": format!("https://api.example.com/users/{id}"),
                "response_content_type": "application/json",
                "response_body": {"id": id}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["outcome"], json!("created"));
    }

    let (status, body) = send(
        &app,
        HttpMethod::POST,
        "/exchanges",
        Some(json!({"har": har_entry("GET", "https://api.example.com/users/1", 200, Some(json!({"id": 1})))})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], json!("appended"));

    let (status, body) = send(
        &app,
        HttpMethod::POST,
        "/parameterise",
        Some(json!({"host": "api.example.com", "index": 0, "template": "/users/{id}"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["merged"], json!(1));
    assert_eq!(body["data"]["samples"], json!(3));

    let (_, body) = send(&app, HttpMethod::GET, "/endpoints", None).await;
    let endpoints = body["data"].as_array().unwrap();
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0]["path"], json!("/users/{id}"));

    let (_, doc) = send(&app, HttpMethod::GET, "/openapi.json", None).await;
    assert!(doc["paths"]["/users/{id}"]["get"].is_object());
    assert_eq!(recorder.endpoints().await.len(), 1);
}

#[tokio::test]
async fn test_server_rejects_invalid_input() {
    let app = router(Recorder::default());
    send(&app, HttpMethod::POST, "/start", None).await;

    let (status, body) = send(
        &app,
        HttpMethod::POST,
        "/exchanges",
        Some(json!({"method": "GET", "url": "not a url"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    send(
        &app,
        HttpMethod::POST,
        "/exchanges",
        Some(json!({
            "method": "GET",
            "url": "https://api.example.com/users/1",
            "response_content_type": "application/json"
        })),
    )
    .await;

    let (status, body) = send(
        &app,
        HttpMethod::POST,
        "/parameterise",
        Some(json!({"host": "api.example.com", "index": 0, "template": "/orders/{id}"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("api.example.com"));

    let (_, body) = send(&app, HttpMethod::GET, "/endpoints", None).await;
    assert_eq!(body["data"][0]["path"], json!("/users/1"));
}

#[tokio::test]
async fn test_server_har_import_hosts_and_clear() {
    let recorder = Recorder::default();
    let app = router(recorder.clone());
    send(&app, HttpMethod::POST, "/start", None).await;

    let (status, body) = send(&app, HttpMethod::POST, "/har", Some(shop_har())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["recorded"], json!(6));

    let (status, _) = send(
        &app,
        HttpMethod::PUT,
        "/hosts/disabled",
        Some(json!({"hosts": ["cdn.example.com"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, HttpMethod::GET, "/hosts", None).await;
    let hosts = body["data"]["hosts"].as_array().unwrap();
    assert_eq!(hosts.len(), 2);
    assert_eq!(hosts[1]["host"], json!("cdn.example.com"));
    assert_eq!(hosts[1]["disabled"], json!(true));
    assert_eq!(hosts[1]["endpoints"], json!([]));
    assert_eq!(hosts[0]["disabled"], json!(false));

    let (_, doc) = send(&app, HttpMethod::GET, "/openapi.json", None).await;
    assert!(doc["paths"].get("/logo.svg").is_none());

    let (_, body) = send(&app, HttpMethod::POST, "/clear", None).await;
    assert_eq!(body["data"]["status"], json!("idle"));
    assert_eq!(body["data"]["endpoints"], json!(0));
    assert_eq!(recorder.status().await, RecordingStatus::Idle);

    let (_, doc) = send(&app, HttpMethod::GET, "/openapi.json", None).await;
    assert_eq!(doc["paths"], json!({}));
}

#[tokio::test]
async fn test_server_malformed_har_is_bad_request() {
    let app = router(Recorder::default());
    let request = Request::builder()
        .method(HttpMethod::POST)
        .uri("/har")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
