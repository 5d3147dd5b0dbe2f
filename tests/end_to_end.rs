//! End-to-end tests against a live server: header resolution, generation,
//! and scope isolation across requests.

use std::net::SocketAddr;

use axum::{routing::get, Router};
use request_correlation::{current_request_id, RequestIdLayer};
use uuid::Uuid;

async fn spawn_server(layer: RequestIdLayer) -> SocketAddr {
    let app = Router::new()
        .route("/whoami", get(whoami))
        .layer(layer);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}

/// Reads the current id twice to show it is stable within one request.
async fn whoami() -> String {
    let first = current_request_id()
        .map(String::from)
        .unwrap_or_else(|| "none".to_string());
    let second = current_request_id()
        .map(String::from)
        .unwrap_or_else(|| "none".to_string());
    assert_eq!(first, second, "id must not change within a request");
    first
}

#[tokio::test]
async fn test_x_request_id_header_is_used() {
    let addr = spawn_server(RequestIdLayer::new()).await;

    let body = reqwest::Client::new()
        .get(format!("http://{addr}/whoami"))
        .header("X-Request-ID", "abc-123")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert_eq!(body, "abc-123");
}

#[tokio::test]
async fn test_correlation_and_trace_headers_fall_back_in_order() {
    let addr = spawn_server(RequestIdLayer::new()).await;
    let client = reqwest::Client::new();

    let body = client
        .get(format!("http://{addr}/whoami"))
        .header("X-Correlation-ID", "cor-1")
        .header("X-Amzn-Trace-Id", "Self=elb-1")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "cor-1"); // Correlation beats the trace header

    let body = client
        .get(format!("http://{addr}/whoami"))
        .header("X-Amzn-Trace-Id", "Root=1-root")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "1-root");
}

#[tokio::test]
async fn test_generated_ids_are_uuid_v4_and_distinct_across_requests() {
    let addr = spawn_server(RequestIdLayer::new()).await;
    let client = reqwest::Client::new();

    let first = client
        .get(format!("http://{addr}/whoami"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let second = client
        .get(format!("http://{addr}/whoami"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    for id in [&first, &second] {
        let parsed = Uuid::parse_str(id).expect("generated id must be a valid UUID");
        assert_eq!(parsed.get_version_num(), 4);
    }
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_generation_disabled_completes_with_absent_id() {
    let addr = spawn_server(RequestIdLayer::new().generate_if_missing(false)).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/whoami"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200); // Absent id never fails the request
    assert_eq!(response.text().await.unwrap(), "none");
}

#[tokio::test]
async fn test_empty_header_falls_through_to_generation() {
    let addr = spawn_server(RequestIdLayer::new()).await;

    let body = reqwest::Client::new()
        .get(format!("http://{addr}/whoami"))
        .header("X-Request-ID", "   ")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(Uuid::parse_str(&body).is_ok());
}
