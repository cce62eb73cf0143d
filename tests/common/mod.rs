//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clara_api::{ApiClient, ClientOptions};
use clara_types::{Coordinate, Geofence, PersonName, RelationSet};

/// York University campus fence used throughout the original app.
pub fn campus_fence() -> Geofence {
    Geofence::new(point(43.7735, -79.5019), 500.0).expect("campus fence is valid")
}

pub fn point(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).expect("test coordinate is valid")
}

pub fn name(s: &str) -> PersonName {
    PersonName::new(s).expect("test name is non-empty")
}

pub fn relations(names: &[&str]) -> RelationSet {
    names.iter().map(|n| name(n)).collect()
}

/// Start a mock server that simulates the Clara backend
pub async fn start_backend_mock() -> MockServer {
    MockServer::start().await
}

pub fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), ClientOptions::default()).expect("mock server uri is valid")
}

/// Mount a `POST /chat` reply
pub async fn mount_chat_response(server: &MockServer, response_content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "response": response_content })),
        )
        .mount(server)
        .await;
}

/// Mount a `POST /geofence` sink expecting exactly `times` reports
pub async fn mount_geofence_sink(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/geofence"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(times)
        .mount(server)
        .await;
}
