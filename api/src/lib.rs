//! HTTP client for the Clara backend.
//!
//! | Call | Endpoint | Body | Reply |
//! |------|----------|------|-------|
//! | [`ApiClient::greeting`] | `GET /` | - | `{ message }` |
//! | [`ApiClient::chat`] | `POST /chat` | [`ChatRequest`] | `{ response }` |
//! | [`ApiClient::report_geofence`] | `POST /geofence` | [`GeofenceReport`] | ignored |
//!
//! Nothing here retries. Geofence reports are meant to be fired with
//! [`spawn_geofence_report`], which logs and drops failures.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::task::JoinHandle;

use clara_types::{ChatRequest, ChatResponse, GeofenceReport, GreetingResponse};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 8;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 4 * 1024;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    pub connect_timeout: Duration,
    /// Whole-request timeout. `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            request_timeout: None,
        }
    }
}

fn client_builder(options: ClientOptions) -> reqwest::ClientBuilder {
    let mut default_headers = HeaderMap::new();
    default_headers.insert("X-Clara-Lang", HeaderValue::from_static("rust"));
    default_headers.insert("X-Clara-OS", HeaderValue::from_static(std::env::consts::OS));

    let builder = Client::builder()
        .connect_timeout(options.connect_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers);

    match options.request_timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, options: ClientOptions) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            http: client_builder(options).build()?,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}{path}`; `path` starts with `/`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /` greeting string.
    pub async fn greeting(&self) -> Result<String, ApiError> {
        let url = self.endpoint("/");
        tracing::debug!(%url, "Fetching greeting");
        let response = self.http.get(&url).send().await?;
        let body: GreetingResponse = decode(response).await?;
        Ok(body.message)
    }

    /// Relays one question to `POST /chat` and returns the reply text.
    pub async fn chat(&self, request: &ChatRequest) -> Result<String, ApiError> {
        let url = self.endpoint("/chat");
        tracing::debug!(
            %url,
            history = request.conversation_history.len(),
            "Sending chat request"
        );
        let response = self.http.post(&url).json(request).send().await?;
        let body: ChatResponse = decode(response).await?;
        Ok(body.response)
    }

    /// Sends one geofence status. The response body is only logged.
    pub async fn report_geofence(&self, report: &GeofenceReport) -> Result<(), ApiError> {
        let url = self.endpoint("/geofence");
        let response = self.http.post(&url).json(report).send().await?;
        let response = check_status(response).await?;
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(in_range = report.in_range, body = %body, "Status sent to backend");
        Ok(())
    }
}

/// Fires a geofence report in the background. Failures are logged and dropped.
pub fn spawn_geofence_report(client: ApiClient, report: GeofenceReport) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = client.report_geofence(&report).await {
            tracing::warn!("Error sending status to backend: {e}");
        }
    })
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body: truncate_body(body),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

fn truncate_body(mut body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body;
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.truncate(end);
    body.push_str("...");
    body
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use clara_types::{ChatRequest, ChatRole, ChatTurn, Coordinate, GeofenceReport, GeofenceStatus};

    use super::{ApiClient, ApiError, ClientOptions, MAX_ERROR_BODY_BYTES, truncate_body};

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), ClientOptions::default()).unwrap()
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/", ClientOptions::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.endpoint("/chat"), "http://localhost:8000/chat");
        assert_eq!(client.endpoint("/"), "http://localhost:8000/");
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(matches!(
            ApiClient::new("not a url", ClientOptions::default()),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            ApiClient::new("ftp://example.com", ClientOptions::default()),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(MAX_ERROR_BODY_BYTES);
        let truncated = truncate_body(body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= MAX_ERROR_BODY_BYTES + 3);
        assert_eq!(truncate_body("short".to_string()), "short");
    }

    #[tokio::test]
    async fn greeting_returns_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Hello "})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.greeting().await.unwrap(), "Hello ");
    }

    #[tokio::test]
    async fn chat_posts_payload_and_returns_response() {
        let server = MockServer::start().await;
        let request = ChatRequest {
            user_id: "user_123".to_string(),
            user_data: json!({}),
            conversation_history: vec![ChatTurn {
                role: ChatRole::Assistant,
                content: "Hello! How can I assist you today?".to_string(),
            }],
            user_question: "Where am I?".to_string(),
        };

        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(json!({
                "user_id": "user_123",
                "user_data": {},
                "conversation_history": [
                    {"role": "assistant", "content": "Hello! How can I assist you today?"}
                ],
                "user_question": "Where am I?"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"response": "You are at home."})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.chat(&request).await.unwrap(), "You are at home.");
    }

    #[tokio::test]
    async fn chat_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(503).set_body_string("backend down"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let request = ChatRequest {
            user_id: "u".to_string(),
            user_data: json!({}),
            conversation_history: Vec::new(),
            user_question: "hi".to_string(),
        };
        match client.chat(&request).await {
            Err(ApiError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "backend down");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn chat_maps_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "nope"})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let request = ChatRequest {
            user_id: "u".to_string(),
            user_data: json!({}),
            conversation_history: Vec::new(),
            user_question: "hi".to_string(),
        };
        assert!(matches!(
            client.chat(&request).await,
            Err(ApiError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn report_geofence_posts_camel_case_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/geofence"))
            .and(body_json(json!({
                "inRange": false,
                "location": {"latitude": 43.8, "longitude": -79.5}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let report = GeofenceReport::new(
            GeofenceStatus::Outside,
            Coordinate::new(43.8, -79.5).unwrap(),
        );
        client.report_geofence(&report).await.unwrap();
    }
}
