//! HTTP client for the messaging-network bridge

use super::TransportError;
use crate::runtime::Transport;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct NumberIdResponse {
    id: Option<String>,
}

/// Transport that drives a bridge process over HTTP
pub struct HttpBridgeTransport {
    client: Client,
    base_url: String,
}

impl HttpBridgeTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<String, TransportError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    TransportError::network(format!("Connection failed: {e}"))
                } else {
                    TransportError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_error(status, &text));
        }
        Ok(text)
    }
}

fn classify_error(status: StatusCode, body: &str) -> TransportError {
    match status.as_u16() {
        429 => TransportError::rate_limit(format!("Rate limited: {body}")),
        400..=499 => TransportError::rejected(format!("Bridge rejected request ({status}): {body}")),
        500..=599 => TransportError::server_error(format!("Bridge error ({status}): {body}")),
        _ => TransportError::unknown(format!("HTTP {status}: {body}")),
    }
}

#[async_trait]
impl Transport for HttpBridgeTransport {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), TransportError> {
        self.post("/send", &json!({ "to": chat_id, "text": text }))
            .await
            .map(|_| ())
    }

    async fn resolve_number(&self, number: &str) -> Result<Option<String>, TransportError> {
        let body = self.post("/number-id", &json!({ "number": number })).await?;
        let parsed: NumberIdResponse = serde_json::from_str(&body).map_err(|e| {
            TransportError::unknown(format!("Failed to parse number lookup: {e} - body: {body}"))
        })?;
        Ok(parsed.id)
    }

    async fn initialize(&self) -> Result<(), TransportError> {
        self.post("/initialize", &json!({})).await.map(|_| ())
    }

    async fn logout(&self) -> Result<(), TransportError> {
        self.post("/logout", &json!({})).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportErrorKind;
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    async fn spawn_bridge(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_classify_error() {
        assert_eq!(
            classify_error(StatusCode::TOO_MANY_REQUESTS, "").kind,
            TransportErrorKind::RateLimit
        );
        assert_eq!(
            classify_error(StatusCode::BAD_REQUEST, "").kind,
            TransportErrorKind::Rejected
        );
        assert_eq!(
            classify_error(StatusCode::BAD_GATEWAY, "").kind,
            TransportErrorKind::ServerError
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let transport = HttpBridgeTransport::new("http://bridge:3001/").unwrap();
        assert_eq!(transport.url("/send"), "http://bridge:3001/send");
    }

    #[tokio::test]
    async fn test_resolve_and_send_against_bridge() {
        let sent: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let sent_clone = sent.clone();

        let router = Router::new()
            .route(
                "/number-id",
                post(|Json(req): Json<Value>| async move {
                    if req["number"] == "5491112345678" {
                        Json(json!({ "id": "5491112345678@c.us" }))
                    } else {
                        Json(json!({ "id": null }))
                    }
                }),
            )
            .route(
                "/send",
                post(move |Json(req): Json<Value>| {
                    let sent = sent_clone.clone();
                    async move {
                        sent.lock().unwrap().push(req);
                        AxumStatus::OK
                    }
                }),
            );
        let transport = HttpBridgeTransport::new(&spawn_bridge(router).await).unwrap();

        let id = transport.resolve_number("5491112345678").await.unwrap();
        assert_eq!(id.as_deref(), Some("5491112345678@c.us"));
        assert!(transport.resolve_number("540").await.unwrap().is_none());

        transport.send_text("5491112345678@c.us", "hola").await.unwrap();
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["to"], "5491112345678@c.us");
        assert_eq!(sent[0]["text"], "hola");
    }

    #[tokio::test]
    async fn test_bridge_failure_is_classified() {
        let router = Router::new().route(
            "/logout",
            post(|| async { (AxumStatus::SERVICE_UNAVAILABLE, "still pairing") }),
        );
        let transport = HttpBridgeTransport::new(&spawn_bridge(router).await).unwrap();

        let err = transport.logout().await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::ServerError);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_unreachable_bridge_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpBridgeTransport::new(&format!("http://{addr}")).unwrap();
        let err = transport.initialize().await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Network);
    }
}
