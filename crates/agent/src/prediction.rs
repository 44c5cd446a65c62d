//! Client for the hosted prediction endpoint that backs the assistant.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quotecanvas_core::config::AssistantConfig;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("prediction endpoint returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode prediction response: {0}")]
    Decode(String),
    #[error("prediction request timed out after {0}ms")]
    Timeout(u64),
    #[error("assistant is not configured: {0}")]
    Configuration(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Json,
    #[default]
    Text,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub question: String,
    pub override_config: OverrideConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideConfig {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl PredictionRequest {
    pub fn new(question: &str, session_id: &str, format: ResponseFormat) -> Self {
        Self {
            question: question.to_string(),
            override_config: OverrideConfig {
                session_id: session_id.to_string(),
                response_format: Some(format),
            },
        }
    }
}

#[derive(Deserialize)]
struct PredictionResponse {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
pub trait PredictionClient: Send + Sync {
    /// Sends one question and returns the reply text; a reply without text is empty.
    async fn predict(
        &self,
        question: &str,
        session_id: &str,
        format: ResponseFormat,
    ) -> Result<String, AssistantError>;
}

pub struct HttpPredictionClient {
    endpoint: String,
    api_key: Option<SecretString>,
    timeout: Duration,
    client: Arc<Client>,
}

impl HttpPredictionClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, client: Arc<Client>) -> Self {
        Self { endpoint: endpoint.into(), api_key: None, timeout, client }
    }

    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn from_config(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let endpoint = config.endpoint_url.clone().ok_or_else(|| {
            AssistantError::Configuration("assistant.endpoint_url is not set".to_string())
        })?;

        let client = Self::new(
            endpoint,
            Duration::from_secs(config.timeout_secs),
            Arc::new(Client::new()),
        );
        Ok(match &config.api_key {
            Some(key) => client.with_api_key(key.clone()),
            None => client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn predict(
        &self,
        question: &str,
        session_id: &str,
        format: ResponseFormat,
    ) -> Result<String, AssistantError> {
        let body = PredictionRequest::new(question, session_id, format);
        let mut request = self.client.post(&self.endpoint).json(&body).timeout(self.timeout);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AssistantError::Timeout(self.timeout.as_millis() as u64)
            } else {
                AssistantError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AssistantError::Status { status: status.as_u16(), message });
        }

        let raw = response
            .text()
            .await
            .map_err(|e| AssistantError::Decode(format!("failed to read response body: {e}")))?;
        let parsed: PredictionResponse =
            serde_json::from_str(&raw).map_err(|e| AssistantError::Decode(e.to_string()))?;

        Ok(parsed.text.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{AssistantError, HttpPredictionClient, PredictionClient, ResponseFormat};
    use quotecanvas_core::config::AppConfig;

    const PREDICTION_PATH: &str = "/api/v1/prediction/facility-flow";

    fn client_for(server: &MockServer, timeout: Duration) -> HttpPredictionClient {
        HttpPredictionClient::new(
            format!("{}{PREDICTION_PATH}", server.uri()),
            timeout,
            Arc::new(reqwest::Client::new()),
        )
    }

    #[tokio::test]
    async fn posts_question_with_session_and_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PREDICTION_PATH))
            .and(body_json(json!({
                "question": "Quote for lift repair",
                "overrideConfig": { "sessionId": "approver", "responseFormat": "json" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "[]" })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server, Duration::from_secs(5))
            .predict("Quote for lift repair", "approver", ResponseFormat::Json)
            .await
            .expect("prediction");
        assert_eq!(reply, "[]");
    }

    #[tokio::test]
    async fn missing_text_reads_as_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "chatId": "c-1" })))
            .mount(&server)
            .await;

        let reply = client_for(&server, Duration::from_secs(5))
            .predict("hello", "requestor", ResponseFormat::Text)
            .await
            .expect("prediction");
        assert!(reply.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("flow offline"))
            .mount(&server)
            .await;

        let error = client_for(&server, Duration::from_secs(5))
            .predict("hello", "requestor", ResponseFormat::Text)
            .await
            .expect_err("503 should fail");
        assert!(matches!(error, AssistantError::Status { status: 503, ref message } if message == "flow offline"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let error = client_for(&server, Duration::from_secs(5))
            .predict("hello", "requestor", ResponseFormat::Text)
            .await
            .expect_err("html is not json");
        assert!(matches!(error, AssistantError::Decode(_)));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "text": "late" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let error = client_for(&server, Duration::from_millis(50))
            .predict("hello", "requestor", ResponseFormat::Text)
            .await
            .expect_err("should time out");
        assert!(matches!(error, AssistantError::Timeout(50)));
    }

    #[tokio::test]
    async fn api_key_is_sent_as_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer flow-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server, Duration::from_secs(5))
            .with_api_key(SecretString::from("flow-key".to_string()))
            .predict("hello", "requestor", ResponseFormat::Text)
            .await
            .expect("prediction");
        assert_eq!(reply, "ok");
    }

    #[test]
    fn from_config_requires_endpoint() {
        let config = AppConfig::default();
        assert!(matches!(
            HttpPredictionClient::from_config(&config.assistant),
            Err(AssistantError::Configuration(_))
        ));

        let mut remote = config.assistant.clone();
        remote.endpoint_url = Some("http://127.0.0.1:3001/api/v1/prediction/flow".to_string());
        let client = HttpPredictionClient::from_config(&remote).expect("configured");
        assert_eq!(client.endpoint(), "http://127.0.0.1:3001/api/v1/prediction/flow");
    }
}
