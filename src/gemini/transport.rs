use crate::{
    config::GeminiConfig,
    error::{Result, StudioError},
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Sends one JSON request to a model method, e.g. `imagen-4.0-generate-001:predict`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StudioError::ConfigError(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/models/{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(self.url(endpoint))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| StudioError::RequestError(format!("{} request failed: {}", endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("Gemini API returned {} for {}", status, endpoint);
            return Err(StudioError::ApiError {
                status: status.as_u16(),
                message: api_error_message(&error_text),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| StudioError::ResponseError(e.to_string()))
    }
}

/// Pulls `error.message` out of a Google API error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays scripted responses in order and records every request.
    #[derive(Default)]
    pub struct MockTransport {
        responses: Mutex<VecDeque<Result<Value>>>,
        requests: Mutex<Vec<(String, Value)>>,
        delay: Option<Duration>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn respond(self, response: Value) -> Self {
            self.responses.lock().unwrap().push_back(Ok(response));
            self
        }

        pub fn fail(self, error: StudioError) -> Self {
            self.responses.lock().unwrap().push_back(Err(error));
            self
        }

        pub fn requests(&self) -> Vec<(String, Value)> {
            self.requests.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
            self.requests
                .lock()
                .unwrap()
                .push((endpoint.to_string(), body.clone()));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(StudioError::RequestError("no scripted response".into())))
        }
    }
}
