use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::commands::{ClientCommand, CommandEnvelope};
use crate::config::{normalize_base_url, ApiConfig};
use crate::error::{parse_error_message, ApiError};
use crate::events::ServerEvent;
use crate::retry::{is_retryable_status, is_transient_error_text, retry_delay, MAX_RETRIES};
use crate::sse::SseStreamParser;
use crate::types::{MessageWithParts, ProviderInfo, SessionInfo};

/// HTTP client for a session server: command sink, snapshot loaders, and the
/// SSE event subscription.
#[derive(Debug)]
pub struct OpencodeClient {
    http: Client,
    config: ApiConfig,
}

impl OpencodeClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder().build().map_err(ApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", normalize_base_url(&self.config.base_url))
    }

    fn headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(user_agent) = &self.config.user_agent {
            headers.insert(
                reqwest::header::USER_AGENT,
                HeaderValue::from_str(user_agent)
                    .map_err(|_| ApiError::InvalidHeader(format!("user agent: {user_agent}")))?,
            );
        }

        for (key, value) in &self.config.extra_headers {
            headers.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ApiError::InvalidHeader(format!("name: {key}")))?,
                HeaderValue::from_str(value)
                    .map_err(|_| ApiError::InvalidHeader(format!("value for {key}")))?,
            );
        }

        Ok(headers)
    }

    /// Submits one command. Retries transient failures with exponential
    /// backoff; a success means the server accepted the payload, nothing
    /// more; resulting state arrives over the event stream.
    pub async fn submit(&self, command: &ClientCommand) -> Result<(), ApiError> {
        let envelope = CommandEnvelope::new(command.clone());
        let url = self.endpoint("/command");
        let headers = self.headers()?;

        let response = self
            .send_with_retry(|| {
                self.timed(self.http.post(&url))
                    .headers(headers.clone())
                    .json(&envelope)
            })
            .await?;
        log::debug!(
            "submitted {} command ({})",
            command.kind(),
            response.status()
        );
        Ok(())
    }

    /// Loads the current session list.
    pub async fn fetch_sessions(&self) -> Result<Vec<SessionInfo>, ApiError> {
        self.get_json("/session").await
    }

    /// Loads the full message history of one session.
    pub async fn fetch_messages(
        &self,
        session_id: &str,
    ) -> Result<Vec<MessageWithParts>, ApiError> {
        self.get_json(&format!("/session/{session_id}/message")).await
    }

    /// Loads the provider/model catalog.
    pub async fn fetch_providers(&self) -> Result<Vec<ProviderInfo>, ApiError> {
        self.get_json("/config/providers").await
    }

    /// Subscribes to the server event stream, invoking `on_event` for every
    /// parsed event in arrival order. Returns when the server closes the
    /// stream.
    pub async fn stream_events<F>(&self, mut on_event: F) -> Result<(), ApiError>
    where
        F: FnMut(ServerEvent),
    {
        let mut headers = self.headers()?;
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        let response = self
            .send_with_retry(|| self.http.get(self.endpoint("/event")).headers(headers.clone()))
            .await?;

        let mut bytes = response.bytes_stream();
        let mut parser = SseStreamParser::default();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(ApiError::from)?;
            for event in parser.feed(&chunk) {
                on_event(event);
            }
        }

        Ok(())
    }

    // The event stream request deliberately skips this: it stays open
    // indefinitely.
    fn timed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        let headers = self.headers()?;
        let response = self
            .send_with_retry(|| self.timed(self.http.get(&url)).headers(headers.clone()))
            .await?;
        let body = response.text().await.map_err(ApiError::from)?;
        serde_json::from_str(&body).map_err(ApiError::from)
    }

    async fn send_with_retry<B>(&self, build: B) -> Result<Response, ApiError>
    where
        B: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            match build().send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_else(|_| {
                        status
                            .canonical_reason()
                            .unwrap_or("request failed")
                            .to_string()
                    });
                    let message = parse_error_message(status, &body);
                    last_error = Some(message.clone());

                    let retryable =
                        is_retryable_status(status.as_u16()) || is_transient_error_text(&body);
                    if attempt < MAX_RETRIES && retryable {
                        tokio::time::sleep(retry_delay(attempt)).await;
                        continue;
                    }

                    return Err(ApiError::Status { status, message });
                }
                Err(error) => {
                    let message = error.to_string();
                    let retryable = error
                        .status()
                        .map(|status| status.as_u16())
                        .is_some_and(is_retryable_status)
                        || is_transient_error_text(&message)
                        || error.is_connect()
                        || error.is_timeout();
                    last_error = Some(message);

                    if attempt < MAX_RETRIES && retryable {
                        tokio::time::sleep(retry_delay(attempt)).await;
                        continue;
                    }

                    return Err(ApiError::RetryExhausted {
                        attempts: attempt + 1,
                        last_error,
                    });
                }
            }
        }

        Err(ApiError::RetryExhausted {
            attempts: MAX_RETRIES + 1,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::OpencodeClient;
    use crate::config::ApiConfig;
    use crate::error::ApiError;

    #[test]
    fn malformed_header_values_surface_as_invalid_header() {
        let config = ApiConfig::default().with_user_agent("bad\nagent");
        let client = OpencodeClient::new(config).expect("client builds");
        assert!(matches!(
            client.headers(),
            Err(ApiError::InvalidHeader(message)) if message.contains("user agent")
        ));

        let config = ApiConfig::default().insert_header("X-Extra", "bad\nvalue");
        let client = OpencodeClient::new(config).expect("client builds");
        assert!(matches!(
            client.headers(),
            Err(ApiError::InvalidHeader(message)) if message.contains("X-Extra")
        ));

        let config = ApiConfig::default().insert_header("bad header name", "ok");
        let client = OpencodeClient::new(config).expect("client builds");
        assert!(matches!(client.headers(), Err(ApiError::InvalidHeader(_))));
    }
}
