use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} {message}")]
    Status { status: StatusCode, message: String },

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("retry exhausted after {attempts} attempts (last error: {last_error:?})")]
    RetryExhausted {
        attempts: u32,
        last_error: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub message: Option<String>,
}

/// Extracts a readable message from an error response body, falling back to
/// the raw body and finally the status line.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(ErrorPayload { value: Some(fields) }) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = fields.message.filter(|message| !message.is_empty()) {
            return message;
        }
    }

    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::parse_error_message;
    use reqwest::StatusCode;

    #[test]
    fn extracts_structured_message() {
        let body = r#"{"error":{"message":"session not found"}}"#;
        assert_eq!(
            parse_error_message(StatusCode::NOT_FOUND, body),
            "session not found"
        );
    }

    #[test]
    fn falls_back_to_raw_body_then_status_line() {
        assert_eq!(
            parse_error_message(StatusCode::BAD_REQUEST, "plain text failure"),
            "plain text failure"
        );
        assert_eq!(
            parse_error_message(StatusCode::BAD_REQUEST, ""),
            "Bad Request"
        );
    }
}
