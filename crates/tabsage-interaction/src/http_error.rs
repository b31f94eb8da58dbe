//! HTTP failure mapping shared by the provider clients.

use reqwest::StatusCode;
use serde::Deserialize;
use tabsage_core::TabSageError;

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

// Gemini sends `status`, chat-completions APIs send `type`; both send `message`.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
    r#type: Option<String>,
}

/// Maps a non-2xx response to a provider error carrying status and message.
pub(crate) fn map_http_error(provider: &str, status: StatusCode, body: &str) -> TabSageError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .map(|wrapper| {
            let label = wrapper.error.status.or(wrapper.error.r#type).unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if label.is_empty() {
                msg
            } else {
                format!("{label}: {msg}")
            }
        })
        .unwrap_or_else(|| body.trim().to_string());

    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "authentication failed",
        StatusCode::TOO_MANY_REQUESTS => "quota exceeded",
        s if s.is_server_error() => "service unavailable",
        _ => "request rejected",
    };

    TabSageError::provider(
        provider,
        format!("{kind} (HTTP {}): {message}", status.as_u16()),
    )
}

/// Maps a transport-level failure (DNS, connect, timeout).
pub(crate) fn map_transport_error(provider: &str, err: reqwest::Error) -> TabSageError {
    let kind = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    TabSageError::provider(provider, format!("{kind}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_error_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        let err = map_http_error("gemini", StatusCode::BAD_REQUEST, body);
        assert_eq!(
            err,
            TabSageError::provider(
                "gemini",
                "request rejected (HTTP 400): INVALID_ARGUMENT: API key not valid."
            )
        );
    }

    #[test]
    fn test_chat_error_body_with_quota() {
        let body = r#"{"error":{"message":"Rate limit reached","type":"rate_limit"}}"#;
        let err = map_http_error("perplexity", StatusCode::TOO_MANY_REQUESTS, body);
        match err {
            TabSageError::Provider { provider, cause } => {
                assert_eq!(provider, "perplexity");
                assert!(cause.starts_with("quota exceeded (HTTP 429)"));
                assert!(cause.contains("Rate limit reached"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plain_text_body() {
        let err = map_http_error("xai", StatusCode::UNAUTHORIZED, "  unauthorized\n");
        assert_eq!(
            err,
            TabSageError::provider("xai", "authentication failed (HTTP 401): unauthorized")
        );
    }
}
