//! Shared HTTP response helpers.
//!
//! Centralizes status-code checks so the Gemini client only deals with
//! request construction and response mapping:
//! - **401 / 403** → [`LlmError::AuthFailed`]
//! - **429** → [`LlmError::RateLimited`] with `Retry-After` parsing
//!   (falls back to 60 s if absent or unparseable)
//! - **other non-success** → [`LlmError::Api`] with status and body

use crate::error::LlmError;

/// Check an HTTP response for error statuses. Returns it unchanged on success.
pub async fn check_response(
    resp: reqwest::Response,
    provider: &str,
) -> Result<reqwest::Response, LlmError> {
    let status = resp.status();
    if status == 401 || status == 403 {
        return Err(LlmError::AuthFailed {
            provider: provider.to_string(),
        });
    }
    if status == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(LlmError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !status.is_success() {
        return Err(LlmError::Api {
            status: status.as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}
