//! Shared HTTP response helpers.
//!
//! Centralizes status-code checks (429 with `Retry-After` parsing, the
//! duplicate-request rejection, non-success → [`FeedError::Api`]) so the
//! request code stays focused on building calls and mapping payloads.

use reqwest::StatusCode;

use crate::error::FeedError;

/// Check a response for error conditions.
///
/// Returns the response unchanged on success.
pub async fn check_response(
    resp: reqwest::Response,
    request: &str,
) -> Result<reqwest::Response, FeedError> {
    if resp.status() == StatusCode::TOO_MANY_REQUESTS {
        return Err(FeedError::RateLimited {
            request: request.to_string(),
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !resp.status().is_success() {
        return Err(FeedError::Api {
            request: request.to_string(),
            status: resp.status().as_u16(),
            body: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Like [`check_response`], but recognises the duplicate-request rejection
/// a create with an already-used `requestid` receives.
pub async fn check_create_response(
    resp: reqwest::Response,
    request: &str,
    requestid: Option<&str>,
) -> Result<reqwest::Response, FeedError> {
    match (check_response(resp, request).await, requestid) {
        (Err(FeedError::Api { status, body, .. }), Some(requestid))
            if is_duplicate_rejection(status, &body) =>
        {
            Err(FeedError::DuplicateRequest {
                requestid: requestid.to_string(),
                body,
            })
        }
        (other, _) => other,
    }
}

/// 422 Unprocessable Entity whose body mentions a duplicate.
#[must_use]
pub fn is_duplicate_rejection(status: u16, body: &str) -> bool {
    status == StatusCode::UNPROCESSABLE_ENTITY.as_u16()
        && body.to_ascii_lowercase().contains("duplicate")
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}
