//! Image Proxy API Handler
//!
//! Relays profile pictures so browsers can load them without hitting the
//! CDN's hotlink protection. Requests go out with browser-like headers.

use axum::{
    extract::{Query, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{ACCEPT, CONTENT_TYPE, REFERER, USER_AGENT},
    },
    response::{IntoResponse, Response},
};
use rand::seq::IndexedRandom;
use serde::Deserialize;

use super::AppState;
use super::error::{ApiError, ApiResult};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1",
];

const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/*,*/*;q=0.8";
const IMAGE_REFERER: &str = "https://www.instagram.com/";
const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Query parameters of the image proxy
#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub url: String,
}

/// GET /proxy-image?url=...
/// Fetch a remote image and relay its bytes
pub async fn proxy_image(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> ApiResult<Response> {
    let url = query.url;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ApiError::BadRequest("INVALID_URL".to_string()));
    }

    let mut response = match state.http.get(&url).headers(browser_headers()).send().await {
        Ok(response) => response,
        Err(e) => return Err(image_failure(&state, &url, &e.to_string())),
    };

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound("IMAGE_NOT_FOUND".to_string()));
    }
    if status != StatusCode::OK {
        return Err(image_failure(&state, &url, &format!("upstream status {status}")));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let limit = state.image_max_bytes;
    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(image_too_large(&url, limit));
    }

    // Content-Length may be absent or wrong, so the cap also applies while reading
    let mut body = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                if body.len() + chunk.len() > limit {
                    return Err(image_too_large(&url, limit));
                }
                body.extend_from_slice(&chunk);
            }
            Ok(None) => break,
            Err(e) => return Err(image_failure(&state, &url, &e.to_string())),
        }
    }

    Ok(([(CONTENT_TYPE, content_type)], body).into_response())
}

fn browser_headers() -> HeaderMap {
    let agent = USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0]);

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(agent));
    headers.insert(REFERER, HeaderValue::from_static(IMAGE_REFERER));
    headers.insert(ACCEPT, HeaderValue::from_static(IMAGE_ACCEPT));
    headers
}

fn image_too_large(url: &str, limit: usize) -> ApiError {
    tracing::warn!("Image at {} exceeds {} bytes, not relaying", url, limit);
    ApiError::BadGateway("IMAGE_TOO_LARGE".to_string())
}

fn image_failure(state: &AppState, url: &str, detail: &str) -> ApiError {
    tracing::warn!("Image proxy failed for {}: {}", url, detail);
    state
        .alerts
        .notify(format!("IMAGE PROXY FAILED\n{url}\n{detail}"));
    ApiError::BadGateway("IMAGE_FETCH_FAILED".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers();
        let agent = headers.get(USER_AGENT).unwrap().to_str().unwrap();
        assert!(USER_AGENTS.contains(&agent));
        assert_eq!(headers.get(REFERER).unwrap(), IMAGE_REFERER);
        assert_eq!(headers.get(ACCEPT).unwrap(), IMAGE_ACCEPT);
    }
}
