//! Tracing setup and the per-exchange HTTP access log

use std::time::Instant;

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::http::handlers::NDJSON_CONTENT_TYPE;

/// `RUST_LOG` wins over the `info` default. Output goes to stderr: in stdio
/// mode stdout carries protocol frames only.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

pub fn is_streamed_reply(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes() == NDJSON_CONTENT_TYPE.as_bytes())
}

/// One line per exchange. For NDJSON replies the elapsed time stops at the
/// response head; frames keep flowing afterwards and are logged by the framer.
pub async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started_at = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let streamed = is_streamed_reply(response.headers());

    info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        streamed,
        head_ms = started_at.elapsed().as_millis(),
        "http exchange"
    );

    match status {
        StatusCode::UNAUTHORIZED => {
            warn!(path = %path, "rejected: bearer token missing or invalid")
        }
        StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            warn!(path = %path, "rejected: request body is not JSON")
        }
        _ => {}
    }

    response
}

#[cfg(test)]
mod tests {
    use axum::http::{header, HeaderMap, HeaderValue};

    use super::is_streamed_reply;

    #[test]
    fn ndjson_replies_count_as_streamed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-ndjson"),
        );
        assert!(is_streamed_reply(&headers));
    }

    #[test]
    fn json_replies_are_not_streamed() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(!is_streamed_reply(&headers));
        assert!(!is_streamed_reply(&HeaderMap::new()));
    }
}
