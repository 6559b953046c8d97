//! Axum HTTP handlers for the web server
//!
//! `/mcp` streams the request body through the framer and answers with a
//! newline-delimited JSON stream, flushed unit by unit.

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use futures_util::StreamExt;
use serde::Serialize;

use crate::errors::AppError;
use crate::mcp::framer::frame_stream;
use crate::AppState;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

const ACCEPTED_CONTENT_TYPES: [&str; 3] = ["application/json", NDJSON_CONTENT_TYPE, "text/plain"];

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub mcp_endpoint: &'static str,
    pub response_framing: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn discovery() -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        mcp_endpoint: "/mcp",
        response_framing: NDJSON_CONTENT_TYPE,
    })
}

pub async fn mcp_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, AppError> {
    ensure_supported_content_type(&headers)?;

    let frames =
        frame_stream(state.dispatcher.clone(), body.into_data_stream()).map(Ok::<_, Infallible>);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)
        .body(Body::from_stream(frames))
        .map_err(|err| AppError::internal(err.to_string()))
}

/// A missing content type is accepted; parameters such as `charset` are
/// ignored.
pub fn ensure_supported_content_type(headers: &HeaderMap) -> Result<(), AppError> {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return Ok(());
    };

    let raw = value
        .to_str()
        .map_err(|_| AppError::unsupported_media_type("<invalid header value>"))?;
    let essence = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if ACCEPTED_CONTENT_TYPES.contains(&essence.as_str()) {
        Ok(())
    } else {
        Err(AppError::unsupported_media_type(raw))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, HeaderMap, HeaderValue};

    use super::ensure_supported_content_type;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn accepts_json_with_charset() {
        assert!(ensure_supported_content_type(&headers("application/json; charset=utf-8")).is_ok());
    }

    #[test]
    fn accepts_ndjson_and_missing_header() {
        assert!(ensure_supported_content_type(&headers("application/x-ndjson")).is_ok());
        assert!(ensure_supported_content_type(&HeaderMap::new()).is_ok());
    }

    #[test]
    fn rejects_form_bodies() {
        let error = ensure_supported_content_type(&headers("application/x-www-form-urlencoded"))
            .expect_err("form content type");
        assert!(error.to_string().contains("unsupported media type"));
    }
}
