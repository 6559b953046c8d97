//! Newline-delimited JSON framing over a chunked byte stream
//!
//! Every non-blank chunk is decoded as one complete JSON document: an object
//! is a single request, an array is a batch. Each document yields exactly one
//! output unit terminated by `\n`. Chunks are not reassembled, so a document
//! split across two reads is reported as two parse errors.

use std::{
    fmt::Display,
    sync::atomic::{AtomicU64, Ordering},
};

use async_stream::stream;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::errors::ProtocolError;
use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::rpc::{parse_request, ResponseEnvelope};

const SERIALIZATION_FAILURE: &[u8] = br#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"Internal error: response serialization failed"}}"#;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// What one input document turns into on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FramedUnit {
    Single(ResponseEnvelope),
    Batch(Vec<ResponseEnvelope>),
}

/// Logs the end of a connection however the stream stops: input exhausted,
/// transport failure, or the consumer dropping the response.
struct ConnectionGuard {
    connection_id: u64,
}

impl ConnectionGuard {
    fn open() -> Self {
        let connection_id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
        info!(connection_id, "connection opened");
        Self { connection_id }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        info!(connection_id = self.connection_id, "connection closed");
    }
}

/// Decodes and dispatches one chunk.
pub async fn process_chunk(dispatcher: &Dispatcher, chunk: &[u8]) -> FramedUnit {
    let payload: Value = match serde_json::from_slice(chunk) {
        Ok(value) => value,
        Err(err) => {
            error!(error = %err, "failed to parse request chunk");
            return FramedUnit::Single(ResponseEnvelope::error(None, ProtocolError::Parse));
        }
    };

    match payload {
        Value::Array(items) => {
            info!(size = items.len(), "processing batch");
            let mut responses = Vec::with_capacity(items.len());
            for item in items {
                responses.push(dispatch_value(dispatcher, item).await);
            }
            FramedUnit::Batch(responses)
        }
        single => FramedUnit::Single(dispatch_value(dispatcher, single).await),
    }
}

async fn dispatch_value(dispatcher: &Dispatcher, payload: Value) -> ResponseEnvelope {
    match parse_request(payload) {
        Ok(request) => dispatcher.dispatch(request).await,
        Err(rejection) => rejection,
    }
}

/// Serializes a unit as a single line.
pub fn encode_unit(unit: &FramedUnit) -> Bytes {
    match serde_json::to_vec(unit) {
        Ok(mut line) => {
            line.push(b'\n');
            Bytes::from(line)
        }
        Err(err) => {
            error!(error = %err, "failed to serialize response unit");
            let mut line = SERIALIZATION_FAILURE.to_vec();
            line.push(b'\n');
            Bytes::from(line)
        }
    }
}

fn is_blank(chunk: &[u8]) -> bool {
    chunk.iter().all(u8::is_ascii_whitespace)
}

/// Turns an inbound chunk stream into a stream of framed reply lines.
///
/// Chunks are handled strictly one after another. A read error ends the
/// stream after one final internal-error unit.
pub fn frame_stream<S, E>(dispatcher: Dispatcher, chunks: S) -> impl Stream<Item = Bytes>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    stream! {
        let _guard = ConnectionGuard::open();
        let mut chunks = Box::pin(chunks);

        while let Some(next) = chunks.next().await {
            match next {
                Ok(chunk) => {
                    if is_blank(&chunk) {
                        continue;
                    }
                    debug!(bytes = chunk.len(), "received chunk");
                    let unit = process_chunk(&dispatcher, &chunk).await;
                    yield encode_unit(&unit);
                }
                Err(err) => {
                    error!(error = %err, "stream processing failed");
                    let unit = FramedUnit::Single(ResponseEnvelope::error(
                        None,
                        ProtocolError::Stream(err.to_string()),
                    ));
                    yield encode_unit(&unit);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{io, sync::Arc};

    use futures_util::stream;
    use serde_json::json;

    use super::*;
    use crate::domain::builtin_registry;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(builtin_registry()))
    }

    fn chunk(text: &str) -> Result<Bytes, io::Error> {
        Ok(Bytes::from(text.to_string()))
    }

    async fn collect_lines(chunks: Vec<Result<Bytes, io::Error>>) -> Vec<Value> {
        let output: Vec<Bytes> = frame_stream(dispatcher(), stream::iter(chunks))
            .collect()
            .await;

        output
            .iter()
            .map(|line| {
                assert_eq!(line.last(), Some(&b'\n'));
                assert_eq!(line.iter().filter(|byte| **byte == b'\n').count(), 1);
                serde_json::from_slice(line).expect("line is valid json")
            })
            .collect()
    }

    #[tokio::test]
    async fn single_request_yields_single_line() {
        let lines = collect_lines(vec![chunk(
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"toolName":"calculator/add","inputs":{"a":2,"b":3}}}"#,
        )])
        .await;

        assert_eq!(
            lines,
            vec![json!({ "jsonrpc": "2.0", "id": 1, "result": { "result": 5 } })]
        );
    }

    #[tokio::test]
    async fn batch_preserves_order_and_length() {
        let lines = collect_lines(vec![chunk(
            r#"[
                {"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"toolName":"calculator/multiply","inputs":{"a":2,"b":4}}},
                {"jsonrpc":"2.0","id":1,"method":"unknown/method"},
                {"jsonrpc":"2.0","id":2,"method":"tools/list"}
            ]"#,
        )])
        .await;

        assert_eq!(lines.len(), 1);
        let batch = lines[0].as_array().expect("batch array");
        assert_eq!(batch.len(), 3);
        let ids: Vec<i64> = batch.iter().filter_map(|item| item["id"].as_i64()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(batch[0]["result"], json!({ "result": 8 }));
        assert_eq!(batch[1]["error"]["code"], json!(-32601));
        assert!(batch[2]["result"]["tools"].is_array());
    }

    #[tokio::test]
    async fn malformed_batch_element_does_not_spoil_the_batch() {
        let lines = collect_lines(vec![chunk(
            r#"[{"jsonrpc":"2.0","id":1,"method":"tools/list"},"oops",{"jsonrpc":"2.0","id":2}]"#,
        )])
        .await;

        let batch = lines[0].as_array().expect("batch array");
        assert_eq!(batch.len(), 3);
        assert!(batch[0]["result"].is_object());
        assert_eq!(batch[1]["error"]["code"], json!(-32600));
        assert_eq!(batch[1]["id"], Value::Null);
        assert_eq!(batch[2]["error"]["code"], json!(-32600));
        assert_eq!(batch[2]["id"], json!(2));
    }

    #[tokio::test]
    async fn empty_batch_yields_empty_array() {
        let lines = collect_lines(vec![chunk("[]")]).await;
        assert_eq!(lines, vec![json!([])]);
    }

    #[tokio::test]
    async fn parse_error_does_not_stop_the_stream() {
        let lines = collect_lines(vec![
            chunk("{not json"),
            chunk(r#"{"jsonrpc":"2.0","id":5,"method":"tools/list"}"#),
        ])
        .await;

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": { "code": -32700, "message": "Parse error" }
            })
        );
        assert_eq!(lines[1]["id"], json!(5));
        assert!(lines[1]["result"]["tools"].is_array());
    }

    #[tokio::test]
    async fn blank_chunks_are_skipped() {
        let lines = collect_lines(vec![
            chunk(""),
            chunk("  \n"),
            chunk(r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#),
        ])
        .await;

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["id"], json!(1));
    }

    #[tokio::test]
    async fn transport_error_emits_final_unit_and_closes() {
        let lines = collect_lines(vec![
            chunk(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#),
            Err(io::Error::other("connection reset")),
            chunk(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#),
        ])
        .await;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["id"], Value::Null);
        assert_eq!(lines[1]["error"]["code"], json!(-32603));
        assert!(lines[1]["error"]["message"]
            .as_str()
            .expect("message")
            .contains("connection reset"));
    }

    #[tokio::test]
    async fn split_document_is_not_reassembled() {
        let lines = collect_lines(vec![
            chunk(r#"{"jsonrpc":"2.0","id":1,"#),
            chunk(r#""method":"tools/list"}"#),
        ])
        .await;

        assert_eq!(lines.len(), 2);
        assert!(lines
            .iter()
            .all(|line| line["error"]["code"] == json!(-32700)));
    }

    #[tokio::test]
    async fn repeated_request_gives_identical_lines() {
        let request = r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"toolName":"calculator/subtract","inputs":{"a":10,"b":4}}}"#;
        let lines = collect_lines(vec![chunk(request), chunk(request)]).await;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], lines[1]);
        assert_eq!(lines[0]["result"], json!({ "result": 6 }));
    }
}
