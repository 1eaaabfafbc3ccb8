//! Framing and parsing for JSON-RPC 2.0 messages.
//!
//! One JSON value per message, newline-terminated when written by
//! [`encode`]. [`Decoder`] reads greedily from any `AsyncBufRead` so a
//! client may pipeline several requests on one connection.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::CodecError;
use crate::rpc::{Request, Response};

/// Decode one line of input into a [`Request`].
///
/// Validates that `jsonrpc == "2.0"`; any other value (or field absent,
/// since `jsonrpc` is not `#[serde(default)]`) is an [`CodecError::InvalidRequest`].
pub fn decode_request(line: &str) -> Result<Request, CodecError> {
    let req: Request = serde_json::from_str(line)?;
    if req.jsonrpc != "2.0" {
        return Err(CodecError::InvalidRequest);
    }
    Ok(req)
}

/// Encode a [`Response`] as a single JSON line with a trailing `\n`.
pub fn encode_response(resp: &Response) -> Result<String, CodecError> {
    let mut s = serde_json::to_string(resp)?;
    s.push('\n');
    Ok(s)
}

/// Encode a [`Request`] as a single JSON line with a trailing `\n`. Used
/// by hook clients dialing the daemon; the server side only ever decodes
/// requests, never encodes them.
pub fn encode_request(req: &Request) -> Result<String, CodecError> {
    let mut s = serde_json::to_string(req)?;
    s.push('\n');
    Ok(s)
}

/// Decode one line of input into a [`Response`]. Used by hook clients
/// reading the daemon's reply.
pub fn decode_response(line: &str) -> Result<Response, CodecError> {
    Ok(serde_json::from_str(line)?)
}

/// A streaming decoder over a connection's read half.
///
/// Reads newline-delimited JSON-RPC requests one at a time, tolerating
/// blank lines between messages.
pub struct Decoder<R> {
    lines: tokio::io::Lines<R>,
}

/// Outcome of one [`Decoder::next_request`] call.
pub enum Decoded {
    /// A well-formed request.
    Request(Request),
    /// A line was read but failed to parse or validate.
    Malformed(CodecError),
    /// The connection reached EOF with no more data.
    Eof,
}

impl<R> Decoder<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Wrap a buffered async reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Read and decode the next request, skipping blank lines.
    ///
    /// Returns `Ok(Decoded::Eof)` on clean EOF; propagates the underlying
    /// I/O error (e.g. a read-deadline timeout) unchanged so the caller can
    /// distinguish "connection closed" from "connection stalled".
    pub async fn next_request(&mut self) -> std::io::Result<Decoded> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(Decoded::Eof);
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(match decode_request(trimmed) {
                Ok(req) => Decoded::Request(req),
                Err(e) => Decoded::Malformed(e),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{RequestId, RpcResult};

    #[test]
    fn rejects_non_2_0_jsonrpc_version() {
        let line = r#"{"jsonrpc":"1.0","id":"1","method":"lint"}"#;
        let err = decode_request(line).unwrap_err();
        assert!(matches!(err, CodecError::InvalidRequest));
    }

    #[test]
    fn accepts_well_formed_request() {
        let line = r#"{"jsonrpc":"2.0","id":1,"method":"lint","params":{}}"#;
        let req = decode_request(line).unwrap();
        assert_eq!(req.method, "lint");
        assert_eq!(req.id, RequestId::from(1u64));
    }

    #[test]
    fn encode_adds_trailing_newline() {
        let resp = Response::success(RequestId::from("x"), RpcResult::default());
        let encoded = encode_response(&resp).unwrap();
        assert!(encoded.ends_with('\n'));
    }

    #[tokio::test]
    async fn decoder_skips_blank_lines_and_reports_eof() {
        let input = "\n\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"stats\"}\n\n";
        let mut decoder = Decoder::new(input.as_bytes());
        match decoder.next_request().await.unwrap() {
            Decoded::Request(req) => assert_eq!(req.method, "stats"),
            _ => panic!("expected a request"),
        }
        match decoder.next_request().await.unwrap() {
            Decoded::Eof => {}
            _ => panic!("expected EOF"),
        }
    }

    #[tokio::test]
    async fn decoder_reports_malformed_line_without_dying() {
        let input = "not json\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"stats\"}\n";
        let mut decoder = Decoder::new(input.as_bytes());
        match decoder.next_request().await.unwrap() {
            Decoded::Malformed(_) => {}
            _ => panic!("expected malformed"),
        }
        match decoder.next_request().await.unwrap() {
            Decoded::Request(req) => assert_eq!(req.method, "stats"),
            _ => panic!("expected a request"),
        }
    }
}
