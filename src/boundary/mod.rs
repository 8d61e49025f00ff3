//! Request boundary plumbing
//!
//! The service proper is the pipeline; this module is the thin edge around
//! it: parsing a raw query string into the scalar-or-list parameter multimap
//! that [`crate::types::QueryParams`] normalizes, and translating pipeline
//! errors into the user-visible failure response. Remote-call failures keep
//! the upstream status code and body; everything else becomes a 500 with the
//! error's message.
//!
//! [`parse_query_string`] is the entry point for an embedding HTTP frontend
//! that receives requests as URL query strings; the bundled CLI binary
//! builds the same multimap directly from its typed arguments
//! (`Args::to_raw_params`) and skips it.

use serde_json::{json, Value};

use crate::errors::RankError;
use crate::types::{ParamValue, RawParams};

/// Parse a URL query string into the raw parameter multimap.
///
/// Repeated keys collect into a list value. `+` and percent-escapes are
/// decoded; malformed escapes pass through literally.
pub fn parse_query_string(query: &str) -> RawParams {
    let mut params = RawParams::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = match pair.split_once('=') {
            Some((k, v)) => (percent_decode(k), percent_decode(v)),
            None => (percent_decode(pair), String::new()),
        };
        match params.remove(&key) {
            None => {
                params.insert(key, ParamValue::Scalar(value));
            }
            Some(ParamValue::Scalar(existing)) => {
                params.insert(key, ParamValue::List(vec![existing, value]));
            }
            Some(ParamValue::List(mut items)) => {
                items.push(value);
                params.insert(key, ParamValue::List(items));
            }
        }
    }
    params
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                match (hex_val(bytes.get(i + 1)), hex_val(bytes.get(i + 2))) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi * 16 + lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(byte: Option<&u8>) -> Option<u8> {
    match byte? {
        b @ b'0'..=b'9' => Some(b - b'0'),
        b @ b'a'..=b'f' => Some(b - b'a' + 10),
        b @ b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Translate a pipeline error into a `(status, json body)` response
pub fn error_response(err: &RankError) -> (u16, Value) {
    match err {
        RankError::RemoteCall { status, body } => {
            let upstream = serde_json::from_str::<Value>(body)
                .unwrap_or_else(|_| Value::String(body.clone()));
            (
                *status,
                json!({ "message": err.to_string(), "response": upstream }),
            )
        }
        other => (other.status_code(), json!({ "message": other.to_string() })),
    }
}
