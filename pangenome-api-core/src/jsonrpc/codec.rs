//! # JSON-RPC Envelope Codec
//!
//! Turns one call into request bytes, and response bytes into one typed result.
//!
//! ## Request
//!
//! ```json
//! { "params": [ {...} ], "method": "PanGenomeAPI.status", "version": "1.1", "id": "…", "context": {...} }
//! ```
//!
//! `context` is left out when empty. The id is a random UUID; it only serves to
//! correlate log lines, responses are never matched against it.
//!
//! The envelope is either encoded in memory ([`encode_request`]) or written straight to a
//! temporary file ([`spool_request`]) so it can be streamed from disk.
//!
//! ## Response
//!
//! Either a `result` array holding exactly one value, or an `error` object carrying the
//! server's `code`, `message` and an optional trace (`error` or `data`). Anything else is
//! a protocol violation.
use crate::models::RpcContext;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{
    fmt,
    io::{self, BufWriter, Write},
};
use tempfile::NamedTempFile;

pub const JSONRPC_VERSION: &str = "1.1";

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Failed to serialize the request parameters: '{0}'")]
    Encode(#[source] serde_json::Error),
    #[error("Failed to spool the request to disk: '{0}'")]
    Spool(#[source] io::Error),
    #[error("The response is not a valid JSON-RPC envelope: '{0}'")]
    MalformedEnvelope(#[source] serde_json::Error),
    #[error("The response carries neither a 'result' nor an 'error'")]
    MissingResult,
    #[error("The 'result' field is not an array")]
    ResultNotArray,
    #[error("Expected exactly one result value, the response holds {0}")]
    ResultCardinality(usize),
    #[error("The result does not match the expected type: '{0}'")]
    ResultType(#[source] serde_json::Error),
}

/// The error object of a failed call, exactly as the server sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    /// Server-side stack trace.
    #[serde(
        default,
        rename = "error",
        alias = "data",
        deserialize_with = "trace_string"
    )]
    pub trace: Option<String>,
}

// Traces are normally strings; anything else is kept in its JSON form.
fn trace_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(trace)) => Some(trace),
        Some(other) => Some(other.to_string()),
    })
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} (code {}): {}", self.code, self.message),
            None => write!(f, "code {}: {}", self.code, self.message),
        }
    }
}

/// The outcome of decoding a response that is a well-formed envelope.
#[derive(Debug)]
pub enum Decoded<R> {
    Result(R),
    Fault(RemoteError),
}

#[derive(Serialize)]
struct RequestEnvelope<'a> {
    params: &'a [Value],
    method: &'a str,
    version: &'static str,
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a RpcContext>,
}

impl<'a> RequestEnvelope<'a> {
    fn new(
        method: &'a str,
        params: &'a [Value],
        id: &'a str,
        context: Option<&'a RpcContext>,
    ) -> Self {
        Self {
            params,
            method,
            version: JSONRPC_VERSION,
            id,
            context: context.filter(|c| !c.is_empty()),
        }
    }
}

#[derive(Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// An encoded request and the id it was stamped with.
#[derive(Debug, Clone)]
pub struct EncodedRequest {
    pub id: String,
    pub body: Vec<u8>,
}

/// Generates a fresh correlation id.
pub fn next_call_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Serializes a single parameter into the one-element `params` list.
pub fn encode_param<P: Serialize + ?Sized>(param: &P) -> Result<Vec<Value>, CodecError> {
    serde_json::to_value(param)
        .map(|value| vec![value])
        .map_err(CodecError::Encode)
}

/// A request envelope written to a temporary file. The file is removed on drop.
#[derive(Debug)]
pub struct SpooledRequest {
    pub id: String,
    pub file: NamedTempFile,
}

/// Encodes a full request envelope.
pub fn encode_request(
    method: &str,
    params: &[Value],
    context: Option<&RpcContext>,
) -> Result<EncodedRequest, CodecError> {
    let id = next_call_id();
    let body = serde_json::to_vec(&RequestEnvelope::new(method, params, &id, context))
        .map_err(CodecError::Encode)?;
    Ok(EncodedRequest { id, body })
}

/// Writes a full request envelope to a fresh temporary file.
///
/// The serializer writes through a buffered file handle, so the encoded envelope is
/// never held in memory as a whole. This performs blocking I/O.
pub fn spool_request(
    method: &str,
    params: &[Value],
    context: Option<&RpcContext>,
) -> Result<SpooledRequest, CodecError> {
    let id = next_call_id();
    let mut file = NamedTempFile::new().map_err(CodecError::Spool)?;

    let mut writer = BufWriter::new(file.as_file_mut());
    serde_json::to_writer(&mut writer, &RequestEnvelope::new(method, params, &id, context))
        .map_err(|err| {
            if err.is_io() {
                CodecError::Spool(err.into())
            } else {
                CodecError::Encode(err)
            }
        })?;
    writer.flush().map_err(CodecError::Spool)?;
    drop(writer);

    Ok(SpooledRequest { id, file })
}

/// Decodes a response holding exactly one result of type `R`.
///
/// `expected_id` is only used to warn about mismatched replies.
pub fn decode_single<R: DeserializeOwned>(
    bytes: &[u8],
    expected_id: &str,
) -> Result<Decoded<R>, CodecError> {
    let envelope: ResponseEnvelope =
        serde_json::from_slice(bytes).map_err(CodecError::MalformedEnvelope)?;

    if let Some(id) = envelope.id.as_ref().and_then(Value::as_str) {
        if id != expected_id {
            tracing::warn!(expected = expected_id, received = id, "response id mismatch");
        }
    }

    if let Some(error) = envelope.error.filter(|e| !e.is_null()) {
        let fault: RemoteError =
            serde_json::from_value(error).map_err(CodecError::MalformedEnvelope)?;
        return Ok(Decoded::Fault(fault));
    }

    let value = match envelope.result {
        Some(Value::Array(mut values)) if values.len() == 1 => values.remove(0),
        Some(Value::Array(values)) => return Err(CodecError::ResultCardinality(values.len())),
        Some(Value::Null) | None => return Err(CodecError::MissingResult),
        Some(_) => return Err(CodecError::ResultNotArray),
    };

    serde_json::from_value(value)
        .map(Decoded::Result)
        .map_err(CodecError::ResultType)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;
    use serde_json::json;

    fn bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_encode_request_shape() {
        let params = encode_param(&Location::builder().contig_id("c1").build()).unwrap();
        let encoded = encode_request("PanGenomeAPI.search", &params, None).unwrap();

        let value: Value = serde_json::from_slice(&encoded.body).unwrap();
        assert_eq!(value["method"], "PanGenomeAPI.search");
        assert_eq!(value["version"], JSONRPC_VERSION);
        assert_eq!(value["params"], json!([{ "contig_id": "c1" }]));
        assert_eq!(value["id"], encoded.id.as_str());
        assert!(value.get("context").is_none());
    }

    #[test]
    fn test_spooled_request_matches_encoded_shape() {
        let params = encode_param(&Location::builder().contig_id("c1").build()).unwrap();
        let context = RpcContext::builder().service_ver("dev").build();

        let spooled = spool_request("PanGenomeAPI.search", &params, Some(&context)).unwrap();

        let written = std::fs::read(spooled.file.path()).unwrap();
        let value: Value = serde_json::from_slice(&written).unwrap();
        assert_eq!(value["method"], "PanGenomeAPI.search");
        assert_eq!(value["version"], JSONRPC_VERSION);
        assert_eq!(value["params"], json!([{ "contig_id": "c1" }]));
        assert_eq!(value["id"], spooled.id.as_str());
        assert_eq!(value["context"], json!({ "service_ver": "dev" }));

        let path = spooled.file.path().to_path_buf();
        drop(spooled);
        assert!(!path.exists());
    }

    #[test]
    fn test_call_ids_are_unique() {
        let a = encode_request("m", &[], None).unwrap();
        let b = encode_request("m", &[], None).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_context_is_sent_when_not_empty() {
        let empty = RpcContext::default();
        let encoded = encode_request("m", &[], Some(&empty)).unwrap();
        let value: Value = serde_json::from_slice(&encoded.body).unwrap();
        assert!(value.get("context").is_none());

        let pinned = RpcContext::builder().service_ver("beta").build();
        let encoded = encode_request("m", &[], Some(&pinned)).unwrap();
        let value: Value = serde_json::from_slice(&encoded.body).unwrap();
        assert_eq!(value["context"], json!({ "service_ver": "beta" }));
    }

    #[test]
    fn test_decode_single_result() {
        let body = bytes(json!({ "version": "1.1", "result": [{ "contig_id": "c1", "x": 1 }] }));

        match decode_single::<Location>(&body, "id").unwrap() {
            Decoded::Result(location) => {
                assert_eq!(location.contig_id().map(String::as_str), Some("c1"));
                assert_eq!(location.additional_properties()["x"], json!(1));
            }
            Decoded::Fault(fault) => panic!("unexpected fault {fault}"),
        }
    }

    #[test]
    fn test_decode_error_envelope() {
        let body = bytes(json!({
            "version": "1.1",
            "error": {
                "name": "JSONRPCError",
                "code": -32500,
                "message": "Unknown reference 7/1/1",
                "error": "Traceback (most recent call last): ..."
            }
        }));

        match decode_single::<Location>(&body, "id").unwrap() {
            Decoded::Fault(fault) => {
                assert_eq!(fault.code, -32500);
                assert_eq!(fault.message, "Unknown reference 7/1/1");
                assert_eq!(fault.name.as_deref(), Some("JSONRPCError"));
                assert!(fault.trace.unwrap().starts_with("Traceback"));
            }
            Decoded::Result(_) => panic!("expected a fault"),
        }
    }

    #[test]
    fn test_decode_error_accepts_data_trace() {
        let body = bytes(json!({ "error": { "code": 1, "message": "m", "data": "trace" } }));

        match decode_single::<Value>(&body, "id").unwrap() {
            Decoded::Fault(fault) => assert_eq!(fault.trace.as_deref(), Some("trace")),
            Decoded::Result(_) => panic!("expected a fault"),
        }
    }

    #[test]
    fn test_decode_rejects_bad_cardinality() {
        let empty = bytes(json!({ "result": [] }));
        assert!(matches!(
            decode_single::<Value>(&empty, "id"),
            Err(CodecError::ResultCardinality(0))
        ));

        let many = bytes(json!({ "result": [{}, {}] }));
        assert!(matches!(
            decode_single::<Value>(&many, "id"),
            Err(CodecError::ResultCardinality(2))
        ));

        let scalar = bytes(json!({ "result": { "state": "OK" } }));
        assert!(matches!(
            decode_single::<Value>(&scalar, "id"),
            Err(CodecError::ResultNotArray)
        ));

        let missing = bytes(json!({ "version": "1.1" }));
        assert!(matches!(
            decode_single::<Value>(&missing, "id"),
            Err(CodecError::MissingResult)
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        assert!(matches!(
            decode_single::<Value>(b"<html>502</html>", "id"),
            Err(CodecError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_decode_status_is_schemaless() {
        let body = bytes(json!({ "result": [{ "state": "OK", "version": "0.0.9" }] }));

        match decode_single::<serde_json::Map<String, Value>>(&body, "id").unwrap() {
            Decoded::Result(map) => {
                assert_eq!(map["state"], "OK");
                assert_eq!(map.len(), 2);
            }
            Decoded::Fault(fault) => panic!("unexpected fault {fault}"),
        }
    }
}
