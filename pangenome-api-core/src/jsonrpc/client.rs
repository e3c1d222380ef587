//! # Versioned Dispatcher
//!
//! [`JsonRpcClient`] performs one remote call end to end: it packs the single parameter,
//! stamps the pinned service version into the call context, hands the envelope to the
//! [`Transport`], and unwraps the single result.
//!
//! When the transport streams request bodies, the envelope is written to a temporary file
//! and sent from there, so it is never held in memory as a whole.
//!
//! ## Error Handling
//!
//! Failures are split by where they happened, so callers can react to each differently:
//!
//! - **[`CallError::Transport`]**: the request never produced a response (connection
//!   refused, timeout, TLS or DNS failure, credential refused before sending).
//! - **[`CallError::Protocol`]**: a response arrived but breaks the JSON-RPC contract.
//! - **[`CallError::Remote`]**: the server reported a fault; code, message and trace are
//!   kept verbatim.
//! - **[`CallError::Unauthorized`]**: the server rejected the credential.
//!
//! Nothing is retried. Remote operations are not assumed to be idempotent.
use super::codec::{self, CodecError, Decoded, RemoteError, SpooledRequest};
use crate::{
    models::{PaginationViolation, RpcContext},
    transport::{
        HttpRequest, HttpResponse, HttpTransport, RequestBody, Transport, TransportError,
    },
};
use http::{
    StatusCode,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::io;
use url::Url;

const MAX_BODY_EXCERPT: usize = 512;

/// Responses that reached the client but violate the service contract.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Unexpected HTTP status {status} without a JSON-RPC error: '{body}'")]
    UnexpectedStatus { status: StatusCode, body: String },
    #[error("Pagination contract violated: {0}")]
    Pagination(#[from] PaginationViolation),
}

#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("Failed to encode the call parameters: '{0}'")]
    InvalidParams(#[source] CodecError),
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),
    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("Server error {0}")]
    Remote(RemoteError),
    #[error("Authorization rejected by the server (HTTP {status}): '{message}'")]
    Unauthorized { status: StatusCode, message: String },
}

impl CallError {
    /// True when the caller should acquire a new credential before trying again.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            CallError::Unauthorized { .. }
                | CallError::Transport(
                    TransportError::InsecureCredential(_) | TransportError::InvalidCredential
                )
        )
    }

    /// The server's fault, if this error is one.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            CallError::Remote(fault) => Some(fault),
            _ => None,
        }
    }
}

/// A JSON-RPC client bound to one service endpoint.
#[derive(Debug, Clone)]
pub struct JsonRpcClient<T = HttpTransport> {
    transport: T,
    url: Url,
    service_version: Option<String>,
}

impl<T> JsonRpcClient<T> {
    pub fn new(url: Url, transport: T) -> Self {
        Self {
            transport,
            url,
            service_version: None,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The release every call is routed to. `None` targets the latest release.
    pub fn service_version(&self) -> Option<&str> {
        self.service_version.as_deref()
    }

    pub fn set_service_version(&mut self, version: Option<String>) {
        self.service_version = version;
    }
}

impl<T: Transport> JsonRpcClient<T> {
    /// Calls `method` with exactly one parameter and decodes exactly one result.
    ///
    /// # Returns
    ///
    /// * `Ok(R)` - The decoded result.
    /// * `Err(CallError)` - See the module documentation for the failure taxonomy.
    pub async fn call<P, R>(
        &self,
        method: &str,
        param: &P,
        context: Option<RpcContext>,
    ) -> Result<R, CallError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params = codec::encode_param(param).map_err(CallError::InvalidParams)?;
        self.dispatch(method, params, context).await
    }

    /// Calls a zero-argument `method` (such as `status`).
    pub async fn call_without_params<R>(
        &self,
        method: &str,
        context: Option<RpcContext>,
    ) -> Result<R, CallError>
    where
        R: DeserializeOwned,
    {
        self.dispatch(method, Vec::new(), context).await
    }

    async fn dispatch<R>(
        &self,
        method: &str,
        params: Vec<Value>,
        context: Option<RpcContext>,
    ) -> Result<R, CallError>
    where
        R: DeserializeOwned,
    {
        let context = self.resolve_context(context);
        let streamed = self.transport.streams_request_bodies();

        // The spooled file must outlive the send.
        let (id, body, spool_file) = if streamed {
            let spooled = spool(method, params, context).await?;
            let body = RequestBody::File(spooled.file.path().to_path_buf());
            (spooled.id, body, Some(spooled.file))
        } else {
            let encoded = codec::encode_request(method, &params, context.as_ref())
                .map_err(CallError::InvalidParams)?;
            (encoded.id, encoded.body.into(), None)
        };

        tracing::debug!(
            method,
            %id,
            url = %self.url,
            service_version = self.service_version.as_deref(),
            streamed,
            "dispatching call"
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .transport
            .send(HttpRequest {
                url: self.url.clone(),
                headers,
                body,
            })
            .await;
        drop(spool_file);

        decode_response(response?, &id)
    }

    // The pinned version overrides any `service_ver` the caller put in the context.
    fn resolve_context(&self, context: Option<RpcContext>) -> Option<RpcContext> {
        match &self.service_version {
            Some(version) => Some(
                context
                    .unwrap_or_default()
                    .to_builder()
                    .service_ver(version.clone())
                    .build(),
            ),
            None => context,
        }
    }
}

async fn spool(
    method: &str,
    params: Vec<Value>,
    context: Option<RpcContext>,
) -> Result<SpooledRequest, CallError> {
    let method = method.to_string();
    tokio::task::spawn_blocking(move || codec::spool_request(&method, &params, context.as_ref()))
        .await
        .map_err(|err| CallError::InvalidParams(CodecError::Spool(io::Error::other(err))))?
        .map_err(CallError::InvalidParams)
}

fn decode_response<R: DeserializeOwned>(
    response: HttpResponse,
    expected_id: &str,
) -> Result<R, CallError> {
    let status = response.status;
    let decoded = codec::decode_single::<R>(&response.body, expected_id);

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        let message = match decoded {
            Ok(Decoded::Fault(fault)) => fault.message,
            _ => body_excerpt(&response.body),
        };
        return Err(CallError::Unauthorized { status, message });
    }

    match decoded {
        Ok(Decoded::Fault(fault)) => {
            tracing::debug!(code = fault.code, message = %fault.message, "server returned a fault");
            Err(CallError::Remote(fault))
        }
        _ if !status.is_success() => Err(ProtocolError::UnexpectedStatus {
            status,
            body: body_excerpt(&response.body),
        }
        .into()),
        Ok(Decoded::Result(value)) => Ok(value),
        Err(err) => Err(ProtocolError::Codec(err).into()),
    }
}

fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Location, testing::CannedTransport};
    use serde_json::json;

    fn client(transport: CannedTransport) -> JsonRpcClient<CannedTransport> {
        let url = Url::parse("https://kbase.us/services/pangenome_api").unwrap();
        JsonRpcClient::new(url, transport)
    }

    #[tokio::test]
    async fn test_echo_round_trip_keeps_unknown_fields() {
        let client = client(CannedTransport::echo());
        let param: Location = serde_json::from_value(json!({
            "contig_id": "contig_1",
            "start": 10,
            "strand": "-",
            "length": 300,
            "codon_start": 2
        }))
        .unwrap();

        let result: Location = client.call("PanGenomeAPI.echo", &param, None).await.unwrap();

        assert_eq!(result, param);
        assert_eq!(result.additional_properties()["codon_start"], json!(2));
    }

    #[tokio::test]
    async fn test_single_param_envelope() {
        let client = client(CannedTransport::result(json!({})));
        let param = Location::builder().contig_id("c").build();

        let _: Value = client.call("PanGenomeAPI.op", &param, None).await.unwrap();

        let envelope = client.transport().last_envelope();
        assert_eq!(envelope["method"], "PanGenomeAPI.op");
        assert_eq!(envelope["params"], json!([{ "contig_id": "c" }]));
        assert!(envelope.get("context").is_none());
    }

    #[tokio::test]
    async fn test_pinned_version_is_transmitted() {
        let mut client = client(CannedTransport::result(json!({})));
        client.set_service_version(Some("release".to_string()));

        let context = RpcContext::builder()
            .run_id("run-1")
            .service_ver("dev")
            .build();
        let _: Value = client
            .call("PanGenomeAPI.op", &json!({}), Some(context))
            .await
            .unwrap();

        let envelope = client.transport().last_envelope();
        assert_eq!(
            envelope["context"],
            json!({ "run_id": "run-1", "service_ver": "release" })
        );
    }

    #[tokio::test]
    async fn test_call_without_params_sends_empty_list() {
        let client = client(CannedTransport::result(json!({ "state": "OK" })));

        let status: serde_json::Map<String, Value> = client
            .call_without_params("PanGenomeAPI.status", None)
            .await
            .unwrap();

        assert_eq!(status["state"], "OK");
        assert_eq!(client.transport().last_envelope()["params"], json!([]));
    }

    #[tokio::test]
    async fn test_streaming_transport_receives_spooled_file() {
        let mut client = client(CannedTransport::result(json!({ "state": "OK" })).streaming());
        client.set_service_version(Some("dev".to_string()));

        let param = Location::builder().contig_id("contig_1").build();
        let _: Value = client
            .call("PanGenomeAPI.op", &param, None)
            .await
            .unwrap();

        let paths = client.transport().file_paths();
        assert_eq!(paths.len(), 1);
        assert!(!paths[0].exists());

        let envelope = client.transport().last_envelope();
        assert_eq!(envelope["method"], "PanGenomeAPI.op");
        assert_eq!(envelope["params"], json!([{ "contig_id": "contig_1" }]));
        assert_eq!(envelope["context"]["service_ver"], "dev");
    }

    #[tokio::test]
    async fn test_buffered_transport_never_spools() {
        let client = client(CannedTransport::result(json!({})));

        let _: Value = client.call("PanGenomeAPI.op", &json!({}), None).await.unwrap();

        assert!(client.transport().file_paths().is_empty());
        assert_eq!(client.transport().request_count(), 1);
    }

    #[tokio::test]
    async fn test_remote_fault_is_kept_verbatim() {
        let client = client(CannedTransport::json(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "version": "1.1",
                "error": {
                    "name": "Server error",
                    "code": -32000,
                    "message": "Object 7/1/1 cannot be accessed",
                    "error": "trace"
                }
            }),
        ));

        let err = client
            .call::<_, Value>("PanGenomeAPI.op", &json!({}), None)
            .await
            .unwrap_err();

        let fault = err.remote().expect("expected a remote fault");
        assert_eq!(fault.code, -32000);
        assert_eq!(fault.message, "Object 7/1/1 cannot be accessed");
        assert_eq!(fault.trace.as_deref(), Some("trace"));
        assert!(!err.is_authorization());
    }

    #[tokio::test]
    async fn test_bad_cardinality_is_protocol_violation() {
        for result in [json!([]), json!([{}, {}])] {
            let client = client(CannedTransport::json(
                StatusCode::OK,
                json!({ "result": result }),
            ));

            let err = client
                .call::<_, Value>("PanGenomeAPI.op", &json!({}), None)
                .await
                .unwrap_err();

            assert!(matches!(
                err,
                CallError::Protocol(ProtocolError::Codec(CodecError::ResultCardinality(_)))
            ));
        }
    }

    #[tokio::test]
    async fn test_unauthorized_status() {
        let client = client(CannedTransport::raw(StatusCode::UNAUTHORIZED, "bad token"));

        let err = client
            .call::<_, Value>("PanGenomeAPI.op", &json!({}), None)
            .await
            .unwrap_err();

        assert!(err.is_authorization());
        assert!(matches!(
            err,
            CallError::Unauthorized { status: StatusCode::UNAUTHORIZED, ref message } if message == "bad token"
        ));
    }

    #[tokio::test]
    async fn test_unexpected_status_without_envelope() {
        let client = client(CannedTransport::raw(
            StatusCode::BAD_GATEWAY,
            "<html>Bad Gateway</html>",
        ));

        let err = client
            .call::<_, Value>("PanGenomeAPI.op", &json!({}), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CallError::Protocol(ProtocolError::UnexpectedStatus {
                status: StatusCode::BAD_GATEWAY,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_retried() {
        let client = client(CannedTransport::failing(TransportError::UnsupportedScheme(
            "test".to_string(),
        )));

        let err = client
            .call::<_, Value>("PanGenomeAPI.op", &json!({}), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CallError::Transport(_)));
        assert_eq!(client.transport().request_count(), 1);
    }

    #[tokio::test]
    async fn test_result_type_mismatch() {
        let client = client(CannedTransport::result(json!({ "start": "not a number" })));

        let err = client
            .call::<_, Location>("PanGenomeAPI.op", &json!({}), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CallError::Protocol(ProtocolError::Codec(CodecError::ResultType(_)))
        ));
    }

    #[test]
    fn test_body_excerpt_truncates() {
        let long = "x".repeat(MAX_BODY_EXCERPT + 10);
        let excerpt = body_excerpt(long.as_bytes());
        assert_eq!(excerpt.len(), MAX_BODY_EXCERPT + 3);
        assert!(excerpt.ends_with("..."));
    }
}
