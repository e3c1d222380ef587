//! # Mock Service
//!
//! **INTERNAL USE ONLY**: This crate exists solely to provide a JSON-RPC server standing in
//! for the PanGenomeAPI service in integration tests of `pangenome-api-core` and the
//! `pangenome` CLI. It is not intended for production use.
//!
//! The server binds an ephemeral port on the loopback interface, answers every POST with
//! a canned [`Reply`] and records what it received. [`MockService::start_tls`] serves the
//! same over https with a self-signed certificate for `localhost` and `127.0.0.1`.
use axum::{
    Router,
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use serde_json::{Value, json};
use std::{
    io,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{net::TcpListener, task::JoinHandle};

/// Self-signed certificate served by [`MockService::start_tls`].
pub const CERTIFICATE_PEM: &[u8] = include_bytes!("../certs/localhost.pem");
const PRIVATE_KEY_PEM: &[u8] = include_bytes!("../certs/localhost-key.pem");

#[derive(Debug, Clone)]
enum ReplyBody {
    Fixed(Bytes),
    /// The first request parameter becomes the single result.
    Echo,
}

/// What the server answers with.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    body: ReplyBody,
    delay: Option<Duration>,
}

impl Reply {
    /// A successful envelope wrapping `result` as the single element.
    pub fn result(result: Value) -> Self {
        Self::json(200, json!({ "version": "1.1", "result": [result] }))
    }

    /// A JSON-RPC error envelope.
    pub fn fault(status: u16, code: i64, message: &str, trace: &str) -> Self {
        Self::json(
            status,
            json!({
                "version": "1.1",
                "error": {
                    "name": "JSONRPCError",
                    "code": code,
                    "message": message,
                    "error": trace
                }
            }),
        )
    }

    pub fn json(status: u16, body: Value) -> Self {
        Self::raw(status, body.to_string())
    }

    pub fn raw(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: ReplyBody::Fixed(body.into()),
            delay: None,
        }
    }

    pub fn echo() -> Self {
        Self {
            status: StatusCode::OK,
            body: ReplyBody::Echo,
            delay: None,
        }
    }

    /// Waits `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// One request as seen by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Client end of the connection the request arrived on.
    pub peer: SocketAddr,
    pub body: Bytes,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub transfer_encoding: Option<String>,
}

impl RecordedRequest {
    /// The body parsed as JSON, `Value::Null` when it is not JSON.
    pub fn envelope(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

struct Shared {
    reply: Reply,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Shared {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }
}

fn router(shared: Arc<Shared>) -> Router {
    Router::new().route("/", post(handle)).with_state(shared)
}

pub struct MockService {
    url: String,
    shared: Arc<Shared>,
    server: JoinHandle<()>,
}

impl MockService {
    /// Starts a server on `127.0.0.1` that answers every call with `reply`.
    pub async fn start(reply: Reply) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let shared = Shared::new(reply);
        let app = router(shared.clone());

        let server = tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        Ok(Self {
            url: format!("http://{addr}/"),
            shared,
            server,
        })
    }

    /// Like [`MockService::start`], over https.
    pub async fn start_tls(reply: Reply) -> io::Result<Self> {
        // Fails only when a provider is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let config = RustlsConfig::from_pem(CERTIFICATE_PEM.to_vec(), PRIVATE_KEY_PEM.to_vec())
            .await?;

        let shared = Shared::new(reply);
        let app = router(shared.clone());

        let handle = Handle::new();
        let listening = handle.clone();
        let server = tokio::spawn(async move {
            let _ = axum_server::bind_rustls(SocketAddr::from(([127, 0, 0, 1], 0)), config)
                .handle(handle)
                .serve(app.into_make_service_with_connect_info::<SocketAddr>())
                .await;
        });

        let addr = listening
            .listening()
            .await
            .ok_or_else(|| io::Error::other("tls mock service failed to bind"))?;

        Ok(Self {
            url: format!("https://{addr}/"),
            shared,
            server,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Everything received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        match self.shared.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    let recorded = RecordedRequest {
        peer,
        body: body.clone(),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        transfer_encoding: header_value(header::TRANSFER_ENCODING),
    };

    if let Ok(mut requests) = shared.requests.lock() {
        requests.push(recorded);
    }

    let reply = &shared.reply;
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let body = match &reply.body {
        ReplyBody::Fixed(bytes) => bytes.clone(),
        ReplyBody::Echo => {
            let envelope: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            let result = envelope["params"].get(0).cloned().unwrap_or(Value::Null);
            Bytes::from(
                json!({ "version": "1.1", "id": envelope["id"], "result": [result] }).to_string(),
            )
        }
    };

    (
        reply.status,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
