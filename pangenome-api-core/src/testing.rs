//! In-memory [`Transport`] doubles for unit tests.
use crate::transport::{HttpRequest, HttpResponse, RequestBody, Transport, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde_json::{Value, json};
use std::{path::PathBuf, sync::Mutex};

enum Reply {
    Fixed(StatusCode, Bytes),
    /// Answers with the first request parameter as the single result.
    Echo,
    Fail(Mutex<Option<TransportError>>),
}

pub(crate) struct CannedTransport {
    reply: Reply,
    streaming: bool,
    /// Request bodies as received. File bodies are read at send time.
    bodies: Mutex<Vec<Bytes>>,
    file_paths: Mutex<Vec<PathBuf>>,
}

impl CannedTransport {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            streaming: false,
            bodies: Mutex::new(Vec::new()),
            file_paths: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn json(status: StatusCode, body: Value) -> Self {
        Self::raw(status, serde_json::to_vec(&body).unwrap())
    }

    pub(crate) fn raw(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::with_reply(Reply::Fixed(status, body.into()))
    }

    pub(crate) fn result(result: Value) -> Self {
        Self::json(StatusCode::OK, json!({ "version": "1.1", "result": [result] }))
    }

    pub(crate) fn echo() -> Self {
        Self::with_reply(Reply::Echo)
    }

    pub(crate) fn failing(error: TransportError) -> Self {
        Self::with_reply(Reply::Fail(Mutex::new(Some(error))))
    }

    /// Asks callers to send bodies from disk.
    pub(crate) fn streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    pub(crate) fn request_count(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }

    /// Paths of every file body received, in order.
    pub(crate) fn file_paths(&self) -> Vec<PathBuf> {
        self.file_paths.lock().unwrap().clone()
    }

    /// The JSON envelope of the last request sent.
    pub(crate) fn last_envelope(&self) -> Value {
        let bodies = self.bodies.lock().unwrap();
        serde_json::from_slice(bodies.last().expect("no request was sent")).unwrap()
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let body = match request.body {
            RequestBody::Buffered(bytes) => bytes,
            RequestBody::File(path) => {
                let bytes = std::fs::read(&path).unwrap();
                self.file_paths.lock().unwrap().push(path);
                Bytes::from(bytes)
            }
        };
        self.bodies.lock().unwrap().push(body);

        let (status, body) = match &self.reply {
            Reply::Fixed(status, body) => (*status, body.clone()),
            Reply::Echo => {
                let envelope = self.last_envelope();
                let reply = json!({ "id": envelope["id"], "result": [envelope["params"][0]] });
                (StatusCode::OK, Bytes::from(serde_json::to_vec(&reply).unwrap()))
            }
            Reply::Fail(error) => {
                return Err(error
                    .lock()
                    .unwrap()
                    .take()
                    .expect("failing transport used twice"));
            }
        };

        Ok(HttpResponse {
            status,
            headers: HeaderMap::new(),
            body,
        })
    }

    fn streams_request_bodies(&self) -> bool {
        self.streaming
    }
}
