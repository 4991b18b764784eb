use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use iothub_service_core::{Error, HttpSend, Result};

/// A request as seen by the transport.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug)]
enum Scripted {
    Response(u16, String),
    TransportError,
}

#[derive(Debug, Default)]
struct State {
    script: VecDeque<Scripted>,
    requests: Vec<RecordedRequest>,
}

/// MockHttpSend records every request and replays scripted responses in order.
#[derive(Debug, Clone, Default)]
pub struct MockHttpSend {
    state: Arc<Mutex<State>>,
}

impl MockHttpSend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .script
            .push_back(Scripted::Response(status, body.to_string()));
        self
    }

    pub fn fail(self) -> Self {
        self.state
            .lock()
            .unwrap()
            .script
            .push_back(Scripted::TransportError);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let mut state = self.state.lock().unwrap();
        let (parts, body) = req.into_parts();
        state.requests.push(RecordedRequest {
            method: parts.method,
            uri: parts.uri.to_string(),
            headers: parts.headers,
            body,
        });

        match state.script.pop_front() {
            Some(Scripted::Response(status, body)) => Ok(http::Response::builder()
                .status(status)
                .body(Bytes::from(body))
                .unwrap()),
            Some(Scripted::TransportError) => Err(Error::http_api("connection refused")),
            None => Err(Error::http_api("no scripted response left")),
        }
    }
}
