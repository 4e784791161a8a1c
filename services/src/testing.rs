//! Scripted transport for tests of the backend clients.

use std::sync::{Arc, Mutex};

use crate::http::{BoxFuture, HttpRequest, HttpResponse, Transport, TransportError};

type Handler = dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync;

/// Transport that answers every request with a closure and records the calls.
#[derive(Clone)]
pub struct ScriptedTransport {
    handler: Arc<Handler>,
    calls: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub fn new(handler: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answers with the same status and body.
    pub fn replying(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::new(move |_| HttpResponse::new(status, body.clone()))
    }

    /// Snapshot of every request seen so far.
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Calls rendered as `"METHOD path"`.
    pub fn routes(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        let resp = (self.handler)(&request).for_request(&request.method, request.path.clone());
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request);
        }
        Box::pin(async move { Ok(resp) })
    }
}
