//! In-memory snapshot transport for tests.

use crate::gateway::{GatewayError, SnapshotTransport};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Scripted {
    Body(String),
    Delayed(String, Duration),
    Fail,
    Hang,
}

/// Scripted per-URI responses. Unscripted URIs fail like an unreachable host.
#[derive(Debug, Default)]
pub struct StubTransport {
    routes: HashMap<String, Scripted>,
    calls: AtomicUsize,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, uri: &str, body: &str) -> Self {
        self.routes
            .insert(uri.to_string(), Scripted::Body(body.to_string()));
        self
    }

    /// Respond after `delay` has elapsed.
    pub fn respond_after(mut self, uri: &str, body: &str, delay: Duration) -> Self {
        self.routes
            .insert(uri.to_string(), Scripted::Delayed(body.to_string(), delay));
        self
    }

    pub fn fail(mut self, uri: &str) -> Self {
        self.routes.insert(uri.to_string(), Scripted::Fail);
        self
    }

    /// Never respond.
    pub fn hang(mut self, uri: &str) -> Self {
        self.routes.insert(uri.to_string(), Scripted::Hang);
        self
    }

    /// Number of requests served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotTransport for StubTransport {
    async fn get(&self, uri: &str) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.routes.get(uri).cloned() {
            Some(Scripted::Body(body)) => Ok(body),
            Some(Scripted::Delayed(body, delay)) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
            Some(Scripted::Hang) => std::future::pending().await,
            Some(Scripted::Fail) | None => Err(GatewayError::Transport {
                uri: uri.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}
