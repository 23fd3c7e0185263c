//! Background worker that owns the registry.
//!
//! Dokku calls can take seconds (especially over ssh), so the dashboard
//! never runs them itself. It submits [`Request`]s to a single worker
//! thread, which applies them one at a time in submission order and sends
//! back an [`Update`] carrying a fresh [`Snapshot`] after each. Because only
//! that thread touches the registry, backend commands never interleave.

use crate::models::Snapshot;
use crate::registry::Registry;
use crate::{Error, Result};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// An operation for the worker to run against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Refresh,
    CreateApp(String),
    DestroyApp(String),
    AddDomain { app: String, domain: String },
    SetConfig { app: String, key: String, value: String },
    UnsetConfig { app: String, key: String },
    ClearHistory,
}

impl Request {
    /// Short description for status messages.
    pub fn describe(&self) -> String {
        match self {
            Request::Refresh => "Refreshing apps".to_string(),
            Request::CreateApp(name) => format!("Creating app {}", name),
            Request::DestroyApp(name) => format!("Destroying app {}", name),
            Request::AddDomain { app, domain } => format!("Adding domain {} to {}", domain, app),
            Request::SetConfig { app, key, .. } => format!("Setting {} on {}", key, app),
            Request::UnsetConfig { app, key } => format!("Unsetting {} on {}", key, app),
            Request::ClearHistory => "Clearing history".to_string(),
        }
    }

    fn apply(&self, registry: &mut Registry) -> Result<()> {
        match self {
            Request::Refresh => registry.refresh(),
            Request::CreateApp(name) => registry.create_app(name),
            Request::DestroyApp(name) => registry.destroy_app(name),
            Request::AddDomain { app, domain } => registry.add_domain(app, domain),
            Request::SetConfig { app, key, value } => registry.set_config(app, key, value),
            Request::UnsetConfig { app, key } => registry.unset_config(app, key),
            Request::ClearHistory => {
                registry.clear_history();
                Ok(())
            }
        }
    }
}

/// Completion notice for one request.
#[derive(Debug)]
pub struct Update {
    pub request: Request,
    pub result: Result<()>,
    /// Registry state right after the request finished
    pub snapshot: Snapshot,
}

/// Handle to the worker thread.
///
/// Dropping the handle closes the request channel and blocks until the
/// thread has worked through every request already queued.
pub struct Worker {
    requests: Option<Sender<Request>>,
    updates: Receiver<Update>,
    handle: Option<JoinHandle<()>>,
    pending: usize,
}

impl Worker {
    /// Move `registry` onto a new worker thread.
    pub fn spawn(mut registry: Registry) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<Request>();
        let (update_tx, update_rx) = mpsc::channel::<Update>();

        let handle = thread::Builder::new()
            .name("lazydokku-worker".to_string())
            .spawn(move || {
                for request in request_rx {
                    tracing::debug!(request = ?request, "worker processing request");
                    let result = request.apply(&mut registry);
                    if let Err(e) = &result {
                        tracing::warn!(request = ?request, error = %e, "request failed");
                    }
                    let update = Update {
                        request,
                        result,
                        snapshot: registry.snapshot(),
                    };
                    if update_tx.send(update).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            requests: Some(request_tx),
            updates: update_rx,
            handle: Some(handle),
            pending: 0,
        })
    }

    /// Queue a request behind any already submitted.
    pub fn submit(&mut self, request: Request) -> Result<()> {
        let sender = self
            .requests
            .as_ref()
            .ok_or_else(|| Error::Other("worker has shut down".to_string()))?;
        sender
            .send(request)
            .map_err(|_| Error::Other("worker has shut down".to_string()))?;
        self.pending += 1;
        Ok(())
    }

    /// Next finished request, if one is ready.
    pub fn try_recv(&mut self) -> Option<Update> {
        let update = self.updates.try_recv().ok()?;
        self.pending = self.pending.saturating_sub(1);
        Some(update)
    }

    /// Wait up to `timeout` for the next finished request.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<Update> {
        match self.updates.recv_timeout(timeout) {
            Ok(update) => {
                self.pending = self.pending.saturating_sub(1);
                Some(update)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Submit a request and block until it completes.
    pub fn run(&mut self, request: Request) -> Result<Update> {
        self.submit(request)?;
        while self.pending > 1 {
            self.updates
                .recv()
                .map_err(|_| Error::Other("worker has shut down".to_string()))?;
            self.pending -= 1;
        }
        let update = self
            .updates
            .recv()
            .map_err(|_| Error::Other("worker has shut down".to_string()))?;
        self.pending -= 1;
        Ok(update)
    }

    /// Whether any submitted request has not reported back yet.
    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
