//! Background decode dispatch.
//!
//! A [`WorkerFarm`] hands [`MeshRequest`]s to a single dedicated worker and
//! correlates asynchronous responses back to their callers by task id:
//!
//! - every dispatch takes a fresh id from an instance counter and parks a
//!   oneshot sender in the pending table under that id;
//! - the worker decodes tasks serially, in dispatch order, and posts
//!   `{id, payload}` or `{id, err}` responses;
//! - the router removes the pending entry and completes the caller exactly
//!   once, in whatever order responses arrive.
//!
//! There is no per-task priority, cancellation or timeout: a dispatched
//! task runs to completion or the farm is gone. All correlation state is
//! owned by the farm instance, so independent farms can coexist.

mod protocol;

pub use protocol::{TaskEnvelope, TaskResponse};

use crate::mesh::{decode_mesh, MeshPayload, MeshRequest};
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type PendingTable = Arc<DashMap<u64, oneshot::Sender<Result<MeshPayload, FarmError>>>>;

/// Errors surfaced to a caller awaiting a dispatched task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FarmError {
    /// The worker reported a decode failure.
    Decode(String),
    /// The response carried neither payload nor error.
    EmptyResponse,
    /// The worker is no longer running.
    WorkerGone,
}

impl fmt::Display for FarmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FarmError::Decode(msg) => write!(f, "Decode failed: {}", msg),
            FarmError::EmptyResponse => write!(f, "Task response carried no result"),
            FarmError::WorkerGone => write!(f, "Decode worker is gone"),
        }
    }
}

impl std::error::Error for FarmError {}

/// Dispatches decode tasks to a dedicated background worker.
pub struct WorkerFarm {
    next_id: AtomicU64,
    pending: PendingTable,
    task_tx: mpsc::UnboundedSender<TaskEnvelope>,
    shutdown: CancellationToken,
}

impl WorkerFarm {
    /// Spawns the decode worker and its response router.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> Self {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let pending: PendingTable = Arc::new(DashMap::new());
        let shutdown = CancellationToken::new();

        tokio::task::spawn_blocking(move || worker_loop(task_rx, response_tx));
        tokio::spawn(route_responses(
            response_rx,
            Arc::clone(&pending),
            shutdown.clone(),
        ));

        Self {
            next_id: AtomicU64::new(0),
            pending,
            task_tx,
            shutdown,
        }
    }

    /// Dispatches one decode task and waits for its result.
    ///
    /// The pixel buffer inside `request` is moved to the worker, not
    /// copied. Concurrent callers are resolved independently by task id;
    /// completion order follows the worker, not the callers.
    pub async fn schedule(&self, request: MeshRequest) -> Result<MeshPayload, FarmError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (result_tx, result_rx) = oneshot::channel();
        self.pending.insert(id, result_tx);

        if self.task_tx.send(TaskEnvelope { id, request }).is_err() {
            self.pending.remove(&id);
            return Err(FarmError::WorkerGone);
        }

        match result_rx.await {
            Ok(result) => result,
            Err(_) => Err(FarmError::WorkerGone),
        }
    }

    /// Number of dispatched tasks not yet resolved.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Stops the response router; callers still waiting observe
    /// [`FarmError::WorkerGone`] once the farm is dropped.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Default for WorkerFarm {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorkerFarm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Runs decode tasks serially until the request channel closes.
fn worker_loop(
    mut task_rx: mpsc::UnboundedReceiver<TaskEnvelope>,
    response_tx: mpsc::UnboundedSender<TaskResponse>,
) {
    while let Some(TaskEnvelope { id, request }) = task_rx.blocking_recv() {
        let response = match decode_mesh(&request) {
            Ok(payload) => TaskResponse::success(id, payload),
            Err(e) => TaskResponse::failure(id, e.to_string()),
        };
        if response_tx.send(response).is_err() {
            break; // router gone, nobody left to deliver to
        }
    }
}

/// Resolves pending tasks as responses arrive.
async fn route_responses(
    mut response_rx: mpsc::UnboundedReceiver<TaskResponse>,
    pending: PendingTable,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            response = response_rx.recv() => match response {
                Some(response) => resolve(&pending, response),
                None => break,
            },
        }
    }
}

/// Completes at most one pending task for `response`.
fn resolve(pending: &DashMap<u64, oneshot::Sender<Result<MeshPayload, FarmError>>>, response: TaskResponse) {
    let TaskResponse { id, payload, err } = response;
    let Some((_, sender)) = pending.remove(&id) else {
        debug!(id, "response for unknown task id, dropping");
        return;
    };
    let result = match (payload, err) {
        (Some(payload), _) => Ok(payload),
        (None, Some(err)) => Err(FarmError::Decode(err)),
        (None, None) => {
            warn!(id, "task response carried neither payload nor error");
            Err(FarmError::EmptyResponse)
        }
    };
    // the caller may have gone away; that is not the router's problem
    let _ = sender.send(result);
}
