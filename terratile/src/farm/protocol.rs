//! Messages crossing the worker boundary.

use crate::mesh::{MeshPayload, MeshRequest};

/// A decode task on its way to the worker.
#[derive(Debug)]
pub struct TaskEnvelope {
    /// Correlation id, unique per farm and never reused while pending.
    pub id: u64,
    /// The decode request; its pixel buffer is moved, not copied.
    pub request: MeshRequest,
}

/// A completed task on its way back to the dispatcher.
///
/// Exactly one of `payload` and `err` is set by a conforming worker; the
/// router treats a response with neither as a protocol failure.
#[derive(Debug)]
pub struct TaskResponse {
    pub id: u64,
    pub payload: Option<MeshPayload>,
    pub err: Option<String>,
}

impl TaskResponse {
    /// Response carrying a decoded mesh.
    pub fn success(id: u64, payload: MeshPayload) -> Self {
        Self {
            id,
            payload: Some(payload),
            err: None,
        }
    }

    /// Response carrying a decode failure.
    pub fn failure(id: u64, err: impl Into<String>) -> Self {
        Self {
            id,
            payload: None,
            err: Some(err.into()),
        }
    }
}
