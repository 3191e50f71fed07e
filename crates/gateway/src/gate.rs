//! Connection admission: at most one active client at a time.
//!
//! States are `Idle` (no recorded handle) and `Active` (one recorded
//! handle). All transitions go through one exclusive lock around the
//! recorded handle; the lock is only held for the check/update itself and
//! never across an outbound call.
//!
//! A connection is admitted at handshake time without becoming active; it
//! only occupies the gate once its ready transition records a handle. A
//! close for anything other than the recorded handle is a defensive no-op.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::info;

/// Opaque connection handle. Ids are process-unique and never reused.
pub type ConnectionHandle = u64;

#[derive(Debug, Default)]
pub struct ConnectionGate {
    active: Mutex<Option<ConnectionHandle>>,
    next_id: AtomicU64,
}

impl ConnectionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handshake check. Returns false (reject) while a connection is
    /// active; accepting does not change state.
    pub fn try_admit(&self) -> bool {
        let active = self.active.lock().expect("gate lock poisoned");
        if active.is_some() {
            info!("Rejecting new connection: an active connection already exists");
            return false;
        }
        info!("New connection authorized, waiting for ready");
        true
    }

    /// Allocates a fresh handle for an upgraded connection.
    pub fn next_handle(&self) -> ConnectionHandle {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Ready transition: records `handle` as the active connection.
    pub fn activate(&self, handle: ConnectionHandle) {
        let mut active = self.active.lock().expect("gate lock poisoned");
        *active = Some(handle);
    }

    /// Data-frame guard: only the recorded handle may be processed.
    pub fn is_active(&self, handle: ConnectionHandle) -> bool {
        *self.active.lock().expect("gate lock poisoned") == Some(handle)
    }

    /// Close transition. Clears the gate only when `handle` is the recorded
    /// one; returns whether anything was released.
    pub fn release(&self, handle: ConnectionHandle) -> bool {
        let mut active = self.active.lock().expect("gate lock poisoned");
        if *active == Some(handle) {
            *active = None;
            info!(handle, "Active connection cleared, accepting new connections");
            true
        } else {
            false
        }
    }
}
