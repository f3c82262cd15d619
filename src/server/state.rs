//! Shared process-lifetime state
//!
//! One `ServerState` is created per process and handed by `Arc` to the
//! dispatcher and to every spawned hover worker.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::config::ServerMode;
use crate::protocol::RequestId;

/// First id minted for server-initiated requests; high enough to stay
/// disjoint from client-chosen ids.
pub const SERVER_REQUEST_ID_BASE: i64 = 9000;

pub struct ServerState {
    mode: ServerMode,
    /// Request ids the peer asked to cancel. Written by the dispatch
    /// task, read by hover workers; entries are never removed.
    cancelled: Mutex<HashSet<i64>>,
    next_request_id: AtomicI64,
    exit_flag: AtomicBool,
    startup_progress_sent: AtomicBool,
}

impl ServerState {
    pub fn new(mode: ServerMode) -> Self {
        Self {
            mode,
            cancelled: Mutex::new(HashSet::new()),
            next_request_id: AtomicI64::new(SERVER_REQUEST_ID_BASE),
            exit_flag: AtomicBool::new(false),
            startup_progress_sent: AtomicBool::new(false),
        }
    }

    pub fn mode(&self) -> ServerMode {
        self.mode
    }

    /// Record a cancellation for `id`.
    pub fn mark_cancelled(&self, id: i64) {
        self.cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
    }

    /// Whether `id` has received a cancellation.
    pub fn is_cancelled(&self, id: i64) -> bool {
        self.cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    /// Mint the next server-initiated request id.
    pub fn next_server_request_id(&self) -> RequestId {
        RequestId::Number(self.next_request_id.fetch_add(1, Ordering::SeqCst))
    }

    pub fn request_exit(&self) {
        self.exit_flag.store(true, Ordering::SeqCst);
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_flag.load(Ordering::SeqCst)
    }

    /// True the first time it is called. The startup progress sequence
    /// runs at most once per process.
    pub fn claim_startup_progress(&self) -> bool {
        !self.startup_progress_sent.swap(true, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellations_are_visible_after_marking() {
        let state = ServerState::new(ServerMode::Normal);
        assert!(!state.is_cancelled(7));
        state.mark_cancelled(7);
        assert!(state.is_cancelled(7));
        assert!(!state.is_cancelled(8));
    }

    #[test]
    fn server_request_ids_start_high_and_increment() {
        let state = ServerState::new(ServerMode::Normal);
        assert_eq!(
            state.next_server_request_id(),
            RequestId::Number(SERVER_REQUEST_ID_BASE)
        );
        assert_eq!(
            state.next_server_request_id(),
            RequestId::Number(SERVER_REQUEST_ID_BASE + 1)
        );
    }

    #[test]
    fn startup_progress_is_claimed_once() {
        let state = ServerState::new(ServerMode::Normal);
        assert!(state.claim_startup_progress());
        assert!(!state.claim_startup_progress());
        assert!(!state.claim_startup_progress());
    }

    #[test]
    fn exit_flag_latches() {
        let state = ServerState::new(ServerMode::Normal);
        assert!(!state.exit_requested());
        state.request_exit();
        assert!(state.exit_requested());
    }
}
