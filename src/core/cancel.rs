//! How a relayed stream ended.
//!
//! The relay body and its drop guard race to record an outcome: the body when
//! the upstream finishes or fails, the guard when hyper drops the body early.
//! Whichever settles first wins.

use std::sync::Arc;
use tokio::sync::watch;

/// Terminal state of a streamed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Still relaying
    Streaming,
    /// Upstream ended cleanly and every fragment was handed to hyper
    Completed,
    /// Upstream broke mid-stream
    Failed,
    /// Client went away first
    Disconnected,
}

/// Shared, settle-once record of a stream's outcome.
#[derive(Clone)]
pub struct StreamCancelHandle {
    state: Arc<watch::Sender<StreamOutcome>>,
}

impl StreamCancelHandle {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(StreamOutcome::Streaming);
        Self {
            state: Arc::new(sender),
        }
    }

    /// Record `outcome` if nothing has been recorded yet.
    ///
    /// Returns `true` when this call settled the stream.
    pub fn settle(&self, outcome: StreamOutcome) -> bool {
        self.state.send_if_modified(|current| {
            if *current == StreamOutcome::Streaming && outcome != StreamOutcome::Streaming {
                *current = outcome;
                true
            } else {
                false
            }
        })
    }

    pub fn outcome(&self) -> StreamOutcome {
        *self.state.borrow()
    }
}

impl Default for StreamCancelHandle {
    fn default() -> Self {
        Self::new()
    }
}
