use crate::metrics_store::MetricsStore;
use crate::roster_store::RosterStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Context provided to jobs during execution.
///
/// Contains references to the shared stores and a cancellation token for
/// graceful shutdown handling.
#[derive(Clone)]
pub struct JobContext {
    /// Token to check for cancellation/shutdown requests.
    pub cancellation_token: CancellationToken,

    /// Access to the artist roster and its Spotify identity mapping.
    pub roster_store: Arc<dyn RosterStore>,

    /// Access to the metric time series.
    pub metrics_store: Arc<dyn MetricsStore>,
}

impl JobContext {
    pub fn new(
        cancellation_token: CancellationToken,
        roster_store: Arc<dyn RosterStore>,
        metrics_store: Arc<dyn MetricsStore>,
    ) -> Self {
        Self {
            cancellation_token,
            roster_store,
            metrics_store,
        }
    }

    /// Check if cancellation has been requested.
    ///
    /// Jobs should periodically check this during long-running operations
    /// and return early with `JobError::Cancelled` if true.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
