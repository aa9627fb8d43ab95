//! Periodic forced refresh of the tracked cities.

use crate::dashboard::Dashboard;
use common::models::RefreshSummary;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span};

/// Shortest period the loop accepts; `tokio::time::interval` rejects zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle for the background refresh task.
///
/// Stopping it prevents further cycles; requests of a cycle that is already
/// running are allowed to complete.
pub struct RefreshHandle {
    cancel: CancellationToken,
    summaries: watch::Receiver<Option<RefreshSummary>>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Spawn the refresh loop. The first cycle runs one `period` after start.
    pub fn spawn(dashboard: Arc<Dashboard>, period: Duration, cancel: CancellationToken) -> Self {
        let period = period.max(MIN_PERIOD);
        let (summary_tx, summary_rx) = watch::channel(None);
        let token = cancel.clone();

        let task = tokio::spawn(
            async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                // Skip the first tick (immediate)
                interval.tick().await;

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            let summary = dashboard.refresh_all(true).await;
                            let _ = summary_tx.send(Some(summary));
                        }
                        _ = token.cancelled() => {
                            break;
                        }
                    }
                }

                info!("Refresh loop stopped");
            }
            .instrument(info_span!("refresh_loop", period_secs = period.as_secs_f64())),
        );

        info!(period_secs = period.as_secs_f64(), "Refresh loop started");

        Self {
            cancel,
            summaries: summary_rx,
            task,
        }
    }

    /// Receiver that sees the summary of every completed cycle.
    pub fn subscribe(&self) -> watch::Receiver<Option<RefreshSummary>> {
        self.summaries.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop scheduling cycles and wait for the loop to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}
