use std::sync::Arc;
use std::time::Duration;

use crate::state::AppState;

/// Spawn a task that reconciles the phase deadline every `interval`, so an
/// expired phase advances even when nobody is sending requests.
pub fn spawn_deadline_watcher(state: Arc<AppState>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Some(phase) = state.reconcile().await {
                tracing::debug!(%phase, "Deadline watcher advanced phase");
            }
        }
    })
}
