//! Periodic replenishment runs

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::error::AppResult;
use crate::services::{run_replenishment, RunSummary};
use crate::AppState;

/// Start the replenishment schedule if enabled in configuration
pub fn spawn_replenishment_schedule(state: AppState) -> Option<JoinHandle<()>> {
    let settings = state.config.scheduler.clone();
    if !settings.enabled {
        tracing::info!("Replenishment scheduler disabled");
        return None;
    }

    let period = match settings.period() {
        Ok(period) => period,
        Err(e) => {
            tracing::error!("Replenishment scheduler not started: {}", e);
            return None;
        }
    };
    tracing::info!(
        "Replenishment scheduled every {} hour(s), run on startup: {}",
        settings.interval_hours,
        settings.run_on_startup
    );

    Some(spawn_periodic(period, settings.run_on_startup, move || {
        let state = state.clone();
        async move { run_replenishment(&state).await }
    }))
}

/// Run `job` every `period`. Failures are logged and the loop continues.
pub fn spawn_periodic<F, Fut>(period: Duration, run_on_startup: bool, job: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = AppResult<RunSummary>> + Send + 'static,
{
    tokio::spawn(async move {
        let start = if run_on_startup {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match job().await {
                Ok(summary) => tracing::info!(
                    "Scheduled replenishment run {} completed ({} flagged)",
                    summary.run_id,
                    summary.items_flagged
                ),
                Err(e) => tracing::error!("Scheduled replenishment run failed: {}", e),
            }
        }
    })
}
