use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::state::AppState;

/// Scheduled pipeline: score, generate, digest, sleep. A failed stage is
/// logged and the remaining stages still run. Configuration overrides are
/// reloaded at the top of every iteration.
pub async fn run_pipeline_loop(state: Arc<AppState>, interval_hours: u64) {
    info!(interval_hours, "Pipeline loop started");
    loop {
        run_one_cycle(&state).await;
        tokio::time::sleep(Duration::from_secs(interval_hours * 3600)).await;
    }
}

async fn run_one_cycle(state: &AppState) {
    let config = match state.store.load_snapshot().await {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration snapshot, skipping cycle");
            return;
        }
    };

    if let Err(e) = state.scorer.run_cycle(&config).await {
        error!(error = %e, "Scoring cycle failed");
    }
    if let Err(e) = state.orchestrator.run_cycle(&config).await {
        error!(error = %e, "Generation cycle failed");
    }
    if let Err(e) = state.digests.send_pending().await {
        error!(error = %e, "Digest delivery failed");
    }
}
