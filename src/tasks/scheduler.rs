use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{interval, Duration};

use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::SubmitReason;
use crate::repositories;
use crate::services::session_backend::production_flow;

const SWEEP_BATCH_LIMIT: i64 = 200;

/// Periodic safety net behind the per-session deadline watches: finalizes
/// sessions whose deadline plus grace passed with no submit, e.g. when the
/// client vanished or the process restarted and lost its watchers.
pub(crate) async fn run(state: AppState, mut shutdown: watch::Receiver<bool>) {
    let mut tick = interval(Duration::from_secs(state.settings().exam().sweep_interval_seconds));

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tick.tick() => {
                match sweep_overdue_sessions(&state).await {
                    Ok(0) => {}
                    Ok(swept) => tracing::info!(swept, "Finalized overdue exam sessions"),
                    Err(err) => tracing::error!(error = %err, "Overdue session sweep failed"),
                }
            }
        }
    }
}

pub(crate) async fn sweep_overdue_sessions(state: &AppState) -> anyhow::Result<usize> {
    let now = primitive_now_utc();
    let grace = state.settings().exam().submit_grace_seconds as i64;

    let overdue =
        repositories::sessions::list_overdue(state.db(), now, grace, SWEEP_BATCH_LIMIT).await?;
    if overdue.is_empty() {
        return Ok(0);
    }

    let flow = Arc::new(production_flow(state));
    let mut swept = 0;

    for session in overdue {
        match flow.submit(&session.id, None, SubmitReason::TimerExpired, now).await {
            Ok(outcome) => {
                if !outcome.duplicate {
                    swept += 1;
                }
            }
            Err(err) => {
                tracing::error!(
                    session_id = %session.id,
                    error = %err,
                    "Failed to finalize overdue session"
                );
            }
        }
    }

    Ok(swept)
}
