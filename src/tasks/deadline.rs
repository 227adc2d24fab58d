use std::sync::Arc;

use time::PrimitiveDateTime;
use tokio::time::{interval, sleep, Duration};

use crate::db::types::SubmitReason;
use crate::services::session_clock::SessionClock;
use crate::services::session_flow::{SessionBackend, SessionCache, SessionError, SessionFlow};

/// Drives one session's clock on a 1-second tick and finalizes it with
/// reason `timer_expired` when the deadline passes. The clock's one-shot
/// flag and the flow's idempotent submit make a late or duplicate fire a
/// no-op. Time is advanced by tick count from the spawn instant, so the
/// watch stays correct under a virtual clock.
pub(crate) async fn watch_deadline<B, C>(
    flow: Arc<SessionFlow<B, C>>,
    session_id: String,
    started_at: PrimitiveDateTime,
    ends_at: PrimitiveDateTime,
    spawned_at: PrimitiveDateTime,
) where
    B: SessionBackend,
    C: SessionCache,
{
    let mut clock = SessionClock::from_deadline(started_at, ends_at);
    let mut now = spawned_at;
    let mut tick = interval(Duration::from_secs(1));

    loop {
        tick.tick().await;
        if clock.tick(now).expired_now {
            finalize(&flow, &session_id, SubmitReason::TimerExpired, now).await;
            break;
        }
        now += time::Duration::seconds(1);
    }
}

/// The 3-second auto-submit countdown started when the violation monitor
/// goes terminal. Fires once; the idempotent submit absorbs races with the
/// student's own submit or the deadline watch.
pub(crate) async fn violation_countdown<B, C>(
    flow: Arc<SessionFlow<B, C>>,
    session_id: String,
    seconds: u64,
    armed_at: PrimitiveDateTime,
) where
    B: SessionBackend,
    C: SessionCache,
{
    sleep(Duration::from_secs(seconds)).await;
    let fired_at = armed_at + time::Duration::seconds(seconds as i64);
    finalize(&flow, &session_id, SubmitReason::Violations, fired_at).await;
}

async fn finalize<B, C>(
    flow: &SessionFlow<B, C>,
    session_id: &str,
    reason: SubmitReason,
    now: PrimitiveDateTime,
) where
    B: SessionBackend,
    C: SessionCache,
{
    match flow.submit(session_id, None, reason, now).await {
        Ok(outcome) if outcome.duplicate => {
            tracing::debug!(session_id, reason = reason.as_str(), "Session already finalized");
        }
        Ok(_) => {}
        Err(SessionError::NotFound(_)) => {
            tracing::debug!(session_id, "Session vanished before auto-submit");
        }
        Err(err) => {
            tracing::error!(session_id, reason = reason.as_str(), error = %err, "Auto-submit failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{exam_form, fixed_at, graded_question, MemoryBackend, MemoryCache};
    use serde_json::{json, Map};

    fn flow_with_session() -> (Arc<SessionFlow<MemoryBackend, MemoryCache>>, MemoryBackend, String)
    {
        let backend = MemoryBackend::default();
        let cache = MemoryCache::default();
        backend.insert_form(
            exam_form("form-1", 30, 2),
            vec![graded_question("q1", "form-1", 1.0, json!("42"))],
        );
        (Arc::new(SessionFlow::new(backend.clone(), cache)), backend, "form-1".to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_watch_submits_with_timer_expired() {
        let (flow, backend, form_id) = flow_with_session();
        let started = flow.start(&form_id, "Alice", fixed_at(10, 0, 0)).await.unwrap();
        let session_id = started.session.id.clone();

        let watcher = tokio::spawn(watch_deadline(
            Arc::clone(&flow),
            session_id.clone(),
            started.session.started_at,
            started.session.ends_at,
            fixed_at(10, 0, 0),
        ));

        watcher.await.unwrap();

        let session = backend.session(&session_id);
        assert!(session.is_submitted());
        assert_eq!(session.submit_reason, Some(SubmitReason::TimerExpired));
        assert_eq!(backend.response_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_watch_is_a_noop_after_manual_submit() {
        let (flow, backend, form_id) = flow_with_session();
        let started = flow.start(&form_id, "Alice", fixed_at(10, 0, 0)).await.unwrap();
        let session_id = started.session.id.clone();

        flow.submit(&session_id, Some(Map::new()), SubmitReason::Manual, fixed_at(10, 5, 0))
            .await
            .unwrap();

        watch_deadline(
            Arc::clone(&flow),
            session_id.clone(),
            started.session.started_at,
            started.session.ends_at,
            fixed_at(10, 5, 0),
        )
        .await;

        let session = backend.session(&session_id);
        assert_eq!(session.submit_reason, Some(SubmitReason::Manual));
        assert_eq!(backend.response_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_submits_with_violations_reason() {
        let (flow, backend, form_id) = flow_with_session();
        let started = flow.start(&form_id, "Alice", fixed_at(10, 0, 0)).await.unwrap();
        let session_id = started.session.id.clone();

        violation_countdown(Arc::clone(&flow), session_id.clone(), 3, fixed_at(10, 2, 0)).await;

        let session = backend.session(&session_id);
        assert_eq!(session.submit_reason, Some(SubmitReason::Violations));
        assert_eq!(session.submitted_at, Some(fixed_at(10, 2, 3)));
    }

    #[tokio::test(start_paused = true)]
    async fn racing_countdown_and_watch_produce_one_response() {
        let (flow, backend, form_id) = flow_with_session();
        let started = flow.start(&form_id, "Alice", fixed_at(10, 0, 0)).await.unwrap();
        let session_id = started.session.id.clone();

        let watcher = tokio::spawn(watch_deadline(
            Arc::clone(&flow),
            session_id.clone(),
            started.session.started_at,
            started.session.ends_at,
            fixed_at(10, 0, 0),
        ));
        let countdown = tokio::spawn(violation_countdown(
            Arc::clone(&flow),
            session_id.clone(),
            3,
            fixed_at(10, 0, 0),
        ));

        countdown.await.unwrap();
        watcher.await.unwrap();

        assert_eq!(backend.response_count(), 1);
        assert!(backend.session(&session_id).is_submitted());
    }
}
