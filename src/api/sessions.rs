use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{Map, Value};
use time::{Duration, PrimitiveDateTime};

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::types::SubmitReason;
use crate::repositories;
use crate::schemas::session::{
    AutoSavePayload, AutoSaveResponse, SessionStart, SessionStartResponse, SessionView,
    SubmitPayload, SubmitReceipt, ViolationReportResponse,
};
use crate::services::proctoring::ViolationSignal;
use crate::services::session_backend::production_flow;
use crate::services::session_clock::SessionClock;
use crate::services::session_flow::ViolationOutcome;
use crate::tasks::deadline;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:session_id", get(get_session))
        .route("/:session_id/answers", put(save_answers))
        .route("/:session_id/violations", post(report_violation))
        .route("/:session_id/submit", post(submit))
}

/// Mounted under the forms router as `POST /forms/:form_id/sessions`.
pub(crate) async fn start_session(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Json(payload): Json<SessionStart>,
) -> Result<(StatusCode, Json<SessionStartResponse>), ApiError> {
    let now = primitive_now_utc();
    let flow = production_flow(&state);
    let outcome = flow.start(&form_id, &payload.student_name, now).await?;
    let session = outcome.session;

    if !outcome.resumed {
        tokio::spawn(deadline::watch_deadline(
            Arc::new(production_flow(&state)),
            session.id.clone(),
            session.started_at,
            session.ends_at,
            now,
        ));
    }

    let max_violations = max_violations_for(&state, &session.form_id).await?;
    let clock_state = SessionClock::from_deadline(session.started_at, session.ends_at).state(now);
    let status = if outcome.resumed { StatusCode::OK } else { StatusCode::CREATED };

    Ok((
        status,
        Json(SessionStartResponse {
            session: SessionView::from_db(session, clock_state, max_violations),
            resumed: outcome.resumed,
        }),
    ))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let now = primitive_now_utc();
    let flow = production_flow(&state);
    let session = flow.fetch_session(&session_id).await?;

    let max_violations = max_violations_for(&state, &session.form_id).await?;
    let clock_state = SessionClock::from_deadline(session.started_at, session.ends_at).state(now);

    Ok(Json(SessionView::from_db(session, clock_state, max_violations)))
}

async fn save_answers(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(payload): Json<AutoSavePayload>,
) -> Result<Json<AutoSaveResponse>, ApiError> {
    if !payload.answers.is_object() {
        return Err(ApiError::BadRequest("answers must be an object".to_string()));
    }

    let interval = state.settings().exam().auto_save_interval_seconds;
    let rate_key = format!("rl:autosave:{session_id}");
    let allowed = state.redis().rate_limit(&rate_key, 1, interval).await.unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Auto-save interval not elapsed"));
    }

    let now = primitive_now_utc();
    let flow = production_flow(&state);
    let session = flow.fetch_session(&session_id).await?;
    if session.is_submitted() {
        return Err(ApiError::Conflict("Session already submitted".to_string()));
    }

    let saved = flow.save_answers(&session_id, &payload.answers, now).await?;
    if !saved {
        return Err(ApiError::Conflict("Session already submitted".to_string()));
    }

    Ok(Json(AutoSaveResponse { status: "saved".to_string(), saved_at: format_primitive(now) }))
}

async fn report_violation(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(signal): Json<ViolationSignal>,
) -> Result<Json<ViolationReportResponse>, ApiError> {
    let now = primitive_now_utc();
    let flow = production_flow(&state);

    match flow.record_violation(&session_id, &signal, now).await? {
        ViolationOutcome::AlreadySubmitted => {
            let session = flow.fetch_session(&session_id).await?;
            Ok(Json(ViolationReportResponse {
                status: "already_submitted".to_string(),
                reason: None,
                violations: session.violations,
                terminal: false,
                countdown_seconds: None,
            }))
        }
        ViolationOutcome::Refused { count } => Ok(Json(ViolationReportResponse {
            status: "refused".to_string(),
            reason: None,
            violations: count,
            terminal: true,
            countdown_seconds: None,
        })),
        ViolationOutcome::Recorded { reason, count, terminal, countdown_seconds } => {
            if let Some(seconds) = countdown_seconds {
                tokio::spawn(deadline::violation_countdown(
                    Arc::new(production_flow(&state)),
                    session_id.clone(),
                    seconds,
                    now,
                ));
            }

            Ok(Json(ViolationReportResponse {
                status: "recorded".to_string(),
                reason: Some(reason),
                violations: count,
                terminal,
                countdown_seconds,
            }))
        }
    }
}

async fn submit(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(payload): Json<SubmitPayload>,
) -> Result<Json<SubmitReceipt>, ApiError> {
    let answers: Option<Map<String, Value>> = match payload.answers {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            return Err(ApiError::BadRequest("answers must be an object".to_string()));
        }
    };

    let now = primitive_now_utc();
    let flow = production_flow(&state);

    let session = flow.fetch_session(&session_id).await?;
    let grace = Duration::seconds(state.settings().exam().submit_grace_seconds as i64);
    let reason = resolve_submit_reason(payload.reason, now, session.ends_at, grace);

    let outcome = flow.submit(&session_id, answers, reason, now).await?;

    Ok(Json(SubmitReceipt {
        response_id: outcome.response.id.clone(),
        submit_reason: outcome.response.submit_reason.as_str().to_string(),
        total_score: outcome.response.total_score,
        total_possible_score: outcome.response.total_possible_score,
        submitted_at: format_primitive(outcome.response.submitted_at),
        duplicate: outcome.duplicate,
    }))
}

/// The server's clock is authoritative: a submit arriving after the deadline
/// plus the network grace window is recorded as a timer expiry, even when the
/// client claims `manual`. Violation-driven reasons pass through untouched.
fn resolve_submit_reason(
    requested: Option<SubmitReason>,
    now: PrimitiveDateTime,
    ends_at: PrimitiveDateTime,
    grace: Duration,
) -> SubmitReason {
    let overdue = now > ends_at + grace;
    match requested {
        Some(SubmitReason::Manual) | None if overdue => SubmitReason::TimerExpired,
        Some(reason) => reason,
        None => SubmitReason::Manual,
    }
}

async fn max_violations_for(state: &AppState, form_id: &str) -> Result<i32, ApiError> {
    let form = repositories::forms::find_by_id(state.db(), form_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load form"))?;
    Ok(form
        .map(|form| form.max_violations)
        .unwrap_or(state.settings().exam().max_violations as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixed_at;

    #[test]
    fn in_time_submit_stays_manual() {
        let ends_at = fixed_at(10, 30, 0);
        let grace = Duration::seconds(5);

        let reason = resolve_submit_reason(None, fixed_at(10, 20, 0), ends_at, grace);
        assert_eq!(reason, SubmitReason::Manual);

        let reason = resolve_submit_reason(
            Some(SubmitReason::Manual),
            fixed_at(10, 30, 5),
            ends_at,
            grace,
        );
        assert_eq!(reason, SubmitReason::Manual);
    }

    #[test]
    fn overdue_submit_becomes_timer_expired() {
        let ends_at = fixed_at(10, 30, 0);
        let grace = Duration::seconds(5);

        let reason = resolve_submit_reason(None, fixed_at(10, 30, 6), ends_at, grace);
        assert_eq!(reason, SubmitReason::TimerExpired);
    }

    #[test]
    fn overdue_submit_overrides_claimed_manual() {
        let ends_at = fixed_at(10, 30, 0);
        let grace = Duration::seconds(5);

        let reason = resolve_submit_reason(
            Some(SubmitReason::Manual),
            fixed_at(10, 31, 0),
            ends_at,
            grace,
        );
        assert_eq!(reason, SubmitReason::TimerExpired);
    }

    #[test]
    fn violation_reason_passes_through_when_overdue() {
        let ends_at = fixed_at(10, 30, 0);
        let grace = Duration::seconds(5);

        let reason = resolve_submit_reason(
            Some(SubmitReason::Violations),
            fixed_at(10, 31, 0),
            ends_at,
            grace,
        );
        assert_eq!(reason, SubmitReason::Violations);
    }
}
