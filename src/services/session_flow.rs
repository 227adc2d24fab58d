use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use time::{Duration, PrimitiveDateTime};

use crate::db::models::{ExamSession, Form, FormResponse, Question};
use crate::db::types::SubmitReason;
use crate::services::proctoring::{ViolationMonitor, ViolationSignal};
use crate::services::scoring;

pub(crate) const AUTO_SUBMIT_COUNTDOWN_SECONDS: u64 = 3;

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("persistence failure: {0}")]
    Persistence(#[source] anyhow::Error),
}

impl SessionError {
    fn persistence(err: impl Into<anyhow::Error>) -> Self {
        Self::Persistence(err.into())
    }
}

pub(crate) struct NewSession {
    pub(crate) id: String,
    pub(crate) form_id: String,
    pub(crate) student_name: String,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) ends_at: PrimitiveDateTime,
}

pub(crate) struct NewResponse {
    pub(crate) id: String,
    pub(crate) form_id: String,
    pub(crate) exam_session_id: String,
    pub(crate) student_name: String,
    pub(crate) answers: Value,
    pub(crate) question_scores: Value,
    pub(crate) total_score: f64,
    pub(crate) total_possible_score: f64,
    pub(crate) violations: i32,
    pub(crate) submit_reason: SubmitReason,
    pub(crate) submitted_at: PrimitiveDateTime,
}

/// Persistence seam of the controller: the five primitives the session flow
/// needs, nothing more. Production lives over Postgres; tests use an
/// in-memory double.
#[async_trait]
pub(crate) trait SessionBackend: Send + Sync {
    async fn find_form(&self, form_id: &str) -> Result<Option<Form>, anyhow::Error>;
    async fn find_published_form_with_questions(
        &self,
        form_id: &str,
    ) -> Result<Option<(Form, Vec<Question>)>, anyhow::Error>;
    async fn questions_for_form(&self, form_id: &str) -> Result<Vec<Question>, anyhow::Error>;
    async fn find_session(&self, id: &str) -> Result<Option<ExamSession>, anyhow::Error>;
    async fn create_session(&self, params: NewSession) -> Result<ExamSession, anyhow::Error>;
    async fn increment_violations(
        &self,
        id: &str,
        now: PrimitiveDateTime,
    ) -> Result<Option<i32>, anyhow::Error>;
    async fn save_answers(
        &self,
        id: &str,
        answers: &Value,
        now: PrimitiveDateTime,
    ) -> Result<bool, anyhow::Error>;
    async fn insert_response_if_absent(
        &self,
        params: NewResponse,
    ) -> Result<Option<FormResponse>, anyhow::Error>;
    async fn find_response_by_session(
        &self,
        exam_session_id: &str,
    ) -> Result<Option<FormResponse>, anyhow::Error>;
    async fn mark_submitted_if_unsubmitted(
        &self,
        id: &str,
        reason: SubmitReason,
        now: PrimitiveDateTime,
    ) -> Result<bool, anyhow::Error>;
}

/// Entry persisted so a reloaded client resumes its session instead of
/// starting a fresh clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CachedSession {
    pub(crate) session_id: String,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) violations: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SessionKey {
    pub(crate) form_id: String,
    pub(crate) student_name: String,
}

impl SessionKey {
    pub(crate) fn new(form_id: &str, student_name: &str) -> Self {
        Self { form_id: form_id.to_string(), student_name: student_name.trim().to_string() }
    }

    pub(crate) fn cache_key(&self) -> String {
        format!("session:{}:{}", self.form_id, self.student_name)
    }
}

/// Reload-survival store. All operations are best-effort: implementations
/// log failures and degrade to a miss rather than erroring.
#[async_trait]
pub(crate) trait SessionCache: Send + Sync {
    async fn load(&self, key: &SessionKey) -> Option<CachedSession>;
    async fn save(&self, key: &SessionKey, entry: &CachedSession);
    async fn clear(&self, key: &SessionKey);
}

#[derive(Debug)]
pub(crate) struct StartOutcome {
    pub(crate) session: ExamSession,
    pub(crate) resumed: bool,
}

#[derive(Debug)]
pub(crate) enum ViolationOutcome {
    AlreadySubmitted,
    Recorded {
        reason: String,
        count: i32,
        terminal: bool,
        countdown_seconds: Option<u64>,
    },
    /// The session already reached the threshold; the signal is refused and
    /// the persisted counter left alone.
    Refused { count: i32 },
}

#[derive(Debug)]
pub(crate) struct SubmitOutcome {
    pub(crate) response: FormResponse,
    /// True when a response for this session already existed and was
    /// returned instead of a new one.
    pub(crate) duplicate: bool,
}

/// Orchestrates one exam session from start to recorded response. Exactly-once
/// submission is enforced by the backend's insert-if-absent response guard,
/// so any number of racing triggers (manual, timer expiry, violation
/// countdown) collapse to a single response row.
pub(crate) struct SessionFlow<B, C> {
    backend: B,
    cache: C,
}

impl<B: SessionBackend, C: SessionCache> SessionFlow<B, C> {
    pub(crate) fn new(backend: B, cache: C) -> Self {
        Self { backend, cache }
    }

    /// Starts a session, or resumes the cached one for this (form, student)
    /// pair. Resumption keeps the original start instant; reload never
    /// extends time.
    pub(crate) async fn start(
        &self,
        form_id: &str,
        student_name: &str,
        now: PrimitiveDateTime,
    ) -> Result<StartOutcome, SessionError> {
        let student_name = student_name.trim();
        if student_name.is_empty() {
            return Err(SessionError::Validation("Student name must not be blank".to_string()));
        }

        let (form, _) = self
            .backend
            .find_published_form_with_questions(form_id)
            .await
            .map_err(SessionError::persistence)?
            .ok_or(SessionError::NotFound("form"))?;

        let key = SessionKey::new(form_id, student_name);

        if let Some(cached) = self.cache.load(&key).await {
            match self
                .backend
                .find_session(&cached.session_id)
                .await
                .map_err(SessionError::persistence)?
            {
                Some(session) if !session.is_submitted() => {
                    tracing::debug!(
                        session_id = %session.id,
                        form_id,
                        "Resuming cached exam session"
                    );
                    return Ok(StartOutcome { session, resumed: true });
                }
                _ => {
                    // Stale entry: the session vanished or was finalized.
                    self.cache.clear(&key).await;
                }
            }
        }

        let session = self
            .backend
            .create_session(NewSession {
                id: uuid::Uuid::new_v4().to_string(),
                form_id: form_id.to_string(),
                student_name: student_name.to_string(),
                started_at: now,
                ends_at: now + Duration::minutes(form.duration_minutes as i64),
            })
            .await
            .map_err(SessionError::persistence)?;

        self.cache
            .save(
                &key,
                &CachedSession {
                    session_id: session.id.clone(),
                    started_at: session.started_at,
                    violations: 0,
                },
            )
            .await;

        metrics::counter!("formgate_sessions_started_total").increment(1);
        tracing::info!(session_id = %session.id, form_id, "Exam session started");

        Ok(StartOutcome { session, resumed: false })
    }

    pub(crate) async fn fetch_session(&self, id: &str) -> Result<ExamSession, SessionError> {
        self.backend
            .find_session(id)
            .await
            .map_err(SessionError::persistence)?
            .ok_or(SessionError::NotFound("session"))
    }

    pub(crate) async fn save_answers(
        &self,
        id: &str,
        answers: &Value,
        now: PrimitiveDateTime,
    ) -> Result<bool, SessionError> {
        self.backend.save_answers(id, answers, now).await.map_err(SessionError::persistence)
    }

    /// Applies one violation signal to the session's monitor. The remote
    /// increment is best-effort telemetry: a failed write is logged and the
    /// local escalation proceeds on the locally computed count.
    pub(crate) async fn record_violation(
        &self,
        session_id: &str,
        signal: &ViolationSignal,
        now: PrimitiveDateTime,
    ) -> Result<ViolationOutcome, SessionError> {
        let session = self.fetch_session(session_id).await?;
        if session.is_submitted() {
            return Ok(ViolationOutcome::AlreadySubmitted);
        }

        let form = self
            .backend
            .find_form(&session.form_id)
            .await
            .map_err(SessionError::persistence)?
            .ok_or(SessionError::NotFound("form"))?;

        let mut monitor =
            ViolationMonitor::resume(form.max_violations as u32, session.violations.max(0) as u32);

        let Some(notice) = monitor.observe(signal) else {
            return Ok(ViolationOutcome::Refused { count: session.violations });
        };

        let count = match self.backend.increment_violations(session_id, now).await {
            Ok(Some(persisted)) => persisted,
            Ok(None) => notice.count as i32,
            Err(err) => {
                tracing::warn!(
                    session_id,
                    error = %err,
                    "Failed to persist violation increment; continuing locally"
                );
                notice.count as i32
            }
        };

        let key = SessionKey::new(&session.form_id, &session.student_name);
        self.cache
            .save(
                &key,
                &CachedSession {
                    session_id: session.id.clone(),
                    started_at: session.started_at,
                    violations: count,
                },
            )
            .await;

        metrics::counter!("formgate_violations_total").increment(1);
        tracing::info!(
            session_id,
            reason = %notice.reason,
            count,
            terminal = notice.terminal,
            "Violation recorded"
        );

        Ok(ViolationOutcome::Recorded {
            reason: notice.reason,
            count,
            terminal: notice.terminal,
            countdown_seconds: notice.terminal.then_some(AUTO_SUBMIT_COUNTDOWN_SECONDS),
        })
    }

    /// Finalizes the session. Idempotent: a second call (double click, timer
    /// racing the countdown, a retry) returns the already recorded response.
    /// On a persistence failure nothing is marked submitted, so the caller
    /// may retry.
    pub(crate) async fn submit(
        &self,
        session_id: &str,
        answers: Option<Map<String, Value>>,
        reason: SubmitReason,
        now: PrimitiveDateTime,
    ) -> Result<SubmitOutcome, SessionError> {
        let session = self.fetch_session(session_id).await?;
        let key = SessionKey::new(&session.form_id, &session.student_name);

        if let Some(existing) = self
            .backend
            .find_response_by_session(session_id)
            .await
            .map_err(SessionError::persistence)?
        {
            // Heal a half-finished earlier attempt before reporting the
            // duplicate.
            self.backend
                .mark_submitted_if_unsubmitted(session_id, existing.submit_reason, now)
                .await
                .map_err(SessionError::persistence)?;
            self.cache.clear(&key).await;
            return Ok(SubmitOutcome { response: existing, duplicate: true });
        }

        let questions = self
            .backend
            .questions_for_form(&session.form_id)
            .await
            .map_err(SessionError::persistence)?;

        let answers = match answers {
            Some(map) => map,
            None => match &session.auto_save_data.0 {
                Value::Object(map) => map.clone(),
                _ => Map::new(),
            },
        };

        let report = scoring::score(&questions, &answers);

        let question_scores = serde_json::to_value(&report.per_question)
            .map_err(|err| SessionError::persistence(anyhow::Error::from(err)))?;

        let inserted = self
            .backend
            .insert_response_if_absent(NewResponse {
                id: uuid::Uuid::new_v4().to_string(),
                form_id: session.form_id.clone(),
                exam_session_id: session.id.clone(),
                student_name: session.student_name.clone(),
                answers: Value::Object(answers),
                question_scores,
                total_score: report.total_score,
                total_possible_score: report.total_possible_score,
                violations: session.violations,
                submit_reason: reason,
                submitted_at: now,
            })
            .await
            .map_err(SessionError::persistence)?;

        let (response, duplicate) = match inserted {
            Some(response) => (response, false),
            None => {
                // Lost the race against another trigger; its row wins.
                let existing = self
                    .backend
                    .find_response_by_session(session_id)
                    .await
                    .map_err(SessionError::persistence)?
                    .ok_or_else(|| {
                        SessionError::persistence(anyhow::anyhow!(
                            "response insert conflicted but no row found"
                        ))
                    })?;
                (existing, true)
            }
        };

        self.backend
            .mark_submitted_if_unsubmitted(session_id, response.submit_reason, now)
            .await
            .map_err(SessionError::persistence)?;

        self.cache.clear(&key).await;

        if !duplicate {
            metrics::counter!(
                "formgate_responses_submitted_total",
                "reason" => reason.as_str()
            )
            .increment(1);
            tracing::info!(
                session_id,
                reason = reason.as_str(),
                total_score = response.total_score,
                "Exam session submitted"
            );
        }

        Ok(SubmitOutcome { response, duplicate })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::test_support::{exam_form, fixed_at, graded_question, MemoryBackend, MemoryCache};

    fn at(hour: u8, minute: u8) -> PrimitiveDateTime {
        fixed_at(hour, minute, 0)
    }

    fn flow() -> (SessionFlow<MemoryBackend, MemoryCache>, MemoryBackend, MemoryCache) {
        let backend = MemoryBackend::default();
        let cache = MemoryCache::default();
        backend.insert_form(
            exam_form("form-1", 30, 2),
            vec![graded_question("q1", "form-1", 2.0, json!("paris"))],
        );
        (SessionFlow::new(backend.clone(), cache.clone()), backend, cache)
    }

    #[tokio::test]
    async fn blank_student_name_is_rejected() {
        let (flow, backend, _) = flow();

        let err = flow.start("form-1", "   ", at(10, 0)).await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        assert_eq!(backend.session_count(), 0);
    }

    #[tokio::test]
    async fn unpublished_form_is_not_found() {
        let backend = MemoryBackend::default();
        let mut form = exam_form("form-1", 30, 2);
        form.is_published = false;
        backend.insert_form(form, Vec::new());
        let flow = SessionFlow::new(backend, MemoryCache::default());

        let err = flow.start("form-1", "Alice", at(10, 0)).await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound("form")));
    }

    #[tokio::test]
    async fn start_fixes_the_deadline_and_caches_the_session() {
        let (flow, _, cache) = flow();

        let outcome = flow.start("form-1", " Alice ", at(10, 0)).await.unwrap();
        assert!(!outcome.resumed);
        assert_eq!(outcome.session.started_at, at(10, 0));
        assert_eq!(outcome.session.ends_at, at(10, 30));
        assert_eq!(outcome.session.student_name, "Alice");

        let key = SessionKey::new("form-1", "Alice");
        let cached = cache.load(&key).await.unwrap();
        assert_eq!(cached.session_id, outcome.session.id);
        assert_eq!(cached.violations, 0);
    }

    #[tokio::test]
    async fn resume_preserves_start_and_creates_no_second_session() {
        let (flow, backend, _) = flow();

        let first = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();
        let second = flow.start("form-1", "Alice", at(10, 10)).await.unwrap();

        assert!(second.resumed);
        assert_eq!(second.session.id, first.session.id);
        assert_eq!(second.session.started_at, at(10, 0));
        assert_eq!(backend.session_count(), 1);
    }

    #[tokio::test]
    async fn cache_miss_starts_fresh() {
        let (flow, backend, cache) = flow();

        let first = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();
        cache.clear(&SessionKey::new("form-1", "Alice")).await;

        let second = flow.start("form-1", "Alice", at(10, 5)).await.unwrap();
        assert!(!second.resumed);
        assert_ne!(second.session.id, first.session.id);
        assert_eq!(backend.session_count(), 2);
    }

    #[tokio::test]
    async fn stale_cache_entry_for_submitted_session_is_replaced() {
        let (flow, _, cache) = flow();

        let first = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();
        flow.submit(&first.session.id, Some(Map::new()), SubmitReason::Manual, at(10, 5))
            .await
            .unwrap();

        // Simulate a client that kept its local entry after submitting.
        let key = SessionKey::new("form-1", "Alice");
        cache
            .save(
                &key,
                &CachedSession {
                    session_id: first.session.id.clone(),
                    started_at: first.session.started_at,
                    violations: 0,
                },
            )
            .await;

        let second = flow.start("form-1", "Alice", at(10, 10)).await.unwrap();
        assert!(!second.resumed);
        assert_ne!(second.session.id, first.session.id);
    }

    #[tokio::test]
    async fn first_violation_warns_and_persists_the_count() {
        let (flow, backend, _) = flow();
        let started = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();

        let outcome = flow
            .record_violation(&started.session.id, &ViolationSignal::TabHidden, at(10, 1))
            .await
            .unwrap();

        match outcome {
            ViolationOutcome::Recorded { reason, count, terminal, countdown_seconds } => {
                assert_eq!(reason, "Tab switching detected");
                assert_eq!(count, 1);
                assert!(!terminal);
                assert_eq!(countdown_seconds, None);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(backend.session(&started.session.id).violations, 1);
    }

    #[tokio::test]
    async fn threshold_violation_is_terminal_with_countdown() {
        let (flow, _, _) = flow();
        let started = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();
        let id = started.session.id.clone();

        flow.record_violation(&id, &ViolationSignal::Copy, at(10, 1)).await.unwrap();
        let outcome =
            flow.record_violation(&id, &ViolationSignal::FocusLost, at(10, 2)).await.unwrap();

        match outcome {
            ViolationOutcome::Recorded { count, terminal, countdown_seconds, .. } => {
                assert_eq!(count, 2);
                assert!(terminal);
                assert_eq!(countdown_seconds, Some(AUTO_SUBMIT_COUNTDOWN_SECONDS));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn post_terminal_signals_are_refused() {
        let (flow, backend, _) = flow();
        let started = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();
        let id = started.session.id.clone();

        flow.record_violation(&id, &ViolationSignal::Copy, at(10, 1)).await.unwrap();
        flow.record_violation(&id, &ViolationSignal::Paste, at(10, 2)).await.unwrap();

        let outcome =
            flow.record_violation(&id, &ViolationSignal::TabHidden, at(10, 3)).await.unwrap();
        assert!(matches!(outcome, ViolationOutcome::Refused { count: 2 }));
        assert_eq!(backend.session(&id).violations, 2);
    }

    #[tokio::test]
    async fn failed_increment_still_progresses_locally() {
        let (flow, backend, _) = flow();
        let started = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();
        backend.fail_increment.store(true, Ordering::SeqCst);

        let outcome = flow
            .record_violation(&started.session.id, &ViolationSignal::ContextMenu, at(10, 1))
            .await
            .unwrap();

        match outcome {
            ViolationOutcome::Recorded { count, terminal, .. } => {
                assert_eq!(count, 1);
                assert!(!terminal);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        // The remote counter was never advanced.
        assert_eq!(backend.session(&started.session.id).violations, 0);
    }

    #[tokio::test]
    async fn violations_on_a_submitted_session_are_ignored() {
        let (flow, _, _) = flow();
        let started = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();
        flow.submit(&started.session.id, Some(Map::new()), SubmitReason::Manual, at(10, 5))
            .await
            .unwrap();

        let outcome = flow
            .record_violation(&started.session.id, &ViolationSignal::Copy, at(10, 6))
            .await
            .unwrap();
        assert!(matches!(outcome, ViolationOutcome::AlreadySubmitted));
    }

    #[tokio::test]
    async fn submit_scores_answers_and_finalizes() {
        let (flow, backend, cache) = flow();
        let started = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();

        let mut answers = Map::new();
        answers.insert("q1".to_string(), json!(" Paris "));

        let outcome = flow
            .submit(&started.session.id, Some(answers), SubmitReason::Manual, at(10, 20))
            .await
            .unwrap();

        assert!(!outcome.duplicate);
        assert_eq!(outcome.response.total_score, 2.0);
        assert_eq!(outcome.response.total_possible_score, 2.0);
        assert_eq!(outcome.response.submit_reason, SubmitReason::Manual);

        let session = backend.session(&started.session.id);
        assert!(session.is_submitted());
        assert!(!cache.contains(&SessionKey::new("form-1", "Alice")));
    }

    #[tokio::test]
    async fn double_submit_produces_one_response() {
        let (flow, backend, _) = flow();
        let started = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();
        let id = started.session.id.clone();

        let first =
            flow.submit(&id, Some(Map::new()), SubmitReason::Manual, at(10, 20)).await.unwrap();
        let second = flow
            .submit(&id, Some(Map::new()), SubmitReason::TimerExpired, at(10, 21))
            .await
            .unwrap();

        assert!(!first.duplicate);
        assert!(second.duplicate);
        assert_eq!(second.response.id, first.response.id);
        assert_eq!(second.response.submit_reason, SubmitReason::Manual);
        assert_eq!(backend.response_count(), 1);
    }

    #[tokio::test]
    async fn racing_triggers_collapse_to_one_response() {
        let (flow, backend, _) = flow();
        let started = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();
        let flow = Arc::new(flow);
        let id = started.session.id;

        let reasons =
            [SubmitReason::Manual, SubmitReason::TimerExpired, SubmitReason::Violations];
        let mut handles = Vec::new();
        for reason in reasons {
            let flow = Arc::clone(&flow);
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                flow.submit(&id, Some(Map::new()), reason, at(10, 30)).await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(backend.response_count(), 1);
        assert!(backend.session(&id).is_submitted());
    }

    #[tokio::test]
    async fn failed_submit_releases_the_guard_for_retry() {
        let (flow, backend, _) = flow();
        let started = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();
        let id = started.session.id.clone();

        backend.fail_insert_response.store(true, Ordering::SeqCst);
        let err = flow
            .submit(&id, Some(Map::new()), SubmitReason::Manual, at(10, 20))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Persistence(_)));
        assert!(!backend.session(&id).is_submitted());
        assert_eq!(backend.response_count(), 0);

        backend.fail_insert_response.store(false, Ordering::SeqCst);
        let retried =
            flow.submit(&id, Some(Map::new()), SubmitReason::Manual, at(10, 21)).await.unwrap();
        assert!(!retried.duplicate);
        assert_eq!(backend.response_count(), 1);
    }

    #[tokio::test]
    async fn deadline_submit_scores_last_saved_answers() {
        let (flow, _, _) = flow();
        let started = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();
        let id = started.session.id.clone();

        flow.save_answers(&id, &json!({"q1": "paris"}), at(10, 15)).await.unwrap();
        let outcome =
            flow.submit(&id, None, SubmitReason::TimerExpired, at(10, 30)).await.unwrap();

        assert_eq!(outcome.response.total_score, 2.0);
        assert_eq!(outcome.response.submit_reason, SubmitReason::TimerExpired);
    }

    #[tokio::test]
    async fn response_records_the_violation_count() {
        let (flow, _, _) = flow();
        let started = flow.start("form-1", "Alice", at(10, 0)).await.unwrap();
        let id = started.session.id.clone();

        flow.record_violation(&id, &ViolationSignal::TabHidden, at(10, 1)).await.unwrap();
        let outcome =
            flow.submit(&id, Some(Map::new()), SubmitReason::Manual, at(10, 5)).await.unwrap();

        assert_eq!(outcome.response.violations, 1);
    }
}
