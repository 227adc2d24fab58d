use async_trait::async_trait;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::core::redis::RedisHandle;
use crate::core::state::AppState;
use crate::db::models::{ExamSession, Form, FormResponse, Question};
use crate::db::types::SubmitReason;
use crate::repositories;
use crate::services::session_flow::{
    CachedSession, NewResponse, NewSession, SessionBackend, SessionCache, SessionKey,
};

pub(crate) type ProductionFlow =
    crate::services::session_flow::SessionFlow<PgSessionBackend, RedisSessionCache>;

pub(crate) fn production_flow(state: &AppState) -> ProductionFlow {
    let ttl_seconds = state.settings().exam().session_cache_ttl_hours * 3600;
    crate::services::session_flow::SessionFlow::new(
        PgSessionBackend::new(state.db().clone()),
        RedisSessionCache::new(state.redis().clone(), ttl_seconds),
    )
}

/// Postgres-backed persistence for the session flow.
#[derive(Clone)]
pub(crate) struct PgSessionBackend {
    pool: PgPool,
}

impl PgSessionBackend {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionBackend for PgSessionBackend {
    async fn find_form(&self, form_id: &str) -> Result<Option<Form>, anyhow::Error> {
        Ok(repositories::forms::find_by_id(&self.pool, form_id).await?)
    }

    async fn find_published_form_with_questions(
        &self,
        form_id: &str,
    ) -> Result<Option<(Form, Vec<Question>)>, anyhow::Error> {
        let Some(form) = repositories::forms::find_published_by_id(&self.pool, form_id).await?
        else {
            return Ok(None);
        };
        let questions = repositories::questions::list_by_form(&self.pool, form_id).await?;
        Ok(Some((form, questions)))
    }

    async fn questions_for_form(&self, form_id: &str) -> Result<Vec<Question>, anyhow::Error> {
        Ok(repositories::questions::list_by_form(&self.pool, form_id).await?)
    }

    async fn find_session(&self, id: &str) -> Result<Option<ExamSession>, anyhow::Error> {
        Ok(repositories::sessions::find_by_id(&self.pool, id).await?)
    }

    async fn create_session(&self, params: NewSession) -> Result<ExamSession, anyhow::Error> {
        Ok(repositories::sessions::create(
            &self.pool,
            repositories::sessions::CreateSession {
                id: &params.id,
                form_id: &params.form_id,
                student_name: &params.student_name,
                started_at: params.started_at,
                ends_at: params.ends_at,
                created_at: params.started_at,
                updated_at: params.started_at,
            },
        )
        .await?)
    }

    async fn increment_violations(
        &self,
        id: &str,
        now: PrimitiveDateTime,
    ) -> Result<Option<i32>, anyhow::Error> {
        Ok(repositories::sessions::increment_violations(&self.pool, id, now).await?)
    }

    async fn save_answers(
        &self,
        id: &str,
        answers: &serde_json::Value,
        now: PrimitiveDateTime,
    ) -> Result<bool, anyhow::Error> {
        Ok(repositories::sessions::save_answers(&self.pool, id, answers, now).await?)
    }

    async fn insert_response_if_absent(
        &self,
        params: NewResponse,
    ) -> Result<Option<FormResponse>, anyhow::Error> {
        Ok(repositories::responses::create_if_absent(
            &self.pool,
            repositories::responses::CreateResponse {
                id: &params.id,
                form_id: &params.form_id,
                exam_session_id: Some(&params.exam_session_id),
                student_name: &params.student_name,
                answers: params.answers,
                question_scores: params.question_scores,
                total_score: params.total_score,
                total_possible_score: params.total_possible_score,
                violations: params.violations,
                submit_reason: params.submit_reason,
                submitted_at: params.submitted_at,
            },
        )
        .await?)
    }

    async fn find_response_by_session(
        &self,
        exam_session_id: &str,
    ) -> Result<Option<FormResponse>, anyhow::Error> {
        Ok(repositories::responses::find_by_session(&self.pool, exam_session_id).await?)
    }

    async fn mark_submitted_if_unsubmitted(
        &self,
        id: &str,
        reason: SubmitReason,
        now: PrimitiveDateTime,
    ) -> Result<bool, anyhow::Error> {
        Ok(repositories::sessions::mark_submitted_if_unsubmitted(&self.pool, id, reason, now)
            .await?)
    }
}

/// Redis-backed reload-survival cache. Failures are logged and treated as
/// misses; a down cache never blocks an exam.
#[derive(Clone)]
pub(crate) struct RedisSessionCache {
    redis: RedisHandle,
    ttl_seconds: u64,
}

impl RedisSessionCache {
    pub(crate) fn new(redis: RedisHandle, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn load(&self, key: &SessionKey) -> Option<CachedSession> {
        match self.redis.get_json(&key.cache_key()).await {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(key = %key.cache_key(), error = %err, "Session cache read failed");
                None
            }
        }
    }

    async fn save(&self, key: &SessionKey, entry: &CachedSession) {
        if let Err(err) = self.redis.set_json(&key.cache_key(), entry, self.ttl_seconds).await {
            tracing::warn!(key = %key.cache_key(), error = %err, "Session cache write failed");
        }
    }

    async fn clear(&self, key: &SessionKey) {
        if let Err(err) = self.redis.delete(&key.cache_key()).await {
            tracing::warn!(key = %key.cache_key(), error = %err, "Session cache delete failed");
        }
    }
}
