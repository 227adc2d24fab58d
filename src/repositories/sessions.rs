use sqlx::PgPool;

use crate::db::models::ExamSession;
use crate::db::types::SubmitReason;

pub(crate) const COLUMNS: &str = "\
    id, form_id, student_name, started_at, ends_at, violations, submitted_at, \
    submit_reason, auto_save_data, last_auto_save, created_at, updated_at";

pub(crate) struct CreateSession<'a> {
    pub(crate) id: &'a str,
    pub(crate) form_id: &'a str,
    pub(crate) student_name: &'a str,
    pub(crate) started_at: time::PrimitiveDateTime,
    pub(crate) ends_at: time::PrimitiveDateTime,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<ExamSession>, sqlx::Error> {
    sqlx::query_as::<_, ExamSession>(&format!("SELECT {COLUMNS} FROM exam_sessions WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateSession<'_>,
) -> Result<ExamSession, sqlx::Error> {
    sqlx::query_as::<_, ExamSession>(&format!(
        "INSERT INTO exam_sessions (
            id, form_id, student_name, started_at, ends_at, violations,
            auto_save_data, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,0,'{{}}'::jsonb,$6,$7)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.form_id)
    .bind(params.student_name)
    .bind(params.started_at)
    .bind(params.ends_at)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

/// Atomic increment; returns the new counter value.
pub(crate) async fn increment_violations(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        "UPDATE exam_sessions SET violations = violations + 1, updated_at = $2 \
         WHERE id = $1 RETURNING violations",
    )
    .bind(id)
    .bind(updated_at)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn save_answers(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    answers: &serde_json::Value,
    saved_at: time::PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE exam_sessions \
         SET auto_save_data = $2, last_auto_save = $3, updated_at = $3 \
         WHERE id = $1 AND submitted_at IS NULL",
    )
    .bind(id)
    .bind(sqlx::types::Json(answers))
    .bind(saved_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Conditional finalize guard. Returns false when the session was already
/// submitted, so racing submit triggers collapse to one winner.
pub(crate) async fn mark_submitted_if_unsubmitted(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    reason: SubmitReason,
    submitted_at: time::PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE exam_sessions \
         SET submitted_at = $3, submit_reason = $2, updated_at = $3 \
         WHERE id = $1 AND submitted_at IS NULL",
    )
    .bind(id)
    .bind(reason)
    .bind(submitted_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list_overdue(
    pool: &PgPool,
    now: time::PrimitiveDateTime,
    grace_seconds: i64,
    limit: i64,
) -> Result<Vec<ExamSession>, sqlx::Error> {
    sqlx::query_as::<_, ExamSession>(&format!(
        "SELECT {COLUMNS} FROM exam_sessions \
         WHERE submitted_at IS NULL AND ends_at < $1 - make_interval(secs => $2) \
         ORDER BY ends_at LIMIT $3"
    ))
    .bind(now)
    .bind(grace_seconds as f64)
    .bind(limit.clamp(1, 1000))
    .fetch_all(pool)
    .await
}

pub(crate) async fn exists_for_form(pool: &PgPool, form_id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM exam_sessions WHERE form_id = $1)",
    )
    .bind(form_id)
    .fetch_one(pool)
    .await
}
