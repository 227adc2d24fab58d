use sqlx::PgPool;

use crate::db::models::FormResponse;
use crate::db::types::SubmitReason;

const COLUMNS: &str = "\
    id, form_id, exam_session_id, student_name, answers, question_scores, \
    total_score, total_possible_score, violations, submit_reason, submitted_at";

pub(crate) struct CreateResponse<'a> {
    pub(crate) id: &'a str,
    pub(crate) form_id: &'a str,
    pub(crate) exam_session_id: Option<&'a str>,
    pub(crate) student_name: &'a str,
    pub(crate) answers: serde_json::Value,
    pub(crate) question_scores: serde_json::Value,
    pub(crate) total_score: f64,
    pub(crate) total_possible_score: f64,
    pub(crate) violations: i32,
    pub(crate) submit_reason: SubmitReason,
    pub(crate) submitted_at: time::PrimitiveDateTime,
}

/// Insert-if-absent keyed by the session. Returns the inserted row, or None
/// when a response for the same session already exists.
pub(crate) async fn create_if_absent(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateResponse<'_>,
) -> Result<Option<FormResponse>, sqlx::Error> {
    sqlx::query_as::<_, FormResponse>(&format!(
        "INSERT INTO form_responses (
            id, form_id, exam_session_id, student_name, answers, question_scores,
            total_score, total_possible_score, violations, submit_reason, submitted_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
        ON CONFLICT (exam_session_id) WHERE exam_session_id IS NOT NULL DO NOTHING
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.form_id)
    .bind(params.exam_session_id)
    .bind(params.student_name)
    .bind(sqlx::types::Json(params.answers))
    .bind(sqlx::types::Json(params.question_scores))
    .bind(params.total_score)
    .bind(params.total_possible_score)
    .bind(params.violations)
    .bind(params.submit_reason)
    .bind(params.submitted_at)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<FormResponse>, sqlx::Error> {
    sqlx::query_as::<_, FormResponse>(&format!("SELECT {COLUMNS} FROM form_responses WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_session(
    executor: impl sqlx::PgExecutor<'_>,
    exam_session_id: &str,
) -> Result<Option<FormResponse>, sqlx::Error> {
    sqlx::query_as::<_, FormResponse>(&format!(
        "SELECT {COLUMNS} FROM form_responses WHERE exam_session_id = $1"
    ))
    .bind(exam_session_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_by_form(
    pool: &PgPool,
    form_id: &str,
) -> Result<Vec<FormResponse>, sqlx::Error> {
    sqlx::query_as::<_, FormResponse>(&format!(
        "SELECT {COLUMNS} FROM form_responses WHERE form_id = $1 ORDER BY submitted_at DESC"
    ))
    .bind(form_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_by_form(pool: &PgPool, form_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM form_responses WHERE form_id = $1")
        .bind(form_id)
        .fetch_one(pool)
        .await
}
