use sqlx::PgPool;

use crate::db::models::{Question, QuestionOption};
use crate::db::types::QuestionKind;

const COLUMNS: &str = "\
    id, form_id, kind, label, options, required, points, correct_answer, \
    scale_min, scale_max, scale_min_label, scale_max_label, order_index, created_at";

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) form_id: &'a str,
    pub(crate) kind: QuestionKind,
    pub(crate) label: &'a str,
    pub(crate) options: Vec<QuestionOption>,
    pub(crate) required: bool,
    pub(crate) points: f64,
    pub(crate) correct_answer: serde_json::Value,
    pub(crate) scale_min: Option<i32>,
    pub(crate) scale_max: Option<i32>,
    pub(crate) scale_min_label: Option<&'a str>,
    pub(crate) scale_max_label: Option<&'a str>,
    pub(crate) order_index: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn list_by_form(
    executor: impl sqlx::PgExecutor<'_>,
    form_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE form_id = $1 ORDER BY order_index"
    ))
    .bind(form_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, form_id, kind, label, options, required, points, correct_answer,
            scale_min, scale_max, scale_min_label, scale_max_label, order_index, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.form_id)
    .bind(params.kind)
    .bind(params.label)
    .bind(sqlx::types::Json(params.options))
    .bind(params.required)
    .bind(params.points)
    .bind(sqlx::types::Json(params.correct_answer))
    .bind(params.scale_min)
    .bind(params.scale_max)
    .bind(params.scale_min_label)
    .bind(params.scale_max_label)
    .bind(params.order_index)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete_by_form(
    executor: impl sqlx::PgExecutor<'_>,
    form_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE form_id = $1")
        .bind(form_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn count_by_form(pool: &PgPool, form_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE form_id = $1")
        .bind(form_id)
        .fetch_one(pool)
        .await
}
