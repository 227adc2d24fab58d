use sqlx::PgPool;

use crate::db::models::Form;

const COLUMNS: &str = "\
    id, owner_id, title, description, exam_mode, duration_minutes, max_violations, \
    shuffle_questions, is_published, created_at, updated_at";

pub(crate) struct CreateForm<'a> {
    pub(crate) id: &'a str,
    pub(crate) owner_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) exam_mode: bool,
    pub(crate) duration_minutes: i32,
    pub(crate) max_violations: i32,
    pub(crate) shuffle_questions: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateForm<'a> {
    pub(crate) title: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) exam_mode: bool,
    pub(crate) duration_minutes: i32,
    pub(crate) max_violations: i32,
    pub(crate) shuffle_questions: bool,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Form>, sqlx::Error> {
    sqlx::query_as::<_, Form>(&format!("SELECT {COLUMNS} FROM forms WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_published_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Form>, sqlx::Error> {
    sqlx::query_as::<_, Form>(&format!(
        "SELECT {COLUMNS} FROM forms WHERE id = $1 AND is_published = TRUE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_by_owner(pool: &PgPool, owner_id: &str) -> Result<Vec<Form>, sqlx::Error> {
    sqlx::query_as::<_, Form>(&format!(
        "SELECT {COLUMNS} FROM forms WHERE owner_id = $1 ORDER BY created_at DESC"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateForm<'_>,
) -> Result<Form, sqlx::Error> {
    sqlx::query_as::<_, Form>(&format!(
        "INSERT INTO forms (
            id, owner_id, title, description, exam_mode, duration_minutes,
            max_violations, shuffle_questions, is_published, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,FALSE,$9,$10)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.owner_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.exam_mode)
    .bind(params.duration_minutes)
    .bind(params.max_violations)
    .bind(params.shuffle_questions)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    params: UpdateForm<'_>,
) -> Result<Option<Form>, sqlx::Error> {
    sqlx::query_as::<_, Form>(&format!(
        "UPDATE forms SET
            title = $2, description = $3, exam_mode = $4, duration_minutes = $5,
            max_violations = $6, shuffle_questions = $7, updated_at = $8
        WHERE id = $1
        RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.exam_mode)
    .bind(params.duration_minutes)
    .bind(params.max_violations)
    .bind(params.shuffle_questions)
    .bind(params.updated_at)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn set_published(
    pool: &PgPool,
    id: &str,
    is_published: bool,
    updated_at: time::PrimitiveDateTime,
) -> Result<Option<Form>, sqlx::Error> {
    sqlx::query_as::<_, Form>(&format!(
        "UPDATE forms SET is_published = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(is_published)
    .bind(updated_at)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM forms WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
