use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use rand::seq::SliceRandom;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::validate_correct_answer;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Form, Question, User};
use crate::repositories;
use crate::schemas::form::{
    FormCreate, FormDetailResponse, FormPublish, FormSummaryResponse, FormUpdate,
    PublicFormResponse, QuestionCreate,
};
use crate::schemas::response::{ResponseDetail, ResponseSummary};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_form))
        .route("/", get(list_forms))
        .route("/:form_id", get(get_form))
        .route("/:form_id", put(update_form))
        .route("/:form_id", delete(delete_form))
        .route("/:form_id/publish", post(publish_form))
        .route("/:form_id/public", get(public_form))
        .route("/:form_id/sessions", post(crate::api::sessions::start_session))
        .route("/:form_id/responses", get(list_responses))
        .route("/:form_id/responses/:response_id", get(get_response))
}

async fn create_form(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<FormCreate>,
) -> Result<(StatusCode, Json<FormDetailResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    for question in &payload.questions {
        validate_correct_answer(question.kind, &question.correct_answer)?;
    }

    let exam = state.settings().exam();
    let duration_minutes =
        payload.duration_minutes.unwrap_or(exam.default_duration_minutes as i32);
    let max_violations = payload.max_violations.unwrap_or(exam.max_violations as i32);

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let form = repositories::forms::create(
        &mut *tx,
        repositories::forms::CreateForm {
            id: &Uuid::new_v4().to_string(),
            owner_id: &user.id,
            title: &payload.title,
            description: payload.description.as_deref(),
            exam_mode: payload.exam_mode,
            duration_minutes,
            max_violations,
            shuffle_questions: payload.shuffle_questions,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create form"))?;

    let questions = insert_questions(&mut tx, &form.id, payload.questions, now).await?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    Ok((StatusCode::CREATED, Json(FormDetailResponse::from_db(form, questions))))
}

async fn list_forms(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<FormSummaryResponse>>, ApiError> {
    let forms = repositories::forms::list_by_owner(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list forms"))?;

    let mut summaries = Vec::with_capacity(forms.len());
    for form in forms {
        let question_count = repositories::questions::count_by_form(state.db(), &form.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;
        let response_count = repositories::responses::count_by_form(state.db(), &form.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count responses"))?;
        summaries.push(FormSummaryResponse {
            id: form.id,
            title: form.title,
            description: form.description,
            exam_mode: form.exam_mode,
            is_published: form.is_published,
            question_count,
            response_count,
            created_at: crate::core::time::format_primitive(form.created_at),
        });
    }

    Ok(Json(summaries))
}

async fn get_form(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<Json<FormDetailResponse>, ApiError> {
    let form = fetch_owned_form(&state, &user, &form_id).await?;
    let questions = repositories::questions::list_by_form(state.db(), &form.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;

    Ok(Json(FormDetailResponse::from_db(form, questions)))
}

async fn update_form(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Json(payload): Json<FormUpdate>,
) -> Result<Json<FormDetailResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if let Some(questions) = &payload.questions {
        for question in questions {
            validate_correct_answer(question.kind, &question.correct_answer)?;
        }
    }

    let form = fetch_owned_form(&state, &user, &form_id).await?;

    if payload.questions.is_some() {
        let has_sessions = repositories::sessions::exists_for_form(state.db(), &form.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check sessions"))?;
        if has_sessions {
            return Err(ApiError::Conflict(
                "Questions cannot be changed once exam sessions exist".to_string(),
            ));
        }
    }

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let title = payload.title.as_deref().unwrap_or(&form.title);
    let description = payload.description.as_deref().or(form.description.as_deref());
    let updated = repositories::forms::update(
        &mut *tx,
        &form.id,
        repositories::forms::UpdateForm {
            title,
            description,
            exam_mode: payload.exam_mode.unwrap_or(form.exam_mode),
            duration_minutes: payload.duration_minutes.unwrap_or(form.duration_minutes),
            max_violations: payload.max_violations.unwrap_or(form.max_violations),
            shuffle_questions: payload.shuffle_questions.unwrap_or(form.shuffle_questions),
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update form"))?
    .ok_or_else(|| ApiError::NotFound("Form not found".to_string()))?;

    let questions = match payload.questions {
        Some(questions) => {
            repositories::questions::delete_by_form(&mut *tx, &updated.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to replace questions"))?;
            insert_questions(&mut tx, &updated.id, questions, now).await?
        }
        None => repositories::questions::list_by_form(&mut *tx, &updated.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load questions"))?,
    };

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    Ok(Json(FormDetailResponse::from_db(updated, questions)))
}

async fn delete_form(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let form = fetch_owned_form(&state, &user, &form_id).await?;

    let deleted = repositories::forms::delete(state.db(), &form.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete form"))?;
    if !deleted {
        return Err(ApiError::NotFound("Form not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn publish_form(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Json(payload): Json<FormPublish>,
) -> Result<Json<FormDetailResponse>, ApiError> {
    let form = fetch_owned_form(&state, &user, &form_id).await?;

    if payload.is_published {
        let question_count = repositories::questions::count_by_form(state.db(), &form.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;
        if question_count == 0 {
            return Err(ApiError::BadRequest(
                "A form must have at least one question to be published".to_string(),
            ));
        }
    }

    let updated =
        repositories::forms::set_published(state.db(), &form.id, payload.is_published, primitive_now_utc())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update form"))?
            .ok_or_else(|| ApiError::NotFound("Form not found".to_string()))?;

    let questions = repositories::questions::list_by_form(state.db(), &updated.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;

    Ok(Json(FormDetailResponse::from_db(updated, questions)))
}

async fn public_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<Json<PublicFormResponse>, ApiError> {
    let form = repositories::forms::find_published_by_id(state.db(), &form_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load form"))?
        .ok_or_else(|| ApiError::NotFound("Form not found".to_string()))?;

    let mut questions = repositories::questions::list_by_form(state.db(), &form.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;

    if form.shuffle_questions {
        questions.shuffle(&mut rand::thread_rng());
    }

    Ok(Json(PublicFormResponse::from_db(form, questions)))
}

async fn list_responses(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<Json<Vec<ResponseSummary>>, ApiError> {
    let form = fetch_owned_form(&state, &user, &form_id).await?;

    let responses = repositories::responses::list_by_form(state.db(), &form.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list responses"))?;

    Ok(Json(responses.into_iter().map(ResponseSummary::from_db).collect()))
}

async fn get_response(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path((form_id, response_id)): Path<(String, String)>,
) -> Result<Json<ResponseDetail>, ApiError> {
    let form = fetch_owned_form(&state, &user, &form_id).await?;

    let response = repositories::responses::find_by_id(state.db(), &response_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load response"))?
        .filter(|response| response.form_id == form.id)
        .ok_or_else(|| ApiError::NotFound("Response not found".to_string()))?;

    Ok(Json(ResponseDetail::from_db(response)))
}

pub(crate) async fn fetch_owned_form(
    state: &AppState,
    user: &User,
    form_id: &str,
) -> Result<Form, ApiError> {
    let form = repositories::forms::find_by_id(state.db(), form_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load form"))?
        .ok_or_else(|| ApiError::NotFound("Form not found".to_string()))?;

    if form.owner_id != user.id {
        return Err(ApiError::Forbidden("Not the owner of this form"));
    }

    Ok(form)
}

async fn insert_questions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    form_id: &str,
    questions: Vec<QuestionCreate>,
    now: time::PrimitiveDateTime,
) -> Result<Vec<Question>, ApiError> {
    let mut created = Vec::with_capacity(questions.len());
    for (index, question) in questions.into_iter().enumerate() {
        let row = repositories::questions::create(
            &mut **tx,
            repositories::questions::CreateQuestion {
                id: &Uuid::new_v4().to_string(),
                form_id,
                kind: question.kind,
                label: &question.label,
                options: question.options,
                required: question.required,
                points: question.points,
                correct_answer: question.correct_answer,
                scale_min: question.scale_min,
                scale_max: question.scale_max,
                scale_min_label: question.scale_min_label.as_deref(),
                scale_max_label: question.scale_max_label.as_deref(),
                order_index: index as i32,
                created_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create question"))?;
        created.push(row);
    }

    Ok(created)
}
