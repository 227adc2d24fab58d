use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{QuestionKind, SubmitReason};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) hashed_password: String,
    pub(crate) full_name: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Form {
    pub(crate) id: String,
    pub(crate) owner_id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) exam_mode: bool,
    pub(crate) duration_minutes: i32,
    pub(crate) max_violations: i32,
    pub(crate) shuffle_questions: bool,
    pub(crate) is_published: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct QuestionOption {
    pub(crate) text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) form_id: String,
    pub(crate) kind: QuestionKind,
    pub(crate) label: String,
    pub(crate) options: Json<Vec<QuestionOption>>,
    pub(crate) required: bool,
    pub(crate) points: f64,
    /// `null`, a single string, or an array of strings for checkboxes.
    pub(crate) correct_answer: Json<serde_json::Value>,
    pub(crate) scale_min: Option<i32>,
    pub(crate) scale_max: Option<i32>,
    pub(crate) scale_min_label: Option<String>,
    pub(crate) scale_max_label: Option<String>,
    pub(crate) order_index: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ExamSession {
    pub(crate) id: String,
    pub(crate) form_id: String,
    pub(crate) student_name: String,
    pub(crate) started_at: PrimitiveDateTime,
    // started_at + duration, fixed at creation and never recomputed.
    pub(crate) ends_at: PrimitiveDateTime,
    pub(crate) violations: i32,
    pub(crate) submitted_at: Option<PrimitiveDateTime>,
    pub(crate) submit_reason: Option<SubmitReason>,
    pub(crate) auto_save_data: Json<serde_json::Value>,
    pub(crate) last_auto_save: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl ExamSession {
    pub(crate) fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct FormResponse {
    pub(crate) id: String,
    pub(crate) form_id: String,
    pub(crate) exam_session_id: Option<String>,
    pub(crate) student_name: String,
    pub(crate) answers: Json<serde_json::Value>,
    pub(crate) question_scores: Json<serde_json::Value>,
    pub(crate) total_score: f64,
    pub(crate) total_possible_score: f64,
    pub(crate) violations: i32,
    pub(crate) submit_reason: SubmitReason,
    pub(crate) submitted_at: PrimitiveDateTime,
}
