use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Form, Question, QuestionOption};
use crate::db::types::QuestionKind;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    pub(crate) kind: QuestionKind,
    #[validate(length(min = 1, message = "label must not be empty"))]
    pub(crate) label: String,
    #[serde(default)]
    pub(crate) options: Vec<QuestionOption>,
    #[serde(default)]
    pub(crate) required: bool,
    #[serde(default = "default_points")]
    #[validate(range(min = 0.0, message = "points must be non-negative"))]
    pub(crate) points: f64,
    /// `null`, a single string, or an array of strings for checkboxes.
    #[serde(default)]
    #[serde(alias = "correctAnswer")]
    pub(crate) correct_answer: serde_json::Value,
    #[serde(default)]
    #[serde(alias = "scaleMin")]
    pub(crate) scale_min: Option<i32>,
    #[serde(default)]
    #[serde(alias = "scaleMax")]
    pub(crate) scale_max: Option<i32>,
    #[serde(default)]
    #[serde(alias = "scaleMinLabel")]
    pub(crate) scale_min_label: Option<String>,
    #[serde(default)]
    #[serde(alias = "scaleMaxLabel")]
    pub(crate) scale_max_label: Option<String>,
}

fn default_points() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct FormCreate {
    #[validate(length(min = 1, max = 300, message = "title must be 1 to 300 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "examMode")]
    pub(crate) exam_mode: bool,
    #[serde(default)]
    #[serde(alias = "durationMinutes")]
    #[validate(range(min = 1, max = 600, message = "duration_minutes must be 1 to 600"))]
    pub(crate) duration_minutes: Option<i32>,
    #[serde(default)]
    #[serde(alias = "maxViolations")]
    #[validate(range(min = 1, message = "max_violations must be positive"))]
    pub(crate) max_violations: Option<i32>,
    #[serde(default)]
    #[serde(alias = "shuffleQuestions")]
    pub(crate) shuffle_questions: bool,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Vec<QuestionCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct FormUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 300, message = "title must be 1 to 300 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "examMode")]
    pub(crate) exam_mode: Option<bool>,
    #[serde(default)]
    #[serde(alias = "durationMinutes")]
    #[validate(range(min = 1, max = 600, message = "duration_minutes must be 1 to 600"))]
    pub(crate) duration_minutes: Option<i32>,
    #[serde(default)]
    #[serde(alias = "maxViolations")]
    #[validate(range(min = 1, message = "max_violations must be positive"))]
    pub(crate) max_violations: Option<i32>,
    #[serde(default)]
    #[serde(alias = "shuffleQuestions")]
    pub(crate) shuffle_questions: Option<bool>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Option<Vec<QuestionCreate>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FormPublish {
    pub(crate) is_published: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) kind: QuestionKind,
    pub(crate) label: String,
    pub(crate) options: Vec<QuestionOption>,
    pub(crate) required: bool,
    pub(crate) points: f64,
    pub(crate) correct_answer: serde_json::Value,
    pub(crate) scale_min: Option<i32>,
    pub(crate) scale_max: Option<i32>,
    pub(crate) scale_min_label: Option<String>,
    pub(crate) scale_max_label: Option<String>,
    pub(crate) order_index: i32,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            kind: question.kind,
            label: question.label,
            options: question.options.0,
            required: question.required,
            points: question.points,
            correct_answer: question.correct_answer.0,
            scale_min: question.scale_min,
            scale_max: question.scale_max,
            scale_min_label: question.scale_min_label,
            scale_max_label: question.scale_max_label,
            order_index: question.order_index,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FormDetailResponse {
    pub(crate) id: String,
    pub(crate) owner_id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) exam_mode: bool,
    pub(crate) duration_minutes: i32,
    pub(crate) max_violations: i32,
    pub(crate) shuffle_questions: bool,
    pub(crate) is_published: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
    pub(crate) questions: Vec<QuestionResponse>,
}

impl FormDetailResponse {
    pub(crate) fn from_db(form: Form, questions: Vec<Question>) -> Self {
        Self {
            id: form.id,
            owner_id: form.owner_id,
            title: form.title,
            description: form.description,
            exam_mode: form.exam_mode,
            duration_minutes: form.duration_minutes,
            max_violations: form.max_violations,
            shuffle_questions: form.shuffle_questions,
            is_published: form.is_published,
            created_at: format_primitive(form.created_at),
            updated_at: format_primitive(form.updated_at),
            questions: questions.into_iter().map(QuestionResponse::from_db).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FormSummaryResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) exam_mode: bool,
    pub(crate) is_published: bool,
    pub(crate) question_count: i64,
    pub(crate) response_count: i64,
    pub(crate) created_at: String,
}

/// Question as seen by a student taking the exam. Grading data stays private.
#[derive(Debug, Serialize)]
pub(crate) struct PublicQuestion {
    pub(crate) id: String,
    pub(crate) kind: QuestionKind,
    pub(crate) label: String,
    pub(crate) options: Vec<QuestionOption>,
    pub(crate) required: bool,
    pub(crate) scale_min: Option<i32>,
    pub(crate) scale_max: Option<i32>,
    pub(crate) scale_min_label: Option<String>,
    pub(crate) scale_max_label: Option<String>,
    pub(crate) order_index: i32,
}

impl PublicQuestion {
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            kind: question.kind,
            label: question.label,
            options: question.options.0,
            required: question.required,
            scale_min: question.scale_min,
            scale_max: question.scale_max,
            scale_min_label: question.scale_min_label,
            scale_max_label: question.scale_max_label,
            order_index: question.order_index,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PublicFormResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) exam_mode: bool,
    pub(crate) duration_minutes: i32,
    pub(crate) max_violations: i32,
    pub(crate) shuffle_questions: bool,
    pub(crate) questions: Vec<PublicQuestion>,
}

impl PublicFormResponse {
    pub(crate) fn from_db(form: Form, questions: Vec<Question>) -> Self {
        Self {
            id: form.id,
            title: form.title,
            description: form.description,
            exam_mode: form.exam_mode,
            duration_minutes: form.duration_minutes,
            max_violations: form.max_violations,
            shuffle_questions: form.shuffle_questions,
            questions: questions.into_iter().map(PublicQuestion::from_db).collect(),
        }
    }
}
