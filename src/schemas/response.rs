use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::FormResponse;
use crate::db::types::SubmitReason;

#[derive(Debug, Serialize)]
pub(crate) struct ResponseSummary {
    pub(crate) id: String,
    pub(crate) student_name: String,
    pub(crate) total_score: f64,
    pub(crate) total_possible_score: f64,
    pub(crate) violations: i32,
    pub(crate) submit_reason: SubmitReason,
    pub(crate) submitted_at: String,
}

impl ResponseSummary {
    pub(crate) fn from_db(response: FormResponse) -> Self {
        Self {
            id: response.id,
            student_name: response.student_name,
            total_score: response.total_score,
            total_possible_score: response.total_possible_score,
            violations: response.violations,
            submit_reason: response.submit_reason,
            submitted_at: format_primitive(response.submitted_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ResponseDetail {
    pub(crate) id: String,
    pub(crate) form_id: String,
    pub(crate) exam_session_id: Option<String>,
    pub(crate) student_name: String,
    pub(crate) answers: serde_json::Value,
    pub(crate) question_scores: serde_json::Value,
    pub(crate) total_score: f64,
    pub(crate) total_possible_score: f64,
    pub(crate) violations: i32,
    pub(crate) submit_reason: SubmitReason,
    pub(crate) submitted_at: String,
}

impl ResponseDetail {
    pub(crate) fn from_db(response: FormResponse) -> Self {
        Self {
            id: response.id,
            form_id: response.form_id,
            exam_session_id: response.exam_session_id,
            student_name: response.student_name,
            answers: response.answers.0,
            question_scores: response.question_scores.0,
            total_score: response.total_score,
            total_possible_score: response.total_possible_score,
            violations: response.violations,
            submit_reason: response.submit_reason,
            submitted_at: format_primitive(response.submitted_at),
        }
    }
}
