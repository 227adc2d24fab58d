use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::ExamSession;
use crate::services::session_clock::{format_remaining, ClockState};

#[derive(Debug, Deserialize)]
pub(crate) struct SessionStart {
    #[serde(alias = "studentName")]
    pub(crate) student_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionView {
    pub(crate) id: String,
    pub(crate) form_id: String,
    pub(crate) student_name: String,
    pub(crate) started_at: String,
    pub(crate) ends_at: String,
    pub(crate) remaining_seconds: i64,
    pub(crate) remaining_display: String,
    pub(crate) urgency: String,
    pub(crate) progress: f64,
    pub(crate) violations: i32,
    pub(crate) max_violations: i32,
    pub(crate) submitted: bool,
    pub(crate) submit_reason: Option<String>,
}

impl SessionView {
    pub(crate) fn from_db(session: ExamSession, state: ClockState, max_violations: i32) -> Self {
        let submitted = session.is_submitted();
        Self {
            id: session.id,
            form_id: session.form_id,
            student_name: session.student_name,
            started_at: format_primitive(session.started_at),
            ends_at: format_primitive(session.ends_at),
            remaining_seconds: state.remaining.whole_seconds(),
            remaining_display: format_remaining(state.remaining),
            urgency: state.urgency.as_str().to_string(),
            progress: state.progress,
            violations: session.violations,
            max_violations,
            submitted,
            submit_reason: session.submit_reason.map(|r| r.as_str().to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionStartResponse {
    #[serde(flatten)]
    pub(crate) session: SessionView,
    pub(crate) resumed: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AutoSavePayload {
    pub(crate) answers: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct AutoSaveResponse {
    pub(crate) status: String,
    pub(crate) saved_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ViolationReportResponse {
    pub(crate) status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<String>,
    pub(crate) violations: i32,
    pub(crate) terminal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) countdown_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitPayload {
    #[serde(default)]
    pub(crate) answers: Option<serde_json::Value>,
    /// Client-reported trigger; omitted for a plain manual submit.
    #[serde(default)]
    pub(crate) reason: Option<crate::db::types::SubmitReason>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitReceipt {
    pub(crate) response_id: String,
    pub(crate) submit_reason: String,
    pub(crate) total_score: f64,
    pub(crate) total_possible_score: f64,
    pub(crate) submitted_at: String,
    pub(crate) duplicate: bool,
}
