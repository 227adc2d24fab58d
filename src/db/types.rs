use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "questionkind", rename_all = "snake_case")]
pub(crate) enum QuestionKind {
    ShortAnswer,
    Paragraph,
    MultipleChoice,
    Checkboxes,
    Dropdown,
    LinearScale,
    Date,
    Time,
    FileUpload,
}

impl QuestionKind {
    /// Checkbox answers are sets; every other kind carries a single value.
    pub(crate) fn is_multi_value(self) -> bool {
        matches!(self, QuestionKind::Checkboxes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "submitreason", rename_all = "snake_case")]
pub(crate) enum SubmitReason {
    Manual,
    TimerExpired,
    Violations,
}

impl SubmitReason {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SubmitReason::Manual => "manual",
            SubmitReason::TimerExpired => "timer_expired",
            SubmitReason::Violations => "violations",
        }
    }
}
