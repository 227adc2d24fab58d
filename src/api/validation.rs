use crate::api::errors::ApiError;
use crate::db::types::QuestionKind;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn validate_username(username: &str) -> Result<(), ApiError> {
    let valid = (3..=64).contains(&username.chars().count())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid username format".to_string()))
    }
}

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

/// Grading keys are `null`, a single scalar, or an array of strings for
/// checkbox questions.
pub(crate) fn validate_correct_answer(
    kind: QuestionKind,
    correct_answer: &serde_json::Value,
) -> Result<(), ApiError> {
    use serde_json::Value;

    match correct_answer {
        Value::Null | Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(()),
        Value::Array(items) if kind.is_multi_value() => {
            if items.iter().all(|item| item.is_string()) {
                Ok(())
            } else {
                Err(ApiError::BadRequest(
                    "correct_answer array must contain only strings".to_string(),
                ))
            }
        }
        _ => Err(ApiError::BadRequest(format!(
            "correct_answer has an invalid shape for a {kind:?} question"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn username_rules() {
        assert!(validate_username("teacher_01").is_ok());
        assert!(validate_username("a.b-c").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn password_length() {
        assert!(validate_password_len("longenough").is_ok());
        assert!(validate_password_len("short").is_err());
    }

    #[test]
    fn correct_answer_shapes() {
        assert!(validate_correct_answer(QuestionKind::ShortAnswer, &json!(null)).is_ok());
        assert!(validate_correct_answer(QuestionKind::ShortAnswer, &json!("Paris")).is_ok());
        assert!(validate_correct_answer(QuestionKind::LinearScale, &json!(4)).is_ok());
        assert!(validate_correct_answer(QuestionKind::Checkboxes, &json!(["a", "b"])).is_ok());
        assert!(validate_correct_answer(QuestionKind::ShortAnswer, &json!(["a"])).is_err());
        assert!(validate_correct_answer(QuestionKind::Checkboxes, &json!([1, 2])).is_err());
        assert!(validate_correct_answer(QuestionKind::ShortAnswer, &json!({"x": 1})).is_err());
    }
}
