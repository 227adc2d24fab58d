use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db::models::Question;

/// Per-question grading outcome. `earned` is None for questions with no
/// correct answer on file (ungraded, never counted toward the total).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct QuestionScore {
    pub(crate) question_id: String,
    pub(crate) earned: Option<f64>,
    pub(crate) possible: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScoreReport {
    pub(crate) per_question: Vec<QuestionScore>,
    pub(crate) total_score: f64,
    pub(crate) total_possible_score: f64,
}

/// Grades an answer map against the form's questions, in question order.
/// Pure and deterministic; never partial-credits a checkbox set.
pub(crate) fn score(questions: &[Question], answers: &Map<String, Value>) -> ScoreReport {
    let mut per_question = Vec::with_capacity(questions.len());
    let mut total_score = 0.0;
    let mut total_possible_score = 0.0;

    for question in questions {
        let possible = question.points;
        total_possible_score += possible;

        let Some(correct) = scoreable_answer(&question.correct_answer.0) else {
            per_question.push(QuestionScore {
                question_id: question.id.clone(),
                earned: None,
                possible,
            });
            continue;
        };

        let given = answers.get(&question.id);
        let earned = match correct {
            CorrectAnswer::Set(expected) => {
                if checkbox_match(&expected, given) {
                    possible
                } else {
                    0.0
                }
            }
            CorrectAnswer::Single(expected) => {
                let matched = given
                    .and_then(value_as_text)
                    .map(|answer| normalize(&answer) == expected)
                    .unwrap_or(false);
                if matched {
                    possible
                } else {
                    0.0
                }
            }
        };

        total_score += earned;
        per_question.push(QuestionScore {
            question_id: question.id.clone(),
            earned: Some(earned),
            possible,
        });
    }

    ScoreReport { per_question, total_score, total_possible_score }
}

enum CorrectAnswer {
    Single(String),
    Set(HashSet<String>),
}

/// None when the question carries no usable correct answer (null, empty
/// string, or an empty / all-blank array).
fn scoreable_answer(correct: &Value) -> Option<CorrectAnswer> {
    match correct {
        Value::Null => None,
        Value::String(text) => {
            let normalized = normalize(text);
            if normalized.is_empty() {
                None
            } else {
                Some(CorrectAnswer::Single(normalized))
            }
        }
        Value::Array(items) => {
            let expected: HashSet<String> = items
                .iter()
                .filter_map(value_as_text)
                .map(|item| normalize(&item))
                .filter(|item| !item.is_empty())
                .collect();
            if expected.is_empty() {
                None
            } else {
                Some(CorrectAnswer::Set(expected))
            }
        }
        other => {
            let text = value_as_text(other)?;
            let normalized = normalize(&text);
            if normalized.is_empty() {
                None
            } else {
                Some(CorrectAnswer::Single(normalized))
            }
        }
    }
}

/// Exact-set match: equal cardinality and every expected element present.
fn checkbox_match(expected: &HashSet<String>, given: Option<&Value>) -> bool {
    let Some(Value::Array(items)) = given else {
        return false;
    };

    let selected: HashSet<String> = items
        .iter()
        .filter_map(value_as_text)
        .map(|item| normalize(&item))
        .filter(|item| !item.is_empty())
        .collect();

    selected.len() == expected.len() && expected.iter().all(|item| selected.contains(item))
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::types::Json;
    use time::{Date, PrimitiveDateTime, Time};

    use crate::db::types::QuestionKind;

    fn stamp() -> PrimitiveDateTime {
        let date = Date::from_calendar_date(2026, time::Month::May, 1).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(12, 0, 0).unwrap())
    }

    fn question(id: &str, kind: QuestionKind, points: f64, correct: Value) -> Question {
        Question {
            id: id.to_string(),
            form_id: "form-1".to_string(),
            kind,
            label: format!("Question {id}"),
            options: Json(Vec::new()),
            required: false,
            points,
            correct_answer: Json(correct),
            scale_min: None,
            scale_max: None,
            scale_min_label: None,
            scale_max_label: None,
            order_index: 0,
            created_at: stamp(),
        }
    }

    fn answers(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs.iter().map(|(id, value)| (id.to_string(), value.clone())).collect()
    }

    #[test]
    fn single_answer_ignores_case_and_whitespace() {
        let questions = vec![question("q1", QuestionKind::ShortAnswer, 2.0, json!("Paris"))];
        let report = score(&questions, &answers(&[("q1", json!(" paris "))]));

        assert_eq!(report.total_score, 2.0);
        assert_eq!(report.total_possible_score, 2.0);
        assert_eq!(report.per_question[0].earned, Some(2.0));
    }

    #[test]
    fn wrong_single_answer_scores_zero() {
        let questions = vec![question("q1", QuestionKind::MultipleChoice, 3.0, json!("Blue"))];
        let report = score(&questions, &answers(&[("q1", json!("red"))]));

        assert_eq!(report.total_score, 0.0);
        assert_eq!(report.per_question[0].earned, Some(0.0));
    }

    #[test]
    fn ungraded_question_yields_null_but_counts_toward_possible() {
        let questions = vec![
            question("q1", QuestionKind::Paragraph, 5.0, Value::Null),
            question("q2", QuestionKind::ShortAnswer, 1.0, json!("42")),
        ];
        let report = score(&questions, &answers(&[("q1", json!("essay")), ("q2", json!("42"))]));

        assert_eq!(report.per_question[0].earned, None);
        assert_eq!(report.per_question[0].possible, 5.0);
        assert_eq!(report.total_score, 1.0);
        assert_eq!(report.total_possible_score, 6.0);
    }

    #[test]
    fn empty_correct_string_is_treated_as_ungraded() {
        let questions = vec![question("q1", QuestionKind::ShortAnswer, 1.0, json!("  "))];
        let report = score(&questions, &answers(&[("q1", json!("anything"))]));

        assert_eq!(report.per_question[0].earned, None);
        assert_eq!(report.total_score, 0.0);
    }

    #[test]
    fn checkbox_match_is_order_independent() {
        let questions =
            vec![question("q1", QuestionKind::Checkboxes, 4.0, json!(["A", "B"]))];
        let report = score(&questions, &answers(&[("q1", json!(["b", " a "]))]));

        assert_eq!(report.total_score, 4.0);
    }

    #[test]
    fn checkbox_subset_scores_zero() {
        let questions =
            vec![question("q1", QuestionKind::Checkboxes, 4.0, json!(["A", "B"]))];
        let report = score(&questions, &answers(&[("q1", json!(["A"]))]));

        assert_eq!(report.total_score, 0.0);
        assert_eq!(report.per_question[0].earned, Some(0.0));
    }

    #[test]
    fn checkbox_superset_scores_zero() {
        let questions =
            vec![question("q1", QuestionKind::Checkboxes, 4.0, json!(["A", "B"]))];
        let report = score(&questions, &answers(&[("q1", json!(["A", "B", "C"]))]));

        assert_eq!(report.total_score, 0.0);
    }

    #[test]
    fn numeric_answers_match_numeric_correct_values() {
        let questions = vec![question("q1", QuestionKind::LinearScale, 1.0, json!("4"))];
        let report = score(&questions, &answers(&[("q1", json!(4))]));

        assert_eq!(report.total_score, 1.0);
    }

    #[test]
    fn missing_answer_scores_zero_not_null() {
        let questions = vec![question("q1", QuestionKind::ShortAnswer, 2.0, json!("x"))];
        let report = score(&questions, &answers(&[]));

        assert_eq!(report.per_question[0].earned, Some(0.0));
        assert_eq!(report.total_possible_score, 2.0);
    }

    #[test]
    fn total_never_exceeds_possible() {
        let questions = vec![
            question("q1", QuestionKind::ShortAnswer, 2.0, json!("a")),
            question("q2", QuestionKind::Checkboxes, 3.0, json!(["x", "y"])),
            question("q3", QuestionKind::Dropdown, 1.5, Value::Null),
        ];
        let report = score(
            &questions,
            &answers(&[("q1", json!("a")), ("q2", json!(["y", "x"])), ("q3", json!("z"))]),
        );

        assert!(report.total_score <= report.total_possible_score);
        assert_eq!(report.total_score, 5.0);
        assert_eq!(report.total_possible_score, 6.5);
    }

    #[test]
    fn scoring_is_deterministic() {
        let questions = vec![
            question("q1", QuestionKind::ShortAnswer, 1.0, json!("a")),
            question("q2", QuestionKind::Checkboxes, 2.0, json!(["m", "n"])),
        ];
        let map = answers(&[("q1", json!("A ")), ("q2", json!(["N", "m"]))]);

        assert_eq!(score(&questions, &map), score(&questions, &map));
    }
}
