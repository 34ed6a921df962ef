use crate::models::candidate::CandidateQuestion;
use crate::models::question::{
    AcceptedAnswer, Answer, MatchingPair, Question, QuestionBody, QuestionSettings, QuestionType,
};
use crate::services::json_normalizer::truthy;
use serde_json::Value as JsonValue;
use uuid::Uuid;

pub const MULTIPLE_CHOICE_ANSWERS: (usize, usize) = (2, 10);
pub const FREE_TEXT_ANSWERS: (usize, usize) = (1, 20);
pub const MATCHING_PAIRS: (usize, usize) = (2, 10);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Question content is required")]
    MissingContent,

    #[error("Question type is required")]
    MissingType,

    #[error("Unsupported question type: {0}")]
    UnsupportedType(String),

    #[error("{question_type} questions require between {min} and {max} {items}, got {got}")]
    ItemCount {
        question_type: QuestionType,
        items: &'static str,
        min: usize,
        max: usize,
        got: usize,
    },

    #[error("{items} {position} is missing its content")]
    EmptyItem { items: &'static str, position: usize },

    #[error("at least one answer must be marked correct")]
    NoCorrectAnswer,

    #[error("true_false questions require exactly two answers: \"true\" and \"false\"")]
    TrueFalseAnswers,

    #[error("true_false questions require exactly one correct answer")]
    TrueFalseCorrectCount,

    #[error("Pair {0} must have both a left and a right side")]
    IncompletePair(usize),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Checks one candidate against the structural rules of its declared type.
pub fn validate(candidate: &CandidateQuestion) -> Result<Question, ValidationError> {
    let content = candidate
        .content()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(ValidationError::MissingContent)?
        .to_string();

    let type_name = candidate.type_name().ok_or(ValidationError::MissingType)?;
    let question_type = QuestionType::from_name(type_name)
        .ok_or_else(|| ValidationError::UnsupportedType(type_name.to_string()))?;

    let body = match question_type {
        QuestionType::MultipleChoice => validate_multiple_choice(candidate)?,
        QuestionType::TrueFalse => validate_true_false(candidate)?,
        QuestionType::FreeText => validate_free_text(candidate)?,
        QuestionType::Matching => validate_matching(candidate)?,
    };

    Ok(Question {
        content,
        body,
        settings: settings_from(candidate)?,
    })
}

fn check_count(
    question_type: QuestionType,
    items: &'static str,
    (min, max): (usize, usize),
    got: usize,
) -> Result<(), ValidationError> {
    if got < min || got > max {
        return Err(ValidationError::ItemCount {
            question_type,
            items,
            min,
            max,
            got,
        });
    }
    Ok(())
}

fn array_field<'a>(candidate: &'a CandidateQuestion, key: &str) -> &'a [JsonValue] {
    candidate
        .get(key)
        .and_then(|v| v.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn text_of(value: Option<&JsonValue>) -> Option<String> {
    let text = match value? {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        _ => return None,
    };
    Some(text).filter(|s| !s.is_empty())
}

fn parse_answers(items: &[JsonValue]) -> Result<Vec<Answer>, ValidationError> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| -> Result<Answer, ValidationError> {
            let (content, is_correct, order_index) = match item {
                JsonValue::Object(entry) => (
                    text_of(entry.get("content")),
                    entry.get("is_correct").map(truthy).unwrap_or(false),
                    entry.get("order_index").and_then(|v| v.as_u64()),
                ),
                other => (text_of(Some(other)), false, None),
            };
            let content = content.ok_or(ValidationError::EmptyItem {
                items: "Answer",
                position: idx + 1,
            })?;
            let order_index = match order_index {
                Some(raw) => u32::try_from(raw).map_err(|_| ValidationError::InvalidField {
                    field: "order_index",
                    reason: format!("answer {} has out-of-range position {}", idx + 1, raw),
                })?,
                None => idx as u32,
            };
            Ok(Answer {
                content,
                is_correct,
                order_index,
            })
        })
        .collect()
}

fn validate_multiple_choice(candidate: &CandidateQuestion) -> Result<QuestionBody, ValidationError> {
    let items = array_field(candidate, "answers");
    check_count(
        QuestionType::MultipleChoice,
        "answers",
        MULTIPLE_CHOICE_ANSWERS,
        items.len(),
    )?;

    let answers = parse_answers(items)?;
    if !answers.iter().any(|a| a.is_correct) {
        return Err(ValidationError::NoCorrectAnswer);
    }
    Ok(QuestionBody::MultipleChoice { answers })
}

fn validate_true_false(candidate: &CandidateQuestion) -> Result<QuestionBody, ValidationError> {
    let items = array_field(candidate, "answers");
    if items.len() != 2 {
        return Err(ValidationError::TrueFalseAnswers);
    }

    let answers = parse_answers(items)?;
    let mut labels: Vec<String> = answers.iter().map(|a| a.content.to_lowercase()).collect();
    labels.sort();
    if labels != ["false", "true"] {
        return Err(ValidationError::TrueFalseAnswers);
    }
    if answers.iter().filter(|a| a.is_correct).count() != 1 {
        return Err(ValidationError::TrueFalseCorrectCount);
    }
    Ok(QuestionBody::TrueFalse { answers })
}

fn validate_free_text(candidate: &CandidateQuestion) -> Result<QuestionBody, ValidationError> {
    let items = array_field(candidate, "accepted_answers");
    check_count(
        QuestionType::FreeText,
        "accepted answers",
        FREE_TEXT_ANSWERS,
        items.len(),
    )?;

    let accepted_answers = items
        .iter()
        .enumerate()
        .map(|(idx, item)| -> Result<AcceptedAnswer, ValidationError> {
            let (content, criteria) = match item {
                JsonValue::Object(entry) => (
                    text_of(entry.get("content")),
                    text_of(entry.get("grading_criteria")),
                ),
                other => (text_of(Some(other)), None),
            };
            let content = content.ok_or(ValidationError::EmptyItem {
                items: "Accepted answer",
                position: idx + 1,
            })?;
            Ok(AcceptedAnswer {
                content,
                grading_criteria: criteria,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QuestionBody::FreeText { accepted_answers })
}

fn validate_matching(candidate: &CandidateQuestion) -> Result<QuestionBody, ValidationError> {
    let items = array_field(candidate, "pairs");
    check_count(QuestionType::Matching, "pairs", MATCHING_PAIRS, items.len())?;

    let pairs = items
        .iter()
        .enumerate()
        .map(|(idx, item)| -> Result<MatchingPair, ValidationError> {
            let left = text_of(item.get("left"));
            let right = text_of(item.get("right"));
            match (left, right) {
                (Some(left), Some(right)) => Ok(MatchingPair {
                    id: text_of(item.get("id")).unwrap_or_else(|| format!("pair_{}", idx)),
                    left,
                    right,
                }),
                _ => Err(ValidationError::IncompletePair(idx + 1)),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QuestionBody::Matching { pairs })
}

fn settings_from(candidate: &CandidateQuestion) -> Result<QuestionSettings, ValidationError> {
    Ok(QuestionSettings {
        time_limit: time_limit(candidate.get("time_limit"))?,
        hint: text_of(candidate.get("hint")),
        correct_feedback: text_of(candidate.get("correct_feedback")),
        incorrect_feedback: text_of(candidate.get("incorrect_feedback")),
        is_public: candidate.get("is_public").map(truthy).unwrap_or(false),
        image_url: text_of(candidate.get("image_url")),
        folder_id: uuid_field(candidate, "folder_id")?,
        category_id: uuid_field(candidate, "category_id")?,
        grade_id: uuid_field(candidate, "grade_id")?,
        metadata: candidate.get("metadata").cloned(),
    })
}

fn time_limit(value: Option<&JsonValue>) -> Result<Option<u32>, ValidationError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let seconds: Option<u32> = match raw {
        JsonValue::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        JsonValue::String(s) if s.trim().is_empty() => return Ok(None),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    // Stored in an INTEGER column.
    match seconds {
        Some(v) if i32::try_from(v).is_ok() => Ok(Some(v)),
        _ => Err(ValidationError::InvalidField {
            field: "time_limit",
            reason: format!(
                "expected a whole number of seconds up to {}, got {}",
                i32::MAX,
                raw
            ),
        }),
    }
}

fn uuid_field(
    candidate: &CandidateQuestion,
    field: &'static str,
) -> Result<Option<Uuid>, ValidationError> {
    let Some(raw) = text_of(candidate.get(field)) else {
        return Ok(None);
    };
    Uuid::parse_str(&raw)
        .map(Some)
        .map_err(|_| ValidationError::InvalidField {
            field,
            reason: format!("'{}' is not a valid UUID", raw),
        })
}
