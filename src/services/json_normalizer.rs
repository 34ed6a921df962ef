use crate::models::candidate::{CandidateQuestion, ParseError};
use crate::models::question::QuestionType;
use serde_json::{json, Map, Value as JsonValue};

pub const INVALID_JSON: &str = "Invalid JSON format";
pub const INVALID_SHAPE: &str =
    "Invalid format: expected an array of questions or an object with a \"questions\" array";

const MULTIPLE_CHOICE_SLOTS: usize = 10;
const TRUE_FALSE_SLOTS: usize = 2;

const NULLABLE_FIELDS: [&str; 8] = [
    "hint",
    "time_limit",
    "correct_feedback",
    "incorrect_feedback",
    "image_url",
    "folder_id",
    "category_id",
    "grade_id",
];

/// Parses a JSON import document into candidates numbered from 1.
///
/// Accepts a bare array or a `{"questions": [...]}` envelope. Anything else,
/// including a syntax error, rejects the whole document.
pub fn normalize(text: &str) -> Result<Vec<CandidateQuestion>, ParseError> {
    let document: JsonValue =
        serde_json::from_str(text).map_err(|_| ParseError::document(INVALID_JSON))?;

    let elements = match document {
        JsonValue::Array(items) => items,
        JsonValue::Object(mut envelope) => match envelope.remove("questions") {
            Some(JsonValue::Array(items)) => items,
            _ => return Err(ParseError::document(INVALID_SHAPE)),
        },
        _ => return Err(ParseError::document(INVALID_SHAPE)),
    };

    Ok(elements
        .into_iter()
        .enumerate()
        .map(|(idx, element)| {
            let fields = match element {
                JsonValue::Object(map) => normalize_fields(map),
                _ => Map::new(),
            };
            CandidateQuestion::new(idx + 1, fields)
        })
        .collect())
}

/// Rewrites one record into the canonical shape for its declared type.
/// Records with a missing or unknown type keep their variant fields as-is
/// and are rejected later by the validator.
pub fn normalize_fields(mut fields: Map<String, JsonValue>) -> Map<String, JsonValue> {
    let question_type = fields
        .get("type")
        .and_then(|v| v.as_str())
        .and_then(QuestionType::from_name);

    if let Some(question_type) = question_type {
        fields.insert("type".to_string(), json!(question_type.as_str()));
        match question_type {
            QuestionType::MultipleChoice => fold_flat_answers(&mut fields, MULTIPLE_CHOICE_SLOTS),
            QuestionType::TrueFalse => fold_flat_answers(&mut fields, TRUE_FALSE_SLOTS),
            QuestionType::FreeText => fold_accepted_answers(&mut fields),
            QuestionType::Matching => fold_matching_pairs(&mut fields),
        }
    }

    for key in NULLABLE_FIELDS {
        fields.entry(key).or_insert(JsonValue::Null);
    }
    let is_public = fields.get("is_public").map(truthy).unwrap_or(false);
    fields.insert("is_public".to_string(), json!(is_public));

    fields
}

/// Loose boolean used for correctness flags and `is_public` in both formats.
pub fn truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        JsonValue::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "y"
        ),
        _ => false,
    }
}

fn fold_flat_answers(fields: &mut Map<String, JsonValue>, slots: usize) {
    let has_answers = matches!(fields.get("answers"), Some(JsonValue::Array(_)));

    let mut answers = Vec::new();
    for slot in 1..=slots {
        let key = format!("answer{}", slot);
        let flag_key = format!("answer{}_correct", slot);
        let content = fields.remove(&key);
        let flag = fields.remove(&flag_key);
        if has_answers {
            continue;
        }

        let content = match content {
            Some(JsonValue::String(s)) if !s.trim().is_empty() => s,
            Some(JsonValue::Number(n)) => n.to_string(),
            Some(JsonValue::Bool(b)) => b.to_string(),
            _ => continue,
        };
        answers.push(json!({
            "content": content,
            "is_correct": flag.as_ref().map(truthy).unwrap_or(false),
            "order_index": slot - 1,
        }));
    }

    if !has_answers {
        fields.insert("answers".to_string(), JsonValue::Array(answers));
    }
}

fn fold_accepted_answers(fields: &mut Map<String, JsonValue>) {
    let shared_criteria = fields
        .get("grading_criteria")
        .filter(|v| v.is_string())
        .cloned()
        .unwrap_or(JsonValue::Null);

    let source = fields
        .remove("accepted_answers")
        .or_else(|| fields.remove("acceptedAnswers"));

    let accepted = match source {
        Some(JsonValue::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                JsonValue::Object(mut entry) => {
                    let criteria = entry
                        .remove("grading_criteria")
                        .filter(|v| !v.is_null())
                        .unwrap_or_else(|| shared_criteria.clone());
                    json!({
                        "content": entry.remove("content").unwrap_or(JsonValue::Null),
                        "grading_criteria": criteria,
                    })
                }
                other => json!({
                    "content": other,
                    "grading_criteria": shared_criteria.clone(),
                }),
            })
            .collect(),
        Some(JsonValue::String(single)) => vec![json!({
            "content": single,
            "grading_criteria": shared_criteria.clone(),
        })],
        _ => Vec::new(),
    };

    fields.insert("accepted_answers".to_string(), JsonValue::Array(accepted));
}

fn fold_matching_pairs(fields: &mut Map<String, JsonValue>) {
    let source = match fields.remove("matching_pairs") {
        Some(JsonValue::Array(items)) => Some(items),
        _ => None,
    };

    let Some(items) = source else {
        if !matches!(fields.get("pairs"), Some(JsonValue::Array(_))) {
            fields.insert("pairs".to_string(), json!([]));
        }
        return;
    };

    let pairs: Vec<JsonValue> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            json!({
                "id": format!("pair_{}", idx),
                "left": item.get("left").cloned().unwrap_or(JsonValue::Null),
                "right": item.get("right").cloned().unwrap_or(JsonValue::Null),
            })
        })
        .collect();
    fields.insert("pairs".to_string(), JsonValue::Array(pairs));

    let metadata = fields
        .entry("metadata")
        .or_insert_with(|| JsonValue::Object(Map::new()));
    if !metadata.is_object() {
        *metadata = JsonValue::Object(Map::new());
    }
    if let JsonValue::Object(meta) = metadata {
        meta.insert("matching_pairs".to_string(), JsonValue::Array(items));
    }
}
