use crate::models::candidate::{CandidateQuestion, ParseError};
use crate::models::question::QuestionType;
use crate::services::json_normalizer::normalize_fields;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::{json, Map, Value as JsonValue};

pub const TEMPLATE_HEADER: [&str; 8] = [
    "content",
    "type",
    "answers",
    "correct_feedback",
    "incorrect_feedback",
    "hint",
    "time_limit",
    "is_public",
];
const REQUIRED_COLUMNS: [&str; 2] = ["content", "type"];
const PASSTHROUGH_COLUMNS: [&str; 4] = ["image_url", "folder_id", "category_id", "grade_id"];

const LIST_DELIMITER: char = '|';
const CORRECT_MARKER: char = '*';
const PAIR_SEPARATOR: char = '=';

/// Decodes CSV import text. Data rows are numbered by source line, so the
/// first data row is row 2.
///
/// Row-level failures are collected and decoding carries on; a missing or
/// incomplete header yields a single error at row 1 and no candidates.
pub fn decode(text: &str) -> (Vec<CandidateQuestion>, Vec<ParseError>) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return (
            Vec::new(),
            vec![ParseError::document("CSV file is empty or missing a header row")],
        );
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(record) => record.iter().map(|h| h.trim().to_lowercase()).collect(),
        Err(e) => {
            return (
                Vec::new(),
                vec![ParseError::document(format!("Unreadable CSV header: {}", e))],
            )
        }
    };

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|h| h == required))
        .collect();
    if !missing.is_empty() {
        return (
            Vec::new(),
            vec![ParseError::document(format!(
                "Missing required column(s): {}",
                missing.join(", ")
            ))],
        );
    }

    let ignored: Vec<&str> = headers
        .iter()
        .map(String::as_str)
        .filter(|h| !TEMPLATE_HEADER.contains(h) && !PASSTHROUGH_COLUMNS.contains(h))
        .collect();
    if !ignored.is_empty() {
        tracing::debug!(columns = ?ignored, "Ignoring unrecognized CSV columns");
    }

    let mut candidates = Vec::new();
    let mut errors = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 2;
        let decoded = result
            .map_err(|e| ParseError::new(row, describe_csv_error(&e)))
            .and_then(|record| decode_record(row, &headers, &record));
        match decoded {
            Ok(fields) => candidates.push(CandidateQuestion::new(row, fields)),
            Err(e) => {
                tracing::debug!(row, error = %e.message, "CSV row rejected");
                errors.push(e);
            }
        }
    }

    (candidates, errors)
}

fn describe_csv_error(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!(
            "Column count mismatch: expected {} columns, found {}",
            expected_len, len
        ),
        _ => format!("Malformed CSV row: {}", err),
    }
}

fn decode_record(
    row: usize,
    headers: &[String],
    record: &StringRecord,
) -> Result<Map<String, JsonValue>, ParseError> {
    let mut fields = Map::new();
    let mut answers_cell = None;

    for (header, value) in headers.iter().zip(record.iter()) {
        if value.is_empty() {
            continue;
        }
        match header.as_str() {
            "content" | "type" | "hint" | "correct_feedback" | "incorrect_feedback" => {
                fields.insert(header.clone(), json!(value));
            }
            "answers" => answers_cell = Some(value),
            "time_limit" => {
                let seconds: u32 = value.parse().map_err(|_| {
                    ParseError::new(
                        row,
                        format!(
                            "Invalid time_limit '{}': expected a whole number of seconds",
                            value
                        ),
                    )
                })?;
                fields.insert(header.clone(), json!(seconds));
            }
            "is_public" => {
                let flag = parse_flag(value).ok_or_else(|| {
                    ParseError::new(
                        row,
                        format!("Invalid is_public '{}': expected true or false", value),
                    )
                })?;
                fields.insert(header.clone(), json!(flag));
            }
            other if PASSTHROUGH_COLUMNS.contains(&other) => {
                fields.insert(header.clone(), json!(value));
            }
            _ => {}
        }
    }

    let entries = split_list(answers_cell.unwrap_or_default());
    let question_type = fields
        .get("type")
        .and_then(|v| v.as_str())
        .and_then(QuestionType::from_name);
    match question_type {
        Some(QuestionType::MultipleChoice) | Some(QuestionType::TrueFalse) => {
            fields.insert("answers".to_string(), marked_answers(&entries));
        }
        Some(QuestionType::FreeText) => {
            fields.insert("accepted_answers".to_string(), json!(entries));
        }
        Some(QuestionType::Matching) => {
            let pairs: Vec<JsonValue> = entries.iter().map(|e| split_pair(e)).collect();
            fields.insert("matching_pairs".to_string(), JsonValue::Array(pairs));
        }
        None => {
            fields.insert("answers".to_string(), json!(entries));
        }
    }

    Ok(normalize_fields(fields))
}

fn split_list(cell: &str) -> Vec<String> {
    cell.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// `*` marks a correct option. A cell without any marker treats its first
/// option as the correct one, matching the shipped template.
fn marked_answers(entries: &[String]) -> JsonValue {
    let any_marked = entries.iter().any(|e| e.starts_with(CORRECT_MARKER));
    let answers = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let (content, is_correct) = match entry.strip_prefix(CORRECT_MARKER) {
                Some(rest) => (rest.trim(), true),
                None => (entry.as_str(), !any_marked && idx == 0),
            };
            json!({
                "content": content,
                "is_correct": is_correct,
                "order_index": idx,
            })
        })
        .collect();
    JsonValue::Array(answers)
}

fn split_pair(entry: &str) -> JsonValue {
    match entry.split_once(PAIR_SEPARATOR) {
        Some((left, right)) => json!({ "left": left.trim(), "right": right.trim() }),
        None => json!({ "left": entry, "right": "" }),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
