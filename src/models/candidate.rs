use serde_json::{Map, Value as JsonValue};

/// A parsed question record that has not been validated yet.
///
/// `row` is the 1-based position in the caller's source: the physical data
/// line for CSV (header is line 1) and the array position for JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuestion {
    pub row: usize,
    pub fields: Map<String, JsonValue>,
}

impl CandidateQuestion {
    pub fn new(row: usize, fields: Map<String, JsonValue>) -> Self {
        Self { row, fields }
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    /// The declared type name, as written in the source.
    pub fn type_name(&self) -> Option<&str> {
        self.str_field("type").map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn content(&self) -> Option<&str> {
        self.str_field("content")
    }
}

/// A decode failure tied to a source row. Row 1 is used for document-level
/// failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Row {row}: {message}")]
pub struct ParseError {
    pub row: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }

    pub fn document(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }
}
