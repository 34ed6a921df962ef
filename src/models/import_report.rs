use crate::models::candidate::ParseError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Success { question_id: Uuid },
    Failure { row: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
    pub imported_question_ids: Vec<Uuid>,
}

impl ImportReport {
    /// Report for a batch rejected before persistence: every parse error
    /// counts as one failed row.
    pub fn from_parse_errors(errors: &[ParseError]) -> Self {
        Self {
            total: errors.len(),
            success: 0,
            failed: errors.len(),
            errors: errors
                .iter()
                .map(|e| RowError {
                    row: e.row,
                    error: e.message.clone(),
                })
                .collect(),
            imported_question_ids: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: ImportOutcome) {
        self.total += 1;
        match outcome {
            ImportOutcome::Success { question_id } => {
                self.success += 1;
                self.imported_question_ids.push(question_id);
            }
            ImportOutcome::Failure { row, reason } => {
                self.failed += 1;
                self.errors.push(RowError { row, error: reason });
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewEntry {
    pub row: usize,
    pub content: String,
    #[serde(rename = "type")]
    pub question_type: String,
}

/// Dry-run result rendered by the import form before anything is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub valid: bool,
    pub question_count: usize,
    pub errors: Vec<String>,
    pub preview: Vec<PreviewEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_fill_every_counter() {
        let report = ImportReport::from_parse_errors(&[
            ParseError::new(3, "bad time_limit"),
            ParseError::new(5, "column count mismatch"),
        ]);
        assert_eq!(report.total, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.success, 0);
        assert_eq!(report.errors[1].row, 5);
        assert!(report.imported_question_ids.is_empty());
    }

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let mut report = ImportReport::default();
        let id = Uuid::new_v4();
        report.record(ImportOutcome::Success { question_id: id });
        report.record(ImportOutcome::Failure {
            row: 2,
            reason: "nope".to_string(),
        });

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["importedQuestionIds"][0], id.to_string());
        assert_eq!(value["errors"][0]["row"], 2);
        assert_eq!(value["errors"][0]["error"], "nope");
    }
}
