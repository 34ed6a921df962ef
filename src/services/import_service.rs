use crate::error::Result;
use crate::models::candidate::{CandidateQuestion, ParseError};
use crate::models::import_report::{ImportOutcome, ImportReport, PreviewEntry, ValidationSummary};
use crate::models::question::Question;
use crate::services::{csv_decoder, json_normalizer, question_validator};
use crate::utils::text::truncate_chars;
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const PREVIEW_CONTENT_CHARS: usize = 50;

/// Durably creates questions. Any `Err` fails only the row being imported.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn create_question(&self, question: &Question) -> Result<Uuid>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizLinker: Send + Sync {
    async fn add_question_to_quiz(&self, quiz_id: Uuid, question_id: Uuid) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    /// Explicit format first, then the file extension, then a look at the
    /// first non-blank character.
    pub fn resolve(explicit: Option<Self>, file_name: Option<&str>, content: &str) -> Self {
        if let Some(format) = explicit {
            return format;
        }
        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase());
        match extension.as_deref() {
            Some("csv") => return ImportFormat::Csv,
            Some("json") => return ImportFormat::Json,
            _ => {}
        }
        match content.trim_start_matches('\u{feff}').trim_start().chars().next() {
            Some('[') | Some('{') => ImportFormat::Json,
            _ => ImportFormat::Csv,
        }
    }
}

impl std::fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportFormat::Csv => f.write_str("csv"),
            ImportFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub add_to_quiz_id: Option<Uuid>,
    pub folder_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct ImportService {
    store: Arc<dyn QuestionStore>,
    linker: Arc<dyn QuizLinker>,
    concurrency: usize,
}

impl ImportService {
    pub fn new(store: Arc<dyn QuestionStore>, linker: Arc<dyn QuizLinker>) -> Self {
        Self {
            store,
            linker,
            concurrency: 1,
        }
    }

    /// Allows up to `concurrency` question creates in flight. Report order
    /// still follows input order, and quiz links still run one at a time in
    /// row order once the creates have settled.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn parse(
        format: ImportFormat,
        text: &str,
    ) -> std::result::Result<Vec<CandidateQuestion>, Vec<ParseError>> {
        match format {
            ImportFormat::Csv => {
                let (candidates, errors) = csv_decoder::decode(text);
                if errors.is_empty() {
                    Ok(candidates)
                } else {
                    Err(errors)
                }
            }
            ImportFormat::Json => json_normalizer::normalize(text).map_err(|e| vec![e]),
        }
    }

    /// Parses and imports `text`. Parse errors reject the whole batch before
    /// anything reaches the store.
    pub async fn import(
        &self,
        format: ImportFormat,
        text: &str,
        options: &ImportOptions,
    ) -> ImportReport {
        let candidates = match Self::parse(format, text) {
            Ok(candidates) => candidates,
            Err(errors) => {
                warn!(%format, parse_errors = errors.len(), "Import rejected before persistence");
                return ImportReport::from_parse_errors(&errors);
            }
        };
        info!(
            %format,
            candidates = candidates.len(),
            quiz_id = ?options.add_to_quiz_id,
            folder_id = ?options.folder_id,
            "Starting question import"
        );
        self.run(candidates, options).await
    }

    pub async fn run(
        &self,
        candidates: Vec<CandidateQuestion>,
        options: &ImportOptions,
    ) -> ImportReport {
        let mut report = ImportReport::default();

        if self.concurrency <= 1 {
            for candidate in candidates {
                let row = candidate.row;
                let outcome = self.create(candidate, options).await;
                self.link(row, &outcome, options).await;
                report.record(outcome);
            }
        } else {
            // `buffered` yields in input order regardless of completion order.
            let created: Vec<(usize, ImportOutcome)> = stream::iter(candidates)
                .map(|candidate| async move {
                    let row = candidate.row;
                    (row, self.create(candidate, options).await)
                })
                .buffered(self.concurrency)
                .collect()
                .await;
            for (row, outcome) in created {
                self.link(row, &outcome, options).await;
                report.record(outcome);
            }
        }

        info!(
            total = report.total,
            success = report.success,
            failed = report.failed,
            "Question import finished"
        );
        report
    }

    async fn create(&self, candidate: CandidateQuestion, options: &ImportOptions) -> ImportOutcome {
        let row = candidate.row;
        let mut question = match question_validator::validate(&candidate) {
            Ok(question) => question,
            Err(e) => {
                debug!(row, error = %e, "Row failed validation");
                return ImportOutcome::Failure {
                    row,
                    reason: e.to_string(),
                };
            }
        };

        if question.settings.folder_id.is_none() {
            question.settings.folder_id = options.folder_id;
        }

        let question_id = match self.store.create_question(&question).await {
            Ok(id) => id,
            Err(e) => {
                warn!(row, error = %e, "Failed to create imported question");
                return ImportOutcome::Failure {
                    row,
                    reason: e.to_string(),
                };
            }
        };

        debug!(row, %question_id, "Row created");
        ImportOutcome::Success { question_id }
    }

    async fn link(&self, row: usize, outcome: &ImportOutcome, options: &ImportOptions) {
        let (Some(quiz_id), ImportOutcome::Success { question_id }) =
            (options.add_to_quiz_id, outcome)
        else {
            return;
        };
        if let Err(e) = self.linker.add_question_to_quiz(quiz_id, *question_id).await {
            // The question exists; the row still counts as imported.
            warn!(
                row,
                %quiz_id,
                %question_id,
                error = %e,
                "Failed to add imported question to quiz"
            );
        }
    }

    /// Dry run for the import form: decode and validate, never persist.
    pub fn validate_only(format: ImportFormat, text: &str) -> ValidationSummary {
        let candidates = match Self::parse(format, text) {
            Ok(candidates) => candidates,
            Err(errors) => {
                return ValidationSummary {
                    valid: false,
                    question_count: 0,
                    errors: errors.iter().map(ToString::to_string).collect(),
                    preview: Vec::new(),
                }
            }
        };

        let mut summary = ValidationSummary {
            question_count: candidates.len(),
            ..Default::default()
        };
        for candidate in &candidates {
            match question_validator::validate(candidate) {
                Ok(question) => summary.preview.push(PreviewEntry {
                    row: candidate.row,
                    content: truncate_chars(&question.content, PREVIEW_CONTENT_CHARS),
                    question_type: question.question_type().to_string(),
                }),
                Err(e) => summary.errors.push(format!("Row {}: {}", candidate.row, e)),
            }
        }
        if candidates.is_empty() {
            summary.errors.push("No questions found".to_string());
        }
        summary.valid = summary.errors.is_empty();
        summary
    }
}
