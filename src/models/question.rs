use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// A validated question, ready to hand to a `QuestionStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub content: String,
    #[serde(flatten)]
    pub body: QuestionBody,
    #[serde(flatten)]
    pub settings: QuestionSettings,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.body.question_type()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    FreeText,
    Matching,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::FreeText,
        QuestionType::Matching,
    ];

    /// Resolves a type name as written in an import file. Accepts the legacy
    /// `matching_pairs` alias.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "multiple_choice" => Some(QuestionType::MultipleChoice),
            "true_false" => Some(QuestionType::TrueFalse),
            "free_text" => Some(QuestionType::FreeText),
            "matching" | "matching_pairs" => Some(QuestionType::Matching),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::FreeText => "free_text",
            QuestionType::Matching => "matching",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionBody {
    MultipleChoice { answers: Vec<Answer> },
    TrueFalse { answers: Vec<Answer> },
    FreeText { accepted_answers: Vec<AcceptedAnswer> },
    Matching { pairs: Vec<MatchingPair> },
}

impl QuestionBody {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionBody::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionBody::TrueFalse { .. } => QuestionType::TrueFalse,
            QuestionBody::FreeText { .. } => QuestionType::FreeText,
            QuestionBody::Matching { .. } => QuestionType::Matching,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub content: String,
    pub is_correct: bool,
    pub order_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedAnswer {
    pub content: String,
    pub grading_criteria: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingPair {
    pub id: String,
    pub left: String,
    pub right: String,
}

/// Fields shared by every variant. Absent values are resolved to `None`
/// (or `false` for `is_public`) once, during validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionSettings {
    /// Seconds.
    pub time_limit: Option<u32>,
    pub hint: Option<String>,
    pub correct_feedback: Option<String>,
    pub incorrect_feedback: Option<String>,
    pub is_public: bool,
    pub image_url: Option<String>,
    pub folder_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub grade_id: Option<Uuid>,
    pub metadata: Option<JsonValue>,
}
