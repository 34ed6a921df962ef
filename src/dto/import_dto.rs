use crate::services::import_service::{ImportFormat, ImportOptions};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImportQuestionsPayload {
    #[validate(length(min = 1, message = "Import content cannot be empty"))]
    pub content: String,
    pub format: Option<ImportFormat>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub file_name: Option<String>,
    pub add_to_quiz_id: Option<Uuid>,
    pub folder_id: Option<Uuid>,
}

impl ImportQuestionsPayload {
    pub fn resolved_format(&self) -> ImportFormat {
        ImportFormat::resolve(self.format, self.file_name.as_deref(), &self.content)
    }

    pub fn options(&self) -> ImportOptions {
        ImportOptions {
            add_to_quiz_id: self.add_to_quiz_id,
            folder_id: self.folder_id,
        }
    }
}

// Trims strings and turns empty ones into None
fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_resolves_format_from_file_name() {
        let payload: ImportQuestionsPayload = serde_json::from_value(json!({
            "content": "content,type\n",
            "file_name": "  bank.csv ",
        }))
        .unwrap();
        assert_eq!(payload.file_name.as_deref(), Some("bank.csv"));
        assert_eq!(payload.resolved_format(), ImportFormat::Csv);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn empty_content_fails_validation() {
        let payload: ImportQuestionsPayload =
            serde_json::from_value(json!({"content": "", "format": "json"})).unwrap();
        assert!(payload.validate().is_err());
    }
}
