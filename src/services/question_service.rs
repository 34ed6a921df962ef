use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::services::import_service::QuestionStore;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_question(&self, question: &Question) -> Result<Uuid> {
        let body = serde_json::to_value(&question.body)?;
        let settings = &question.settings;
        let time_limit = time_limit_column(settings.time_limit)?;

        let row = sqlx::query(
            r#"
            INSERT INTO questions (
                content, question_type, body, time_limit, hint,
                correct_feedback, incorrect_feedback, is_public, image_url,
                folder_id, category_id, grade_id, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(&question.content)
        .bind(question.question_type().as_str())
        .bind(body)
        .bind(time_limit)
        .bind(&settings.hint)
        .bind(&settings.correct_feedback)
        .bind(&settings.incorrect_feedback)
        .bind(settings.is_public)
        .bind(&settings.image_url)
        .bind(settings.folder_id)
        .bind(settings.category_id)
        .bind(settings.grade_id)
        .bind(&settings.metadata)
        .fetch_one(&self.pool)
        .await?;

        let id: Uuid = row.try_get("id")?;
        Ok(id)
    }
}

fn time_limit_column(seconds: Option<u32>) -> Result<Option<i32>> {
    seconds
        .map(i32::try_from)
        .transpose()
        .map_err(|_| Error::BadRequest("time_limit does not fit the questions table".to_string()))
}

#[async_trait]
impl QuestionStore for QuestionService {
    async fn create_question(&self, question: &Question) -> Result<Uuid> {
        QuestionService::create_question(self, question).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_limit_is_bound_without_wrapping() {
        assert_eq!(time_limit_column(None).unwrap(), None);
        assert_eq!(time_limit_column(Some(30)).unwrap(), Some(30));
        assert_eq!(time_limit_column(Some(i32::MAX as u32)).unwrap(), Some(i32::MAX));
        assert!(matches!(
            time_limit_column(Some(3_000_000_000)),
            Err(Error::BadRequest(_))
        ));
    }
}
