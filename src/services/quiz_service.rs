use crate::error::{Error, Result};
use crate::services::import_service::QuizLinker;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct QuizService {
    pool: PgPool,
}

impl QuizService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends the question after the quiz's current last question. The quiz
    /// row is locked for the transaction so concurrent appends to the same
    /// quiz take distinct positions.
    pub async fn add_question_to_quiz(&self, quiz_id: Uuid, question_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let quiz: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM quizzes WHERE id = $1 FOR UPDATE")
            .bind(quiz_id)
            .fetch_optional(&mut *tx)
            .await?;
        if quiz.is_none() {
            return Err(Error::NotFound(format!("Quiz {} not found", quiz_id)));
        }

        sqlx::query(
            r#"
            INSERT INTO quiz_questions (quiz_id, question_id, order_index)
            VALUES (
                $1,
                $2,
                COALESCE((SELECT MAX(order_index) + 1 FROM quiz_questions WHERE quiz_id = $1), 0)
            )
            ON CONFLICT (quiz_id, question_id) DO NOTHING
            "#,
        )
        .bind(quiz_id)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl QuizLinker for QuizService {
    async fn add_question_to_quiz(&self, quiz_id: Uuid, question_id: Uuid) -> Result<()> {
        QuizService::add_question_to_quiz(self, quiz_id, question_id).await
    }
}
