use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::repository::CatalogStore;
use crate::error::Result;
use crate::models::category::Category;
use crate::models::quiz::{Choice, Question, Quiz};
use crate::models::subject::Subject;

#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the ordered question sequences (with choices) for a set of
    /// quizzes and attach them to the bare quiz rows.
    async fn attach_questions(&self, rows: Vec<QuizRow>) -> Result<Vec<Quiz>> {
        let quiz_ids: Vec<Uuid> = rows.iter().map(|q| q.id).collect();

        let question_rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT qq.quiz_id, q.id, q.content, q.image_url, q.explanation
            FROM quiz_questions qq
            JOIN questions q ON q.id = qq.question_id
            WHERE qq.quiz_id = ANY($1)
            ORDER BY qq.quiz_id, qq.position
            "#,
        )
        .bind(&quiz_ids)
        .fetch_all(&self.pool)
        .await?;

        let question_ids: Vec<Uuid> = question_rows.iter().map(|q| q.id).collect();
        let choice_rows = sqlx::query_as::<_, ChoiceRow>(
            r#"
            SELECT question_id, id, content, is_correct, explanation
            FROM choices
            WHERE question_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&question_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut choices_by_question: HashMap<Uuid, Vec<Choice>> = HashMap::new();
        for row in choice_rows {
            choices_by_question
                .entry(row.question_id)
                .or_default()
                .push(Choice {
                    id: row.id,
                    content: row.content,
                    is_correct: row.is_correct,
                    explanation: row.explanation,
                });
        }

        let mut questions_by_quiz: HashMap<Uuid, Vec<Question>> = HashMap::new();
        for row in question_rows {
            let choices = choices_by_question.remove(&row.id).unwrap_or_default();
            questions_by_quiz
                .entry(row.quiz_id)
                .or_default()
                .push(Question {
                    id: row.id,
                    content: row.content,
                    image_url: row.image_url,
                    explanation: row.explanation,
                    choices,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let questions = questions_by_quiz.remove(&row.id).unwrap_or_default();
                Quiz {
                    id: row.id,
                    category_id: row.category_id,
                    title: row.title,
                    is_active: row.is_active,
                    questions,
                }
            })
            .collect())
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn subjects(&self) -> Result<Vec<Subject>> {
        let subjects =
            sqlx::query_as::<_, Subject>(r#"SELECT * FROM subjects ORDER BY name"#)
                .fetch_all(&self.pool)
                .await?;
        Ok(subjects)
    }

    async fn subject(&self, id: Uuid) -> Result<Subject> {
        let subject = sqlx::query_as::<_, Subject>(r#"SELECT * FROM subjects WHERE id = $1"#)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(subject)
    }

    async fn categories(&self, subject_id: Uuid) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"SELECT * FROM categories WHERE subject_id = $1 ORDER BY name"#,
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn category(&self, id: Uuid) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(r#"SELECT * FROM categories WHERE id = $1"#)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(category)
    }

    async fn quizzes_by_category(&self, category_id: Uuid) -> Result<Vec<Quiz>> {
        let rows = sqlx::query_as::<_, QuizRow>(
            r#"
            SELECT id, category_id, title, is_active
            FROM quizzes
            WHERE category_id = $1 AND is_active = TRUE
            ORDER BY title
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        self.attach_questions(rows).await
    }

    async fn quiz(&self, id: Uuid) -> Result<Quiz> {
        let row = sqlx::query_as::<_, QuizRow>(
            r#"SELECT id, category_id, title, is_active FROM quizzes WHERE id = $1"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let mut quizzes = self.attach_questions(vec![row]).await?;
        Ok(quizzes.remove(0))
    }
}

#[derive(Debug, FromRow)]
struct QuizRow {
    id: Uuid,
    category_id: Uuid,
    title: String,
    is_active: bool,
}

#[derive(Debug, FromRow)]
struct QuestionRow {
    quiz_id: Uuid,
    id: Uuid,
    content: String,
    image_url: Option<String>,
    explanation: Option<String>,
}

#[derive(Debug, FromRow)]
struct ChoiceRow {
    question_id: Uuid,
    id: Uuid,
    content: String,
    is_correct: bool,
    explanation: Option<String>,
}
