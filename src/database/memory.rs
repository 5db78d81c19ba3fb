use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::repository::{AttemptStore, CatalogStore};
use crate::error::{Error, Result};
use crate::models::category::Category;
use crate::models::quiz::Quiz;
use crate::models::quiz_attempt::{AttemptWithQuiz, QuizAttempt};
use crate::models::subject::Subject;

/// In-memory store implementing both seams, for tests and prototyping.
///
/// Mirrors the database constraints that matter to the core: at most one
/// active attempt per (quiz, user), listings ordered the way the SQL
/// implementations order them.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    subjects: Arc<Mutex<Vec<Subject>>>,
    categories: Arc<Mutex<Vec<Category>>>,
    quizzes: Arc<Mutex<Vec<Quiz>>>,
    attempts: Arc<Mutex<Vec<QuizAttempt>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_subject(&self, subject: Subject) {
        self.subjects.lock().unwrap().push(subject);
    }

    pub fn push_category(&self, category: Category) {
        self.categories.lock().unwrap().push(category);
    }

    pub fn push_quiz(&self, quiz: Quiz) {
        self.quizzes.lock().unwrap().push(quiz);
    }

    pub fn push_attempt(&self, attempt: QuizAttempt) {
        self.attempts.lock().unwrap().push(attempt);
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl AttemptStore for InMemoryStore {
    async fn latest(&self, quiz_id: Uuid, user_id: Uuid) -> Result<Option<QuizAttempt>> {
        let attempts = self.attempts.lock().unwrap();
        Ok(attempts
            .iter()
            .filter(|a| a.quiz_id == quiz_id && a.user_id == user_id)
            .max_by_key(|a| a.started_at)
            .cloned())
    }

    async fn insert_active(
        &self,
        quiz_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<QuizAttempt>> {
        let mut attempts = self.attempts.lock().unwrap();
        let has_active = attempts
            .iter()
            .any(|a| a.quiz_id == quiz_id && a.user_id == user_id && a.completed_at.is_none());
        if has_active {
            return Ok(None);
        }

        let attempt = QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id,
            user_id,
            started_at: now,
            completed_at: None,
            last_answered_question_id: None,
            score: 0,
            created_at: now,
            updated_at: now,
        };
        attempts.push(attempt.clone());
        Ok(Some(attempt))
    }

    async fn set_progress(
        &self,
        attempt_id: Uuid,
        user_id: Uuid,
        last_question_id: Uuid,
        score: i32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut attempts = self.attempts.lock().unwrap();
        let attempt = attempts
            .iter_mut()
            .find(|a| a.id == attempt_id && a.user_id == user_id)
            .ok_or_else(|| Error::NotFound(format!("Attempt {} not found", attempt_id)))?;
        attempt.last_answered_question_id = Some(last_question_id);
        attempt.score = score;
        attempt.updated_at = now;
        Ok(())
    }

    async fn set_completed(
        &self,
        attempt_id: Uuid,
        user_id: Uuid,
        final_score: i32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut attempts = self.attempts.lock().unwrap();
        let attempt = attempts
            .iter_mut()
            .find(|a| a.id == attempt_id && a.user_id == user_id)
            .ok_or_else(|| Error::NotFound(format!("Attempt {} not found", attempt_id)))?;
        attempt.completed_at = Some(now);
        attempt.score = final_score;
        attempt.updated_at = now;
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<AttemptWithQuiz>> {
        let attempts = self.attempts.lock().unwrap();
        let quizzes = self.quizzes.lock().unwrap();
        let categories = self.categories.lock().unwrap();

        let mut rows: Vec<AttemptWithQuiz> = Vec::new();
        for attempt in attempts.iter().filter(|a| a.user_id == user_id) {
            let quiz = quizzes
                .iter()
                .find(|q| q.id == attempt.quiz_id)
                .ok_or_else(|| Error::NotFound(format!("Quiz {} not found", attempt.quiz_id)))?;
            let category = categories
                .iter()
                .find(|c| c.id == quiz.category_id)
                .ok_or_else(|| {
                    Error::NotFound(format!("Category {} not found", quiz.category_id))
                })?;
            rows.push(AttemptWithQuiz {
                attempt: attempt.clone(),
                quiz_title: quiz.title.clone(),
                category_name: category.name.clone(),
            });
        }
        rows.sort_by(|a, b| b.attempt.started_at.cmp(&a.attempt.started_at));
        Ok(rows)
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn subjects(&self) -> Result<Vec<Subject>> {
        let mut subjects = self.subjects.lock().unwrap().clone();
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }

    async fn subject(&self, id: Uuid) -> Result<Subject> {
        self.subjects
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Subject {} not found", id)))
    }

    async fn categories(&self, subject_id: Uuid) -> Result<Vec<Category>> {
        let mut categories: Vec<Category> = self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.subject_id == subject_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn category(&self, id: Uuid) -> Result<Category> {
        self.categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Category {} not found", id)))
    }

    async fn quizzes_by_category(&self, category_id: Uuid) -> Result<Vec<Quiz>> {
        let mut quizzes: Vec<Quiz> = self
            .quizzes
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.category_id == category_id && q.is_active)
            .cloned()
            .collect();
        quizzes.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(quizzes)
    }

    async fn quiz(&self, id: Uuid) -> Result<Quiz> {
        self.quizzes
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Quiz {} not found", id)))
    }
}
