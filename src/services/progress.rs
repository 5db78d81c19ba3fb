use uuid::Uuid;

use crate::models::quiz::{Quiz, QuizStatus, QuizWithStatus};
use crate::models::quiz_attempt::QuizAttempt;

/// Classify a quiz's play state from its latest attempt. Depends only on
/// attempt presence and the completion timestamp, never on score.
pub fn determine_status(attempt: Option<&QuizAttempt>) -> QuizStatus {
    match attempt {
        None => QuizStatus::NotStarted,
        Some(a) if a.is_completed() => QuizStatus::Completed,
        Some(_) => QuizStatus::InProgress,
    }
}

/// Completion percentage, 0..=100, rounded half-up.
///
/// Counts questions up to and including the last answered one within the
/// quiz's ordered sequence. A pointer to a question that is not in the
/// sequence (stale data) counts as no progress.
pub fn calculate_progress(quiz: &Quiz, attempt: Option<&QuizAttempt>) -> u8 {
    let Some(attempt) = attempt else {
        return 0;
    };
    if attempt.is_completed() {
        return 100;
    }
    let total = quiz.questions.len();
    if total == 0 {
        return 0;
    }
    let Some(last_id) = attempt.last_answered_question_id else {
        return 0;
    };
    match quiz.questions.iter().position(|q| q.id == last_id) {
        Some(index) => (((index + 1) as f64 / total as f64) * 100.0).round() as u8,
        None => 0,
    }
}

/// The attempt with the latest `started_at` among those matching the quiz.
pub fn latest_attempt_for<'a>(
    quiz_id: Uuid,
    attempts: &'a [QuizAttempt],
) -> Option<&'a QuizAttempt> {
    attempts
        .iter()
        .filter(|a| a.quiz_id == quiz_id)
        .max_by_key(|a| a.started_at)
}

/// Decorate a quiz with status, progress, and score derived from the
/// caller's attempts.
pub fn with_status(quiz: Quiz, attempts: &[QuizAttempt]) -> QuizWithStatus {
    let attempt = latest_attempt_for(quiz.id, attempts).cloned();
    let status = determine_status(attempt.as_ref());
    let progress = calculate_progress(&quiz, attempt.as_ref());
    QuizWithStatus {
        status,
        progress,
        score: attempt.as_ref().map(|a| a.score),
        last_question_id: attempt.as_ref().and_then(|a| a.last_answered_question_id),
        attempt,
        quiz,
    }
}
