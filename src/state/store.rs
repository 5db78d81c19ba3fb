use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::quiz::{Quiz, QuizStatus, QuizWithStatus};
use crate::models::quiz_attempt::QuizAttempt;
use crate::services::progress;
use crate::state::kv::KeyValueStore;

const STATE_KEY: &str = "state:quiz";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizState {
    pub current_quiz: Option<QuizWithStatus>,
    pub selected_subject: Option<Uuid>,
    pub selected_category: Option<Uuid>,
    pub quizzes: Vec<QuizWithStatus>,
    pub loading: bool,
    pub error: Option<String>,
}

pub type SubscriptionId = u64;

type Subscriber = Arc<dyn Fn(&QuizState) + Send + Sync>;

struct Inner {
    state: QuizState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: SubscriptionId,
}

/// Observable holder for the client-facing quiz state.
///
/// Every mutation replaces the state as a whole, persists it to the backing
/// key-value store (best-effort), notifies subscribers with the complete
/// post-mutation state, and returns that state synchronously. Notification
/// runs after the internal lock is released, so a subscriber may call back
/// into the store. There is no global instance; consumers receive the store
/// by reference.
pub struct QuizStore {
    inner: Mutex<Inner>,
    storage: Arc<dyn KeyValueStore>,
}

impl QuizStore {
    /// Open the store, rehydrating persisted state when present.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let state = storage
            .get(STATE_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            inner: Mutex::new(Inner {
                state,
                subscribers: Vec::new(),
                next_id: 0,
            }),
            storage,
        }
    }

    pub fn snapshot(&self) -> QuizState {
        self.inner.lock().unwrap().state.clone()
    }

    pub fn subscribe(&self, f: impl Fn(&QuizState) + Send + Sync + 'static) -> SubscriptionId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Arc::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Replace the quiz list, deriving status/progress per quiz from the
    /// latest matching attempt.
    pub fn set_quizzes(&self, quizzes: Vec<Quiz>, attempts: &[QuizAttempt]) -> QuizState {
        self.mutate(|state| {
            state.quizzes = quizzes
                .into_iter()
                .map(|quiz| progress::with_status(quiz, attempts))
                .collect();
        })
    }

    pub fn set_current_quiz(&self, quiz: QuizWithStatus) -> QuizState {
        self.mutate(|state| state.current_quiz = Some(quiz))
    }

    /// A subject change invalidates the downstream category selection and
    /// quiz list.
    pub fn set_selected_subject(&self, subject_id: Option<Uuid>) -> QuizState {
        self.mutate(|state| {
            state.selected_subject = subject_id;
            state.selected_category = None;
            state.quizzes = Vec::new();
        })
    }

    pub fn set_selected_category(&self, category_id: Option<Uuid>) -> QuizState {
        self.mutate(|state| {
            state.selected_category = category_id;
            state.quizzes = Vec::new();
        })
    }

    /// Patch progress on the matching quiz entry only.
    pub fn update_quiz_progress(
        &self,
        quiz_id: Uuid,
        progress: u8,
        last_question_id: Option<Uuid>,
    ) -> QuizState {
        self.mutate(|state| {
            if let Some(entry) = state.quizzes.iter_mut().find(|q| q.quiz.id == quiz_id) {
                entry.progress = progress;
                entry.last_question_id = last_question_id;
            }
        })
    }

    /// Record a final score. Completion short-circuits derivation: the entry
    /// is forced to completed at 100%.
    pub fn update_quiz_score(&self, quiz_id: Uuid, score: i32) -> QuizState {
        self.mutate(|state| {
            if let Some(entry) = state.quizzes.iter_mut().find(|q| q.quiz.id == quiz_id) {
                entry.score = Some(score);
                entry.status = QuizStatus::Completed;
                entry.progress = 100;
            }
        })
    }

    pub fn set_loading(&self, loading: bool) -> QuizState {
        self.mutate(|state| state.loading = loading)
    }

    /// Surface a failure without clearing other state, so stale data can
    /// still render next to the error.
    pub fn set_error(&self, error: Option<String>) -> QuizState {
        self.mutate(|state| state.error = error)
    }

    /// Restore the initial state and drop the persisted copy.
    pub fn reset(&self) -> QuizState {
        let (state, subscribers) = {
            let mut inner = self.inner.lock().unwrap();
            inner.state = QuizState::default();
            self.storage.remove(STATE_KEY);
            (inner.state.clone(), Self::subscribers(&inner))
        };
        for subscriber in &subscribers {
            subscriber(&state);
        }
        state
    }

    fn mutate(&self, f: impl FnOnce(&mut QuizState)) -> QuizState {
        // Mutation and persistence are atomic under the lock; notification
        // happens after release so subscribers can re-enter the store.
        let (state, subscribers) = {
            let mut inner = self.inner.lock().unwrap();
            f(&mut inner.state);
            self.persist(&inner.state);
            (inner.state.clone(), Self::subscribers(&inner))
        };
        for subscriber in &subscribers {
            subscriber(&state);
        }
        state
    }

    fn subscribers(inner: &Inner) -> Vec<Subscriber> {
        inner.subscribers.iter().map(|(_, s)| s.clone()).collect()
    }

    fn persist(&self, state: &QuizState) {
        match serde_json::to_string(state) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(STATE_KEY, &raw) {
                    tracing::warn!("Failed to persist quiz state: {}", e);
                }
            }
            Err(e) => tracing::warn!("Quiz state not serializable: {}", e),
        }
    }
}
