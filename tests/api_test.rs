use std::env;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use quiz_backend::database::memory::InMemoryStore;
use quiz_backend::middleware::auth::Claims;
use quiz_backend::models::category::Category;
use quiz_backend::models::quiz::{Choice, Question, Quiz};
use quiz_backend::models::subject::Subject;
use quiz_backend::state::cache::ListCache;
use quiz_backend::state::kv::MemoryStore;
use quiz_backend::{routes, AppState};

const JWT_SECRET: &str = "test_secret_key";

fn setup() -> (Router, InMemoryStore) {
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("DATABASE_URL", "postgres://unused");
    env::set_var("JWT_SECRET", JWT_SECRET);
    let _ = quiz_backend::config::init_config();

    let store = InMemoryStore::new();
    let state = AppState::with_stores(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        ListCache::new(Arc::new(MemoryStore::new())),
    );
    (routes::api_router(state), store)
}

fn bearer_token(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::days(1)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("sign token");
    format!("Bearer {}", token)
}

fn seed_quiz(store: &InMemoryStore, questions: usize) -> (Subject, Category, Quiz) {
    let subject = Subject {
        id: Uuid::new_v4(),
        name: "Biology".to_owned(),
    };
    let category = Category {
        id: Uuid::new_v4(),
        subject_id: subject.id,
        name: "Cell structure".to_owned(),
    };
    let quiz = Quiz {
        id: Uuid::new_v4(),
        category_id: category.id,
        title: "Organelles".to_owned(),
        is_active: true,
        questions: (0..questions)
            .map(|i| Question {
                id: Uuid::new_v4(),
                content: format!("Question {}", i + 1),
                image_url: None,
                explanation: None,
                choices: vec![
                    Choice {
                        id: Uuid::new_v4(),
                        content: "Right".to_owned(),
                        is_correct: true,
                        explanation: None,
                    },
                    Choice {
                        id: Uuid::new_v4(),
                        content: "Wrong".to_owned(),
                        is_correct: false,
                        explanation: None,
                    },
                ],
            })
            .collect(),
    };
    store.push_subject(subject.clone());
    store.push_category(category.clone());
    store.push_quiz(quiz.clone());
    (subject, category, quiz)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: String, auth: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", auth)
        .body(Body::empty())
        .unwrap()
}

fn with_json(method: &str, uri: String, auth: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", auth)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_open_and_api_requires_a_session() {
    let (app, _) = setup();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder()
        .method("GET")
        .uri("/api/subjects")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("GET")
        .uri("/api/subjects")
        .header("authorization", "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_quiz_is_a_404() {
    let (app, _) = setup();
    let auth = bearer_token(Uuid::new_v4());

    let (status, _) = send(
        &app,
        with_json(
            "POST",
            format!("/api/quiz-attempts/{}", Uuid::new_v4()),
            &auth,
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inactive_quiz_cannot_be_started() {
    let (app, store) = setup();
    let auth = bearer_token(Uuid::new_v4());
    let (_, _, mut quiz) = seed_quiz(&store, 2);
    quiz.id = Uuid::new_v4();
    quiz.is_active = false;
    store.push_quiz(quiz.clone());

    let (status, _) = send(
        &app,
        with_json(
            "POST",
            format!("/api/quiz-attempts/{}", quiz.id),
            &auth,
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn another_users_attempt_is_out_of_reach() {
    let (app, store) = setup();
    let owner_auth = bearer_token(Uuid::new_v4());
    let intruder_auth = bearer_token(Uuid::new_v4());
    let (_, _, quiz) = seed_quiz(&store, 2);

    let (_, attempt) = send(
        &app,
        with_json(
            "POST",
            format!("/api/quiz-attempts/{}", quiz.id),
            &owner_auth,
            json!({}),
        ),
    )
    .await;
    let attempt_id = attempt["id"].as_str().unwrap().to_owned();

    let (status, _) = send(
        &app,
        with_json(
            "POST",
            format!("/api/quiz-attempts/{}/complete", attempt_id),
            &intruder_auth,
            json!({"score": 2}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        with_json(
            "PATCH",
            format!("/api/quiz-attempts/{}/progress", attempt_id),
            &intruder_auth,
            json!({
                "last_answered_question_id": quiz.questions[0].id,
                "score": 1
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the owner's attempt is untouched and still resumable
    let (_, resumed) = send(
        &app,
        with_json(
            "POST",
            format!("/api/quiz-attempts/{}", quiz.id),
            &owner_auth,
            json!({}),
        ),
    )
    .await;
    assert_eq!(resumed["id"], attempt["id"]);
    assert_eq!(resumed["score"], 0);
    assert!(resumed["completed_at"].is_null());
}

#[tokio::test]
async fn browse_resume_and_complete_flow() {
    let (app, store) = setup();
    let user_id = Uuid::new_v4();
    let auth = bearer_token(user_id);
    let (subject, category, quiz) = seed_quiz(&store, 4);

    // browse the hierarchy
    let (status, body) = send(&app, get("/api/subjects".to_owned(), &auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Biology");

    let (status, body) = send(&app, get(format!("/api/categories/{}", subject.id), &auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], json!(category.id));

    let (status, body) = send(&app, get(format!("/api/quizzes/{}", category.id), &auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["status"], "not-started");
    assert_eq!(body[0]["progress"], 0);

    // start an attempt, then resume it
    let (status, first) = send(
        &app,
        with_json(
            "POST",
            format!("/api/quiz-attempts/{}", quiz.id),
            &auth,
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["score"], 0);
    assert!(first["completed_at"].is_null());

    let (_, resumed) = send(
        &app,
        with_json(
            "POST",
            format!("/api/quiz-attempts/{}", quiz.id),
            &auth,
            json!({}),
        ),
    )
    .await;
    assert_eq!(resumed["id"], first["id"]);

    // answer the second of four questions
    let attempt_id = first["id"].as_str().unwrap().to_owned();
    let (status, body) = send(
        &app,
        with_json(
            "PATCH",
            format!("/api/quiz-attempts/{}/progress", attempt_id),
            &auth,
            json!({
                "last_answered_question_id": quiz.questions[1].id,
                "score": 1
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], true);

    let (_, body) = send(&app, get(format!("/api/quizzes/{}", category.id), &auth)).await;
    assert_eq!(body[0]["status"], "in-progress");
    assert_eq!(body[0]["progress"], 50);

    // finish the quiz
    let (status, body) = send(
        &app,
        with_json(
            "POST",
            format!("/api/quiz-attempts/{}/complete", attempt_id),
            &auth,
            json!({"score": 3}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], true);

    let (_, body) = send(&app, get(format!("/api/quizzes/{}", category.id), &auth)).await;
    assert_eq!(body[0]["status"], "completed");
    assert_eq!(body[0]["progress"], 100);
    assert_eq!(body[0]["score"], 3);

    // a fresh start after completion is a new attempt
    let (_, fresh) = send(
        &app,
        with_json(
            "POST",
            format!("/api/quiz-attempts/{}", quiz.id),
            &auth,
            json!({}),
        ),
    )
    .await;
    assert_ne!(fresh["id"], first["id"]);

    // history lists both attempts, newest first
    let (status, history) = send(&app, get("/api/quiz-attempts".to_owned(), &auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 2);
    assert_eq!(history[0]["id"], fresh["id"]);
    assert_eq!(history[0]["quiz_title"], "Organelles");
    assert_eq!(history[0]["category_name"], "Cell structure");
}

#[tokio::test]
async fn progress_requests_are_validated() {
    let (app, store) = setup();
    let auth = bearer_token(Uuid::new_v4());
    let (_, _, quiz) = seed_quiz(&store, 2);

    let (_, attempt) = send(
        &app,
        with_json(
            "POST",
            format!("/api/quiz-attempts/{}", quiz.id),
            &auth,
            json!({}),
        ),
    )
    .await;

    let (status, _) = send(
        &app,
        with_json(
            "PATCH",
            format!("/api/quiz-attempts/{}/progress", attempt["id"].as_str().unwrap()),
            &auth,
            json!({
                "last_answered_question_id": quiz.questions[0].id,
                "score": -5
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
