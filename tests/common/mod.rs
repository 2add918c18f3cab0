// tests/common/mod.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use studymate_api::{
    config::Config,
    error::AppError,
    models::{
        quiz::{Question, QuestionType, Quiz},
        result::QuizResult,
        student::Student,
    },
    routes,
    services::gemini::{ReasoningClient, TheoryGrade, TheoryGradingItem},
    session::SessionStore,
    state::AppState,
};

/// Scriptable stand-in for the reasoning service.
pub struct MockReasoning {
    pub quiz: Quiz,
    pub theory_feedback: String,
    pub narrative: String,
    pub fail_theory_once: AtomicBool,
    pub fail_feedback: AtomicBool,
    pub feedback_delay: Duration,
    pub explain_calls: AtomicUsize,
    pub quiz_calls: AtomicUsize,
    pub theory_calls: AtomicUsize,
    pub feedback_calls: AtomicUsize,
}

impl MockReasoning {
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            theory_feedback: "close enough".to_string(),
            narrative: "Great job! Review the ones you missed.".to_string(),
            fail_theory_once: AtomicBool::new(false),
            fail_feedback: AtomicBool::new(false),
            feedback_delay: Duration::ZERO,
            explain_calls: AtomicUsize::new(0),
            quiz_calls: AtomicUsize::new(0),
            theory_calls: AtomicUsize::new(0),
            feedback_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ReasoningClient for MockReasoning {
    async fn explain_topic(&self, topic: &str) -> Result<String, AppError> {
        self.explain_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("Detailed notes on {}.", topic))
    }

    async fn generate_quiz(
        &self,
        _topic_content: &str,
        _student: &Student,
    ) -> Result<Quiz, AppError> {
        self.quiz_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.quiz.clone())
    }

    async fn grade_theory_answers(
        &self,
        answers: &[TheoryGradingItem],
    ) -> Result<Vec<TheoryGrade>, AppError> {
        if answers.is_empty() {
            return Ok(Vec::new());
        }
        self.theory_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_theory_once.swap(false, Ordering::SeqCst) {
            return Err(AppError::ServiceUnavailable(
                "Failed to grade theory answers from AI service.".to_string(),
            ));
        }
        Ok(answers
            .iter()
            .map(|_| TheoryGrade {
                is_correct: true,
                feedback: self.theory_feedback.clone(),
            })
            .collect())
    }

    async fn generate_feedback(&self, _result: &QuizResult) -> Result<String, AppError> {
        self.feedback_calls.fetch_add(1, Ordering::SeqCst);
        if !self.feedback_delay.is_zero() {
            tokio::time::sleep(self.feedback_delay).await;
        }
        if self.fail_feedback.load(Ordering::SeqCst) {
            return Err(AppError::ServiceUnavailable(
                "Failed to generate feedback from AI service.".to_string(),
            ));
        }
        Ok(self.narrative.clone())
    }
}

/// A small mixed quiz matching the grading scenario: two multiple-choice
/// questions and one theory question.
pub fn sample_quiz() -> Quiz {
    Quiz {
        title: "Cell Biology".to_string(),
        questions: vec![
            Question {
                question_text: "Q1".to_string(),
                question_type: QuestionType::MultipleChoice,
                options: Some(vec![
                    "A".to_string(),
                    "B".to_string(),
                    "C".to_string(),
                    "D".to_string(),
                ]),
                correct_answer: "B".to_string(),
            },
            Question {
                question_text: "Q2".to_string(),
                question_type: QuestionType::MultipleChoice,
                options: Some(vec![
                    "A".to_string(),
                    "B".to_string(),
                    "C".to_string(),
                    "D".to_string(),
                ]),
                correct_answer: "A".to_string(),
            },
            Question {
                question_text: "Q3".to_string(),
                question_type: QuestionType::Theory,
                options: None,
                correct_answer: "mitochondria produce energy".to_string(),
            },
        ],
    }
}

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app(reasoning: Arc<MockReasoning>) -> String {
    // 1. In-memory database, one connection so every query sees the same DB.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory sqlite");

    // 2. Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    // 3. Create test configuration and state
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        gemini_api_key: "test-key".to_string(),
        gemini_model: "gemini-2.5-flash".to_string(),
        gemini_base_url: "http://127.0.0.1:1".to_string(),
        port: 0,
        rust_log: "error".to_string(),
    };

    let reasoning: Arc<dyn ReasoningClient> = reasoning;
    let state = AppState {
        pool,
        config,
        reasoning,
        sessions: SessionStore::new(),
    };

    // 4. Create the router with the app state
    let app = routes::create_router(state);

    // 5. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 6. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Opens a session and returns its id.
pub async fn open_session(client: &reqwest::Client, address: &str, name: &str) -> String {
    let response = client
        .post(format!("{}/api/session", address))
        .json(&serde_json::json!({ "name": name }))
        .send()
        .await
        .expect("Failed to open session");
    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    body["sessionId"].as_str().unwrap().to_string()
}

/// Sets the session's topic content directly.
pub async fn set_topic(client: &reqwest::Client, address: &str, session: &str, content: &str) {
    let response = client
        .put(format!("{}/api/topic", address))
        .header("x-session-id", session)
        .json(&serde_json::json!({ "content": content }))
        .send()
        .await
        .expect("Failed to set topic");
    assert_eq!(response.status().as_u16(), 200);
}
