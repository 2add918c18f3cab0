// src/session.rs

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{quiz::Quiz, result::QuizResult, student::Student},
};

/// Header carrying the session id on every session-scoped request.
pub const SESSION_HEADER: &str = "x-session-id";

/// Per-session state: the student, the topic content, the current quiz with
/// its in-progress answers, and the latest result.
///
/// Single-owner, session-scoped. Only one submission may be in flight at a
/// time (`grading_in_flight`), so the quiz and answers are never touched by
/// two concurrent gradings.
#[derive(Debug, Clone)]
pub struct Session {
    pub student: Student,
    pub topic_content: Option<String>,
    pub quiz: Option<Quiz>,

    /// In-progress answers keyed by 0-based question index. Absent entries
    /// mean unanswered; an empty-string entry still counts as answered.
    pub answers: HashMap<usize, String>,

    pub result: Option<QuizResult>,

    /// Human-readable progress label while a submission is being graded.
    pub grading_status: Option<String>,

    /// Single-flight guard for submissions.
    pub grading_in_flight: bool,
}

impl Session {
    pub fn new(student: Student) -> Self {
        Self {
            student,
            topic_content: None,
            quiz: None,
            answers: HashMap::new(),
            result: None,
            grading_status: None,
            grading_in_flight: false,
        }
    }

    /// Installs a freshly generated quiz, invalidating all prior answers.
    pub fn install_quiz(&mut self, quiz: Quiz) {
        self.quiz = Some(quiz);
        self.answers.clear();
        self.grading_status = None;
    }

    /// True iff every question has an answer entry.
    pub fn answers_complete(&self) -> bool {
        match &self.quiz {
            Some(quiz) => self.answers.len() == quiz.questions.len(),
            None => false,
        }
    }
}

/// In-memory session store shared across handlers.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, student: Student) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.write().await.insert(id, Session::new(student));
        id
    }

    pub async fn contains(&self, id: &Uuid) -> bool {
        self.inner.read().await.contains_key(id)
    }

    /// Runs `f` against the session under the read lock.
    /// The lock is released before this returns, so `f` must not await.
    pub async fn with<R>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&Session) -> R,
    ) -> Result<R, AppError> {
        let sessions = self.inner.read().await;
        let session = sessions
            .get(id)
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;
        Ok(f(session))
    }

    /// Runs `f` against the session under the write lock.
    pub async fn with_mut<R>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, AppError> {
        let mut sessions = self.inner.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;
        Ok(f(session))
    }
}

/// Identifies the session a request belongs to.
/// Injected into request extensions by [`session_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct SessionId(pub Uuid);

/// Axum Middleware: session resolution.
///
/// Intercepts requests, validates the 'x-session-id' header against the
/// store. If valid, injects `SessionId` into the request extensions for
/// handlers to use. If missing or unknown, returns 401 Unauthorized.
pub async fn session_middleware(
    State(store): State<SessionStore>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let header = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok());

    let id = match header.and_then(|h| Uuid::parse_str(h).ok()) {
        Some(id) => id,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    if !store.contains(&id).await {
        return Err(StatusCode::UNAUTHORIZED);
    }

    req.extensions_mut().insert(SessionId(id));
    Ok(next.run(req).await)
}
