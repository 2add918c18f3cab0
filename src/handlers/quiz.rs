// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        answer::SetAnswerRequest,
        quiz::{MULTIPLE_CHOICE_COUNT, PublicQuiz, QuestionType, THEORY_COUNT},
        result::{FEEDBACK_FALLBACK, FEEDBACK_PENDING, QuizResult},
    },
    services::grading,
    session::{SessionId, SessionStore},
    state::AppState,
};

/// Generates a fresh quiz from the session's topic content.
///
/// A new quiz replaces the old one wholesale and invalidates all collected
/// answers. The generated structure is trusted as-is; a composition drift
/// from the requested 30+4 only logs a warning (see DESIGN.md).
pub async fn generate_quiz(
    State(state): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let (student, topic_content, in_flight) = state
        .sessions
        .with(&id, |s| {
            (
                s.student.clone(),
                s.topic_content.clone().unwrap_or_default(),
                s.grading_in_flight,
            )
        })
        .await?;

    if in_flight {
        return Err(AppError::Conflict(
            "A submission is currently being graded.".to_string(),
        ));
    }

    // Gate before any service call: no topic content, no quiz.
    if topic_content.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Learn a topic before generating a quiz.".to_string(),
        ));
    }

    let quiz = state.reasoning.generate_quiz(&topic_content, &student).await?;

    let mc_count = quiz
        .questions
        .iter()
        .filter(|q| q.question_type == QuestionType::MultipleChoice)
        .count();
    let theory_count = quiz.questions.len() - mc_count;
    if mc_count != MULTIPLE_CHOICE_COUNT || theory_count != THEORY_COUNT {
        tracing::warn!(
            "Generated quiz '{}' has {} multiple-choice and {} theory questions (requested {}+{})",
            quiz.title,
            mc_count,
            theory_count,
            MULTIPLE_CHOICE_COUNT,
            THEORY_COUNT
        );
    }

    let public = PublicQuiz::from(&quiz);
    state.sessions.with_mut(&id, |s| s.install_quiz(quiz)).await?;

    Ok(Json(public))
}

/// Returns the current quiz (without correct answers).
pub async fn get_quiz(
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = sessions
        .with(&id, |s| s.quiz.as_ref().map(PublicQuiz::from))
        .await?
        .ok_or_else(|| AppError::NotFound("No quiz has been generated yet".to_string()))?;

    Ok(Json(quiz))
}

/// Records the answer for one question, overwriting any prior value.
/// The content is not validated against the question type.
pub async fn set_answer(
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
    Path(index): Path<usize>,
    Json(payload): Json<SetAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    sessions
        .with_mut(&id, |s| {
            let quiz = s
                .quiz
                .as_ref()
                .ok_or_else(|| AppError::NotFound("No quiz has been generated yet".to_string()))?;
            if index >= quiz.questions.len() {
                return Err(AppError::BadRequest(format!(
                    "Question index {} is out of range",
                    index
                )));
            }
            if s.grading_in_flight {
                return Err(AppError::Conflict(
                    "Answers are locked while grading is in progress.".to_string(),
                ));
            }
            s.answers.insert(index, payload.answer);
            Ok(())
        })
        .await??;

    Ok(StatusCode::NO_CONTENT)
}

/// Progress snapshot for the client: answered count, completeness, and the
/// grading status label while a submission is in flight.
pub async fn quiz_status(
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let body = sessions
        .with(&id, |s| {
            json!({
                "submitting": s.grading_in_flight,
                "status": s.grading_status,
                "answered": s.answers.len(),
                "total": s.quiz.as_ref().map(|q| q.questions.len()).unwrap_or(0),
                "complete": s.answers_complete(),
            })
        })
        .await?;

    Ok(Json(body))
}

/// Submits the quiz for grading and returns the preliminary result.
///
/// Stages run strictly in sequence: local multiple-choice grading, one
/// remote theory-grading batch, preliminary result delivery, then narrative
/// feedback back-filled by a spawned task. A theory-grading failure aborts
/// the whole submission with nothing delivered and the answers intact for
/// retry; a feedback failure only degrades the final result to a fallback
/// message. The score is fixed before the feedback stage starts.
pub async fn submit_quiz(
    State(state): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    // Claim the single-flight slot and snapshot the inputs under one lock.
    let (student, quiz, collected) = state
        .sessions
        .with_mut(&id, |s| {
            let quiz = s
                .quiz
                .clone()
                .ok_or_else(|| AppError::NotFound("No quiz to submit".to_string()))?;
            if s.grading_in_flight {
                return Err(AppError::Conflict(
                    "A submission is already in progress.".to_string(),
                ));
            }
            if !s.answers_complete() {
                return Err(AppError::PreconditionFailed(
                    "Please answer all questions before submitting.".to_string(),
                ));
            }
            s.grading_in_flight = true;
            s.grading_status = Some("Grading multiple-choice questions...".to_string());
            Ok((s.student.clone(), quiz, s.answers.clone()))
        })
        .await??;

    let mut pass = grading::grade_multiple_choice(&quiz, &collected);

    if !pass.theory_queue.is_empty() {
        let count = pass.theory_queue.len();
        state
            .sessions
            .with_mut(&id, |s| {
                s.grading_status = Some(format!("Grading {} theory questions with AI...", count));
            })
            .await?;

        let items: Vec<_> = pass.theory_queue.iter().map(|t| t.item.clone()).collect();
        let grades = match state.reasoning.grade_theory_answers(&items).await {
            Ok(grades) => grades,
            Err(err) => {
                // Abort the whole submission: no result is delivered and the
                // quiz and answers stay intact so the student can resubmit.
                state
                    .sessions
                    .with_mut(&id, |s| {
                        s.grading_in_flight = false;
                        s.grading_status = None;
                    })
                    .await?;
                return Err(err);
            }
        };

        pass.score += grading::apply_theory_grades(&mut pass.answers, &pass.theory_queue, &grades);
    }

    let preliminary = QuizResult {
        student,
        quiz_title: quiz.title.clone(),
        score: pass.score,
        total_questions: quiz.questions.len() as u32,
        answers: pass.answers,
        feedback: FEEDBACK_PENDING.to_string(),
    };

    // Preliminary delivery: the result is visible immediately, feedback
    // still pending.
    state
        .sessions
        .with_mut(&id, |s| {
            s.result = Some(preliminary.clone());
            s.grading_status = Some("Generating final feedback...".to_string());
        })
        .await?;

    // Feedback back-fill, non-blocking relative to the preliminary delivery.
    // Failure here never surfaces: the fallback text is a terminal state.
    let sessions = state.sessions.clone();
    let reasoning = state.reasoning.clone();
    let result_for_feedback = preliminary.clone();
    tokio::spawn(async move {
        let feedback = match reasoning.generate_feedback(&result_for_feedback).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!("Failed to get feedback: {}", err);
                FEEDBACK_FALLBACK.to_string()
            }
        };

        let updated = sessions
            .with_mut(&id, |s| {
                if let Some(result) = s.result.as_mut() {
                    result.feedback = feedback;
                }
                s.grading_status = None;
                s.grading_in_flight = false;
            })
            .await;

        if let Err(err) = updated {
            tracing::error!("Failed to store feedback for session {}: {}", id, err);
        }
    });

    Ok(Json(preliminary))
}
