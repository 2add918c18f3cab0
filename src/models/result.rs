// src/models/result.rs

use serde::{Deserialize, Serialize};

use crate::models::{answer::Answer, student::Student};

/// Placeholder feedback on the preliminary result, replaced once the
/// narrative arrives.
pub const FEEDBACK_PENDING: &str = "Generating feedback...";

/// Fallback feedback when the narrative call fails. A missing narrative is a
/// degraded-but-complete terminal state, not an error state.
pub const FEEDBACK_FALLBACK: &str = "Could not load AI feedback.";

/// The outcome of one quiz attempt.
///
/// Delivered twice through the session: first as a preliminary result with
/// `feedback` set to [`FEEDBACK_PENDING`], then again with the real narrative
/// (or [`FEEDBACK_FALLBACK`]). The two deliveries differ only in `feedback`;
/// consumers treat the latest one as authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub student: Student,
    pub quiz_title: String,
    pub score: u32,
    pub total_questions: u32,
    pub answers: Vec<Answer>,
    pub feedback: String,
}
