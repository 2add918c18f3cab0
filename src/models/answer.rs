// src/models/answer.rs

use serde::{Deserialize, Serialize};

use crate::models::quiz::QuestionType;

/// One graded answer, produced at submission time.
///
/// The graded answers array always has the same length and order as the
/// quiz's questions - downstream aggregation (score, feedback prompt,
/// presentation) indexes positionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_text: String,
    pub question_type: QuestionType,
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// DTO for recording an in-progress answer for one question.
/// The value is not validated against the question type: an empty string
/// still counts as answered.
#[derive(Debug, Deserialize)]
pub struct SetAnswerRequest {
    pub answer: String,
}
