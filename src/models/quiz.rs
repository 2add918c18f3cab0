// src/models/quiz.rs

use serde::{Deserialize, Serialize};

/// Requested quiz composition: 30 multiple-choice + 4 theory, mixed order.
/// The reasoning service is instructed to honor this; the response is not
/// re-validated against it (see DESIGN.md), only warned about.
pub const MULTIPLE_CHOICE_COUNT: usize = 30;
pub const THEORY_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "theory")]
    Theory,
}

/// A single quiz question as produced by the reasoning service.
///
/// For multiple-choice questions `correct_answer` is the correct option
/// verbatim (grading is exact, case-sensitive string equality). For theory
/// questions it is the ideal answer the student's free text is compared to,
/// and `options` is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
}

/// A generated quiz. Question order is significant: it defines numbering and
/// is the canonical index correlating answers, theory-grading requests and
/// results. Never mutated in place; replaced wholesale on regeneration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub title: String,
    pub questions: Vec<Question>,
}

/// DTO for sending a question to the browser (excludes the correct answer).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            question_text: q.question_text.clone(),
            question_type: q.question_type,
            options: q.options.clone(),
        }
    }
}

/// DTO for sending a quiz to the browser.
#[derive(Debug, Serialize)]
pub struct PublicQuiz {
    pub title: String,
    pub questions: Vec<PublicQuestion>,
}

impl From<&Quiz> for PublicQuiz {
    fn from(quiz: &Quiz) -> Self {
        Self {
            title: quiz.title.clone(),
            questions: quiz.questions.iter().map(PublicQuestion::from).collect(),
        }
    }
}
