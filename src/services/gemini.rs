// src/services/gemini.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    config::Config,
    error::AppError,
    models::{quiz::Quiz, result::QuizResult, student::Student},
};

/// One theory answer to grade: the question, the reference answer the quiz
/// carries for it, and what the student wrote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TheoryGradingItem {
    pub question_text: String,
    pub ideal_answer: String,
    pub user_answer: String,
}

/// The grade the service returns for one theory answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TheoryGrade {
    pub is_correct: bool,
    pub feedback: String,
}

/// Boundary to the external reasoning service.
///
/// Every operation is a single round trip: no retries, no caching, no
/// streaming. Failures are all-or-nothing per call and surface as
/// `AppError::ServiceUnavailable` with a user-facing message; callers never
/// see partial data.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Free-text explanation of a topic, suitable for a student.
    async fn explain_topic(&self, topic: &str) -> Result<String, AppError>;

    /// Structured quiz generation from topic content.
    async fn generate_quiz(
        &self,
        topic_content: &str,
        student: &Student,
    ) -> Result<Quiz, AppError>;

    /// Grades a batch of theory answers in one call.
    ///
    /// Contract with the service: the returned grades correspond to the
    /// request items by position, with identical length and order. There is
    /// no other correlation key, so a response of the wrong length is
    /// rejected as a failed call. An empty batch short-circuits without a
    /// network round trip.
    async fn grade_theory_answers(
        &self,
        answers: &[TheoryGradingItem],
    ) -> Result<Vec<TheoryGrade>, AppError>;

    /// Free-text narrative feedback for a completed quiz result.
    async fn generate_feedback(&self, result: &QuizResult) -> Result<String, AppError>;
}

// Wire types for the Gemini generateContent REST API.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct TheoryGradeEnvelope {
    results: Vec<TheoryGrade>,
}

/// Production `ReasoningClient` backed by the Gemini generateContent API.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            base_url: config.gemini_base_url.clone(),
        }
    }

    /// One round trip to generateContent, returning the raw text of the
    /// first candidate. `failure_msg` is what the user sees on any failure;
    /// the underlying cause only goes to the log.
    async fn generate_content(
        &self,
        prompt: &str,
        config: Option<GenerationConfig>,
        context: &str,
        failure_msg: &str,
    ) -> Result<String, AppError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: config,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Error during {}: {:?}", context, e);
                AppError::ServiceUnavailable(failure_msg.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                "Reasoning service returned {} during {}: {}",
                status,
                context,
                error_text
            );
            return Err(AppError::ServiceUnavailable(failure_msg.to_string()));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!("Malformed response during {}: {:?}", context, e);
            AppError::ServiceUnavailable(failure_msg.to_string())
        })?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                tracing::error!("Empty candidate list during {}", context);
                AppError::ServiceUnavailable(failure_msg.to_string())
            })
    }
}

#[async_trait]
impl ReasoningClient for GeminiClient {
    async fn explain_topic(&self, topic: &str) -> Result<String, AppError> {
        let prompt = format!(
            "Provide a detailed explanation of the following topic, suitable for a student. \
             Be clear, concise, and well-structured. Topic: \"{}\"",
            topic
        );

        self.generate_content(
            &prompt,
            None,
            "topic explanation",
            "Failed to fetch explanation from AI service. Please try again.",
        )
        .await
    }

    async fn generate_quiz(
        &self,
        topic_content: &str,
        student: &Student,
    ) -> Result<Quiz, AppError> {
        let failure_msg = "Failed to generate quiz from AI service. Please try again.";

        let prompt = format!(
            "Based on the following content, generate a comprehensive quiz for a student named {}.\n\
             The quiz must contain exactly two types of questions:\n\
             1.  {} multiple-choice questions.\n\
             2.  {} theory-based (open-ended) questions.\n\n\
             Mix the questions together throughout the quiz.\n\n\
             Content:\n---\n{}\n---\n\n\
             Return the quiz in JSON format. The JSON object should have a \"title\" (string) and a \"questions\" (array of objects).\n\
             Each question object must have:\n\
             - \"questionText\" (string)\n\
             - \"questionType\" (string: either \"multiple-choice\" or \"theory\")\n\
             - \"correctAnswer\" (string: for theory, this is the ideal answer; for multiple-choice, it must be one of the options)\n\
             - \"options\" (an array of 4 strings, ONLY for \"multiple-choice\" questions)\n",
            student.name,
            crate::models::quiz::MULTIPLE_CHOICE_COUNT,
            crate::models::quiz::THEORY_COUNT,
            topic_content
        );

        // `options` is deliberately not required: theory questions omit it.
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "questions": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "questionText": { "type": "STRING" },
                            "questionType": {
                                "type": "STRING",
                                "enum": ["multiple-choice", "theory"],
                            },
                            "options": {
                                "type": "ARRAY",
                                "items": { "type": "STRING" },
                            },
                            "correctAnswer": { "type": "STRING" },
                        },
                        "required": ["questionText", "questionType", "correctAnswer"],
                    },
                },
            },
            "required": ["title", "questions"],
        });

        let text = self
            .generate_content(
                &prompt,
                Some(GenerationConfig {
                    response_mime_type: "application/json".to_string(),
                    response_schema: schema,
                }),
                "quiz generation",
                failure_msg,
            )
            .await?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse generated quiz: {:?}", e);
            AppError::ServiceUnavailable(failure_msg.to_string())
        })
    }

    async fn grade_theory_answers(
        &self,
        answers: &[TheoryGradingItem],
    ) -> Result<Vec<TheoryGrade>, AppError> {
        if answers.is_empty() {
            return Ok(Vec::new());
        }

        let failure_msg = "Failed to grade theory answers from AI service.";

        let serialized = serde_json::to_string_pretty(answers).map_err(|e| {
            tracing::error!("Failed to serialize theory grading batch: {:?}", e);
            AppError::ServiceUnavailable(failure_msg.to_string())
        })?;

        let prompt = format!(
            "An AI assistant needs to grade a student's theory-based answers. For each question, \
             compare the user's answer to the ideal answer and provide a boolean 'isCorrect' and \
             brief 'feedback'. 'isCorrect' should be true if the user's answer captures the main \
             points of the ideal answer, even if worded differently. The feedback should explain \
             why the answer was right or wrong.\n\n\
             Here are the answers to grade:\n{}\n\n\
             Return a single JSON object with a key \"results\" which is an array of objects. \
             Each object in the array should correspond to an answer, in the same order, and contain:\n\
             - \"isCorrect\" (boolean)\n\
             - \"feedback\" (string)\n",
            serialized
        );

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "results": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "isCorrect": { "type": "BOOLEAN" },
                            "feedback": { "type": "STRING" },
                        },
                        "required": ["isCorrect", "feedback"],
                    },
                },
            },
            "required": ["results"],
        });

        let text = self
            .generate_content(
                &prompt,
                Some(GenerationConfig {
                    response_mime_type: "application/json".to_string(),
                    response_schema: schema,
                }),
                "theory grading",
                failure_msg,
            )
            .await?;

        let envelope: TheoryGradeEnvelope = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse theory grades: {:?}", e);
            AppError::ServiceUnavailable(failure_msg.to_string())
        })?;

        // Positional contract: grades line up with the request by index only.
        if envelope.results.len() != answers.len() {
            tracing::error!(
                "Theory grading returned {} results for {} answers",
                envelope.results.len(),
                answers.len()
            );
            return Err(AppError::ServiceUnavailable(failure_msg.to_string()));
        }

        Ok(envelope.results)
    }

    async fn generate_feedback(&self, result: &QuizResult) -> Result<String, AppError> {
        let answer_lines = result
            .answers
            .iter()
            .map(|a| {
                let verdict = if a.is_correct {
                    "Correct".to_string()
                } else {
                    format!("Incorrect, correct answer was \"{}\"", a.correct_answer)
                };
                format!(
                    "  - Question: \"{}\"\n    - Their answer: \"{}\" ({})",
                    a.question_text, a.selected_answer, verdict
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "A student named {} has just completed a quiz on \"{}\".\n\
             Here are their results:\n\
             - Score: {} out of {}\n\
             - Their answers:\n{}\n\n\
             Please provide some brief, encouraging, and constructive feedback for {}. \
             Highlight what they did well and suggest areas for improvement based on their \
             incorrect answers. Keep it friendly and positive.",
            result.student.name,
            result.quiz_title,
            result.score,
            result.total_questions,
            answer_lines,
            result.student.name
        );

        self.generate_content(
            &prompt,
            None,
            "feedback generation",
            "Failed to generate feedback from AI service.",
        )
        .await
    }
}
