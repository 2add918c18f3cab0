// src/models/topic.rs

use serde::Deserialize;
use validator::Validate;

/// DTO for requesting an AI explanation of a topic.
#[derive(Debug, Deserialize, Validate)]
pub struct ExplainTopicRequest {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Please enter a topic to search for."
    ))]
    pub topic: String,
}

/// DTO for setting the session's topic content directly (e.g. after editing
/// or loading a saved note on the client side).
#[derive(Debug, Deserialize, Validate)]
pub struct SetTopicRequest {
    #[validate(length(min = 1, message = "Topic content must not be empty."))]
    pub content: String,
}
