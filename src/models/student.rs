// src/models/student.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// The student a session belongs to.
/// Created once when the session starts; immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
}

impl Student {
    pub fn new(name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
        }
    }
}

/// DTO for opening a new session.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Student name must be between 1 and 100 characters."
    ))]
    pub name: String,
}
