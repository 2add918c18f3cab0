// src/models/note.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'notes' table: topic notes saved to the local database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SavedNote {
    pub id: String,

    /// Note title, unique case-insensitively.
    pub title: String,

    /// The full topic explanation text.
    pub content: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for saving the current topic notes.
#[derive(Debug, Deserialize, Validate)]
pub struct SaveNoteRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Note title must be between 1 and 200 characters."
    ))]
    pub title: String,
    #[validate(length(min = 1, message = "Note content must not be empty."))]
    pub content: String,
}
