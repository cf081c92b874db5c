use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One conversation turn. Append-only: never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub conversation_id: Uuid,
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub conversation_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub conversation_id: Uuid,
    pub agent_response: String,
    pub reasoning: String,
    pub updated_resume: String,
    pub match_score: Option<f64>,
    pub skill_gaps: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub conversation_id: Uuid,
    pub resume_text: String,
    pub message: String,
}
