use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One immutable resume version.
///
/// `original_text` is fixed at version 1 and carried forward unchanged;
/// `modified_text` is the document as of this version. Version numbers are
/// strictly increasing per conversation, starting at 1.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeVersionRow {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub version: i32,
    pub original_text: String,
    pub modified_text: String,
    pub reasoning: String,
    pub created_at: DateTime<Utc>,
}
