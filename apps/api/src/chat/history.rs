//! Conversation store — conversations and their append-only message log.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::chat::MessageRow;

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// Creates a new conversation and returns its id.
pub async fn create_conversation(pool: &PgPool) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO conversations (id) VALUES ($1)")
        .bind(id)
        .execute(pool)
        .await?;

    info!("Created conversation {id}");
    Ok(id)
}

/// Appends one message to a conversation.
/// CRITICAL: This is append-only. Never UPDATE or DELETE messages.
pub async fn append_message(
    pool: &PgPool,
    conversation_id: Uuid,
    role: &str,
    content: &str,
) -> Result<()> {
    sqlx::query("INSERT INTO messages (conversation_id, role, content) VALUES ($1, $2, $3)")
        .bind(conversation_id)
        .bind(role)
        .bind(content)
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns the full ordered message history for a conversation.
pub async fn get_history(pool: &PgPool, conversation_id: Uuid) -> Result<Vec<MessageRow>> {
    Ok(sqlx::query_as::<_, MessageRow>(
        "SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at ASC",
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?)
}
