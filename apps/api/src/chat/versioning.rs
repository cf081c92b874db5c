//! Resume version store — append-only, strictly increasing versions.
//!
//! CRITICAL: versions are never updated or deleted. Reverting creates a NEW
//! version that copies a prior version's text, keeping the timeline intact.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::ResumeVersionRow;

/// Appends a new resume version and returns its version number.
///
/// `modified_text = None` means "same as original" (the initial upload case).
/// Version assignment happens inside a single INSERT..SELECT so two writers
/// cannot both read the same max in application code; the
/// `(conversation_id, version)` uniqueness constraint backstops the store.
pub async fn save_resume_version(
    pool: &PgPool,
    conversation_id: Uuid,
    original_text: &str,
    modified_text: Option<&str>,
    reasoning: &str,
) -> Result<i32> {
    let version: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO resume_versions
            (conversation_id, version, original_text, modified_text, reasoning)
        SELECT $1, COALESCE(MAX(version), 0) + 1, $2, COALESCE($3, $2), $4
        FROM resume_versions
        WHERE conversation_id = $1
        RETURNING version
        "#,
    )
    .bind(conversation_id)
    .bind(original_text)
    .bind(modified_text)
    .bind(reasoning)
    .fetch_one(pool)
    .await?;

    info!("Saved resume version {version} for conversation {conversation_id}");
    Ok(version)
}

/// Returns the latest version for a conversation, if a resume was uploaded.
pub async fn get_latest_resume(
    pool: &PgPool,
    conversation_id: Uuid,
) -> Result<Option<ResumeVersionRow>> {
    Ok(sqlx::query_as::<_, ResumeVersionRow>(
        "SELECT * FROM resume_versions WHERE conversation_id = $1 ORDER BY version DESC LIMIT 1",
    )
    .bind(conversation_id)
    .fetch_optional(pool)
    .await?)
}

/// Returns every version for a conversation, oldest first.
pub async fn get_all_versions(
    pool: &PgPool,
    conversation_id: Uuid,
) -> Result<Vec<ResumeVersionRow>> {
    Ok(sqlx::query_as::<_, ResumeVersionRow>(
        "SELECT * FROM resume_versions WHERE conversation_id = $1 ORDER BY version ASC",
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?)
}

/// Reverts by appending a new version that copies the target version's text.
/// Returns the new latest row, or `None` when the target version is missing.
pub async fn revert_to_version(
    pool: &PgPool,
    conversation_id: Uuid,
    version: i32,
) -> Result<Option<ResumeVersionRow>> {
    let target: Option<ResumeVersionRow> = sqlx::query_as(
        "SELECT * FROM resume_versions WHERE conversation_id = $1 AND version = $2",
    )
    .bind(conversation_id)
    .bind(version)
    .fetch_optional(pool)
    .await?;

    let Some(target) = target else {
        return Ok(None);
    };

    save_resume_version(
        pool,
        conversation_id,
        &target.original_text,
        Some(&target.modified_text),
        &format!("Reverted to version {version}."),
    )
    .await?;

    get_latest_resume(pool, conversation_id).await
}
