//! Axum route handlers for the Chat API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::chat::history::{
    append_message, create_conversation, get_history, ROLE_ASSISTANT, ROLE_USER,
};
use crate::chat::ingest::extract_resume_text;
use crate::chat::versioning::{
    get_all_versions, get_latest_resume, revert_to_version, save_resume_version,
};
use crate::errors::AppError;
use crate::models::chat::{ChatRequest, ChatResponse, UploadResponse};
use crate::models::resume::ResumeVersionRow;
use crate::pipeline::process_chat_turn;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct VersionsResponse {
    pub versions: Vec<ResumeVersionRow>,
}

#[derive(Debug, Serialize)]
pub struct RevertResponse {
    pub message: String,
    pub resume: String,
}

/// POST /api/v1/upload
///
/// Accepts a multipart `file` field (PDF or plain text), extracts the resume
/// text, opens a new conversation, and stores it as version 1.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            upload = Some((content_type, data.to_vec()));
        }
    }

    let (content_type, data) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;

    let resume_text = extract_resume_text(&content_type, &data)?;

    let conversation_id = create_conversation(&state.db)
        .await
        .map_err(AppError::Internal)?;

    save_resume_version(&state.db, conversation_id, &resume_text, None, "Initial upload.")
        .await
        .map_err(AppError::Internal)?;

    info!("Uploaded resume for new conversation {conversation_id}");

    Ok(Json(UploadResponse {
        conversation_id,
        resume_text,
        message: "Resume uploaded. Version 1 saved.".to_string(),
    }))
}

/// POST /api/v1/chat
///
/// The full turn: load the latest resume and history, log the user message,
/// route and run the pipeline, persist a new version only when the document
/// actually changed, then log the assistant reply.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let latest = get_latest_resume(&state.db, request.conversation_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| {
            AppError::NotFound(
                "No resume found for this conversation. Upload one first.".to_string(),
            )
        })?;

    let history = get_history(&state.db, request.conversation_id)
        .await
        .map_err(AppError::Internal)?;

    append_message(&state.db, request.conversation_id, ROLE_USER, &request.message)
        .await
        .map_err(AppError::Internal)?;

    let result = process_chat_turn(
        state.llm.as_ref(),
        &request.message,
        &history,
        &latest.modified_text,
    )
    .await?;

    // Immutable history: only a changed, non-empty document earns a version.
    if !result.final_document.is_empty() && result.final_document != latest.modified_text {
        save_resume_version(
            &state.db,
            request.conversation_id,
            &latest.original_text,
            Some(&result.final_document),
            &result.aggregated_reasoning,
        )
        .await
        .map_err(AppError::Internal)?;
    }

    append_message(
        &state.db,
        request.conversation_id,
        ROLE_ASSISTANT,
        &result.aggregated_reasoning,
    )
    .await
    .map_err(AppError::Internal)?;

    Ok(Json(ChatResponse {
        conversation_id: request.conversation_id,
        agent_response: result.aggregated_reasoning.clone(),
        reasoning: result.aggregated_reasoning,
        updated_resume: result.final_document,
        match_score: result.match_score,
        skill_gaps: result.skill_gaps,
    }))
}

/// GET /api/v1/conversations/:id/versions
///
/// All resume versions for a conversation, oldest first. A git history for
/// your career.
pub async fn handle_get_versions(
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<VersionsResponse>, AppError> {
    let versions = get_all_versions(&state.db, conversation_id)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(VersionsResponse { versions }))
}

/// POST /api/v1/conversations/:id/revert/:version
///
/// Appends a new version copying the target version's text. Nothing is
/// deleted.
pub async fn handle_revert(
    State(state): State<AppState>,
    Path((conversation_id, version)): Path<(Uuid, i32)>,
) -> Result<Json<RevertResponse>, AppError> {
    let reverted = revert_to_version(&state.db, conversation_id, version)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("Version {version} not found")))?;

    Ok(Json(RevertResponse {
        message: format!("Reverted to version {version}"),
        resume: reverted.modified_text,
    }))
}
