// Conversational resume optimization: upload, chat turns, version history.
// All LLM calls go through llm_client via the pipeline — no direct calls here.

pub mod handlers;
pub mod history;
pub mod ingest;
pub mod versioning;
