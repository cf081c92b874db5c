use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Generation capability behind a trait so pipeline code can be exercised
    /// with stubs in tests. Production: `LlmClient`.
    pub llm: Arc<dyn TextGenerator>,
    pub config: Config,
}
