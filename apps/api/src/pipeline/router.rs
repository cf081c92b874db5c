//! Router — classifies a free-form user message into an ordered capability
//! sequence.
//!
//! Routing mistakes must never abort the user's request: anything the
//! classifier returns that is not a non-empty JSON array of strings degrades
//! silently to the chit-chat fallback. Capability names are NOT validated
//! here — unknown tags flow through to the orchestrator's `Unrecognized`
//! dispatch.

use tracing::{debug, warn};

use crate::llm_client::{strip_json_fences, TextGenerator};
use crate::models::chat::MessageRow;
use crate::pipeline::prompts::{ROUTER_PROMPT_TEMPLATE, ROUTER_SYSTEM};
use crate::pipeline::registry::FALLBACK_TAG;
use crate::pipeline::retry::{invoke_with_retry, DEFAULT_MAX_ATTEMPTS};
use crate::pipeline::PipelineError;

/// Produces the ordered capability sequence for a user message.
///
/// The classification call goes through the retry wrapper; rate-limit
/// exhaustion there is a real failure and propagates, while garbage output
/// is recovered locally.
pub async fn route(
    llm: &dyn TextGenerator,
    message: &str,
    history: &[MessageRow],
) -> Result<Vec<String>, PipelineError> {
    let prompt = ROUTER_PROMPT_TEMPLATE
        .replace("{message}", message)
        .replace("{history}", &render_history(history));

    let raw = invoke_with_retry(llm, &prompt, ROUTER_SYSTEM, DEFAULT_MAX_ATTEMPTS).await?;

    let decision = parse_route_decision(&raw);
    debug!("Routed message to {decision:?}");
    Ok(decision)
}

fn render_history(history: &[MessageRow]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses the classifier's raw output into a non-empty tag sequence.
///
/// A JSON array of strings is used verbatim (non-string elements are
/// dropped). Everything else — parse failures, non-arrays, empty arrays —
/// falls back to `[general_chitchat]`.
pub fn parse_route_decision(raw: &str) -> Vec<String> {
    let text = strip_json_fences(raw);

    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        warn!("Router output was not valid JSON, falling back to chit-chat");
        return vec![FALLBACK_TAG.to_string()];
    };

    let Some(items) = value.as_array() else {
        warn!("Router output was not a JSON array, falling back to chit-chat");
        return vec![FALLBACK_TAG.to_string()];
    };

    let tags: Vec<String> = items
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    if tags.is_empty() {
        return vec![FALLBACK_TAG.to_string()];
    }
    tags
}
