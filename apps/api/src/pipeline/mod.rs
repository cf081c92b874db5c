//! Request-routing and multi-step orchestration pipeline.
//!
//! Flow: route → run each capability in order, threading a single document
//! value → `PipelineResult`. Later steps must see earlier steps' edits
//! ("align to company, then localize" localizes the aligned text), so the
//! fold is strictly sequential and holds no shared mutable state across
//! requests.
//!
//! The caller owns persistence: a version is written only after the whole
//! sequence succeeds and the document actually changed.

pub mod parser;
pub mod prompts;
pub mod registry;
pub mod retry;
pub mod router;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::llm_client::TextGenerator;
use crate::models::chat::MessageRow;
use crate::pipeline::parser::parse_step_output;
use crate::pipeline::prompts::CHITCHAT_FALLBACK;
use crate::pipeline::registry::Capability;
use crate::pipeline::retry::{invoke_with_retry, DEFAULT_MAX_ATTEMPTS};

/// Unrecoverable pipeline failures. Routing and parsing degradations are
/// recovered locally and never reach this type.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    #[error("Generation failed: {0}")]
    Generation(String),
}

/// Aggregated outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub final_document: String,
    /// Each step's reasoning, labeled by capability title.
    pub aggregated_reasoning: String,
    /// Last non-absent score seen across the sequence.
    pub match_score: Option<f64>,
    /// Last non-absent gap list seen across the sequence.
    pub skill_gaps: Option<Vec<String>>,
}

/// Executes the routed capability sequence against the current document.
///
/// Aborts on the first unrecoverable step failure (retry exhaustion or a hard
/// generation error) — no partial document state leaks out through an `Err`,
/// so the caller can never persist a half-finished sequence.
pub async fn run_pipeline(
    llm: &dyn TextGenerator,
    sequence: &[String],
    message: &str,
    document: &str,
) -> Result<PipelineResult, PipelineError> {
    let mut current_document = document.to_string();
    let mut reasoning = String::new();
    let mut match_score: Option<f64> = None;
    let mut skill_gaps: Option<Vec<String>> = None;

    for tag in sequence {
        let capability = Capability::from_tag(tag);

        let (Some(template), Some(system), Some(expected)) = (
            capability.prompt_template(),
            capability.system_prompt(),
            capability.expected_output(),
        ) else {
            // Unknown tags (chit-chat included) get the fixed fallback reply
            // and never touch the document.
            reasoning.push_str(&format!("\n\n{}: {}", capability.title(), CHITCHAT_FALLBACK));
            continue;
        };

        info!("Running capability: {}", capability.title());

        let prompt = template
            .replace("{message}", message)
            .replace("{current_document}", &current_document);
        let system = format!("{system}\n\nExpected output: {expected}");

        let raw = invoke_with_retry(llm, &prompt, &system, DEFAULT_MAX_ATTEMPTS).await?;
        let step = parse_step_output(&raw);

        reasoning.push_str(&format!("\n\n{}: {}", capability.title(), step.reasoning));

        // A step that produced no document edit keeps the prior document.
        if let Some(doc) = step.updated_document {
            current_document = doc;
        }
        if step.match_score.is_some() {
            match_score = step.match_score;
        }
        if step.skill_gaps.is_some() {
            skill_gaps = step.skill_gaps;
        }
    }

    Ok(PipelineResult {
        final_document: current_document,
        aggregated_reasoning: reasoning.trim().to_string(),
        match_score,
        skill_gaps,
    })
}

/// The one operation the pipeline exposes to its caller: classify the
/// message, then execute the resulting sequence. Performs no persistence —
/// the caller appends the new document version (only if the document
/// changed) and the conversation turns.
pub async fn process_chat_turn(
    llm: &dyn TextGenerator,
    user_message: &str,
    history: &[MessageRow],
    current_document: &str,
) -> Result<PipelineResult, PipelineError> {
    let sequence = router::route(llm, user_message, history).await?;
    run_pipeline(llm, &sequence, user_message, current_document).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Returns the same response for every invocation.
    struct StaticGenerator {
        response: String,
        calls: AtomicU32,
    }

    impl StaticGenerator {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StaticGenerator {
        async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    /// Pops scripted responses in order.
    struct ScriptedGenerator {
        responses: Mutex<VecDeque<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted"))
        }
    }

    /// Edits the document it finds embedded in the prompt, prefixing it with
    /// a marker derived from which capability's template it was invoked
    /// through. Makes the fold's order observable.
    struct TaggingGenerator;

    fn embedded_document(prompt: &str) -> &str {
        let start = prompt.find("---RESUME---\n").map(|i| i + "---RESUME---\n".len());
        let doc = &prompt[start.expect("prompt carries no resume block")..];
        doc.split("\n---").next().unwrap_or(doc)
    }

    #[async_trait]
    impl TextGenerator for TaggingGenerator {
        async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            let tag = if prompt.contains("STAR method") {
                "enhance"
            } else if prompt.contains("localization") {
                "localize"
            } else {
                "other"
            };
            Ok(format!(
                "Applied {tag}.\n###UPDATED_RESUME###\n{tag}({})",
                embedded_document(prompt)
            ))
        }
    }

    /// Always rate limited.
    struct RateLimitedGenerator {
        calls: AtomicU32,
    }

    #[async_trait]
    impl TextGenerator for RateLimitedGenerator {
        async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::RateLimited {
                message: "try again in 0s".to_string(),
            })
        }
    }

    fn seq(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_single_step_replaces_document_and_labels_reasoning() {
        let llm = StaticGenerator::new("Better.\n###UPDATED_RESUME###\nImproved");

        let result = run_pipeline(&llm, &seq(&["section_enhancer"]), "punch it up", "Old")
            .await
            .unwrap();

        assert_eq!(result.final_document, "Improved");
        assert!(result
            .aggregated_reasoning
            .contains("Section Enhancement: Better."));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_tag_is_a_no_op_with_fallback_reply() {
        let llm = StaticGenerator::new("should never be called");

        let result = run_pipeline(&llm, &seq(&["unknown_tag"]), "hi", "Old")
            .await
            .unwrap();

        assert_eq!(result.final_document, "Old");
        assert!(result.aggregated_reasoning.contains(CHITCHAT_FALLBACK));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0, "no generation for unknown tags");
    }

    #[tokio::test]
    async fn test_chitchat_tag_behaves_like_unknown() {
        let llm = StaticGenerator::new("should never be called");

        let result = run_pipeline(&llm, &seq(&["general_chitchat"]), "hello!", "Old")
            .await
            .unwrap();

        assert_eq!(result.final_document, "Old");
        assert!(result.aggregated_reasoning.starts_with("General:"));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fold_is_order_sensitive() {
        let forward = run_pipeline(
            &TaggingGenerator,
            &seq(&["section_enhancer", "translation"]),
            "enhance then translate",
            "Old",
        )
        .await
        .unwrap();

        let reverse = run_pipeline(
            &TaggingGenerator,
            &seq(&["translation", "section_enhancer"]),
            "translate then enhance",
            "Old",
        )
        .await
        .unwrap();

        assert_eq!(forward.final_document, "localize(enhance(Old))");
        assert_eq!(reverse.final_document, "enhance(localize(Old))");
        assert_ne!(forward.final_document, reverse.final_document);
    }

    #[tokio::test]
    async fn test_step_without_document_edit_keeps_prior_document() {
        let llm = ScriptedGenerator::new(&[
            "Rewrote.\n###UPDATED_RESUME###\nEdited",
            "Nothing structural to change here.",
        ]);

        let result = run_pipeline(
            &llm,
            &seq(&["section_enhancer", "company_researcher"]),
            "msg",
            "Old",
        )
        .await
        .unwrap();

        assert_eq!(result.final_document, "Edited");
    }

    #[tokio::test]
    async fn test_score_and_gaps_survive_later_steps_without_them() {
        let llm = ScriptedGenerator::new(&[
            "Match score: 60%. Solid.\n###SKILL_GAPS###\n- Kafka\n###UPDATED_RESUME###\nMatched",
            "Polished the summary.\n###UPDATED_RESUME###\nPolished",
        ]);

        let result = run_pipeline(
            &llm,
            &seq(&["job_matcher", "section_enhancer"]),
            "msg",
            "Old",
        )
        .await
        .unwrap();

        assert_eq!(result.final_document, "Polished");
        assert_eq!(result.match_score, Some(60.0));
        assert_eq!(result.skill_gaps, Some(vec!["Kafka".to_string()]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhaustion_aborts_the_sequence() {
        let llm = RateLimitedGenerator {
            calls: AtomicU32::new(0),
        };

        let err = run_pipeline(
            &llm,
            &seq(&["section_enhancer", "job_matcher"]),
            "msg",
            "Old",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::RateLimitExceeded { attempts: 3 }));
        // Only the first step's attempts ran; the second step never started.
        assert_eq!(llm.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_process_chat_turn_routes_then_executes() {
        let llm = ScriptedGenerator::new(&[
            r#"["section_enhancer"]"#,
            "Tightened the bullets.\n###UPDATED_RESUME###\nTightened",
        ]);

        let result = process_chat_turn(&llm, "make my experience pop", &[], "Old")
            .await
            .unwrap();

        assert_eq!(result.final_document, "Tightened");
        assert!(result
            .aggregated_reasoning
            .contains("Section Enhancement: Tightened the bullets."));
    }

    #[tokio::test]
    async fn test_process_chat_turn_degrades_to_chitchat_on_router_garbage() {
        let llm = ScriptedGenerator::new(&["not json"]);

        let result = process_chat_turn(&llm, "hey there", &[], "Old")
            .await
            .unwrap();

        assert_eq!(result.final_document, "Old");
        assert!(result.aggregated_reasoning.contains(CHITCHAT_FALLBACK));
    }
}
