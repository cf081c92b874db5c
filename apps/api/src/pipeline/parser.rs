//! Output Parser — extracts structured fields from a capability's raw text
//! output.
//!
//! Step output is free-form prose with an optional wire protocol embedded in
//! it: a `###SKILL_GAPS###` section and a `###UPDATED_RESUME###` section, each
//! running to the next marker or end of text. This module is the only place
//! that knows the protocol; everything downstream sees a `StepResult`.
//!
//! Every ambiguous case resolves to "field absent", never to a guessed
//! default, so an absent field can never clobber known state during the
//! orchestrator fold.

use serde::Serialize;

/// Opens the skill-gap list, one gap per line. Wire-exact — do not change.
pub const SKILL_GAPS_MARKER: &str = "###SKILL_GAPS###";
/// Opens the full replacement document. Wire-exact — do not change.
pub const UPDATED_RESUME_MARKER: &str = "###UPDATED_RESUME###";

/// Structured view of a single step's raw output. Transient: folded into the
/// running `PipelineResult` and discarded.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub reasoning: String,
    pub updated_document: Option<String>,
    pub match_score: Option<f64>,
    pub skill_gaps: Option<Vec<String>>,
}

/// Parses a step's raw text output. Never fails: with no markers present the
/// whole text is reasoning and every optional field is absent.
pub fn parse_step_output(raw: &str) -> StepResult {
    let (head, updated_document) = match raw.split_once(UPDATED_RESUME_MARKER) {
        Some((head, tail)) => {
            let doc = tail.trim();
            // An empty document section must not erase existing content.
            (head, (!doc.is_empty()).then(|| doc.to_string()))
        }
        None => (raw, None),
    };

    let (reasoning, skill_gaps) = match head.split_once(SKILL_GAPS_MARKER) {
        Some((reasoning, gaps_block)) => (reasoning, parse_gap_lines(gaps_block)),
        None => (head, None),
    };

    let reasoning = reasoning.trim().to_string();
    let match_score = extract_match_score(&reasoning);

    StepResult {
        reasoning,
        updated_document,
        match_score,
        skill_gaps,
    }
}

/// Splits the gaps block into lines, dropping blanks and stripping a single
/// leading bullet where present. Lines without a bullet are kept as-is.
fn parse_gap_lines(block: &str) -> Option<Vec<String>> {
    let gaps: Vec<String> = block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.strip_prefix(['-', '*'])
                .map(str::trim_start)
                .unwrap_or(line)
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect();

    (!gaps.is_empty()).then_some(gaps)
}

/// Best-effort score extraction over free-form narrative text.
///
/// Finds the literal "match score:" (case-insensitive), reads up to the next
/// `%` — or to the end of the line when no `%` follows — strips everything
/// through the last `:` in that run, trims, and parses. A value outside
/// [0, 100] is treated as absent rather than clamped. Scores are only found
/// when the generating step follows the expected phrasing convention; that is
/// the contract.
fn extract_match_score(reasoning: &str) -> Option<f64> {
    let lower = reasoning.to_lowercase();
    let start = lower.find("match score:")?;
    let tail = &lower[start..];

    let run = match tail.find('%') {
        Some(pos) => &tail[..pos],
        None => tail.lines().next().unwrap_or(tail),
    };

    let candidate = run.rsplit(':').next().unwrap_or(run).trim();
    let score: f64 = candidate.parse().ok()?;

    (score.is_finite() && (0.0..=100.0).contains(&score)).then_some(score)
}
