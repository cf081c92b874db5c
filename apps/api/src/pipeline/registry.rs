//! Capability Registry — the closed set of transformation steps the pipeline
//! can dispatch to.
//!
//! Adding a capability means adding a variant here plus its prompt pair in
//! `prompts.rs` (and whatever external collaborator actually performs the
//! generation); the orchestrator and parser need no changes.

use crate::pipeline::prompts;

/// Canonical tag the router falls back to when it cannot produce a usable
/// decision. Not a worker capability — it resolves to `Unrecognized` at
/// dispatch and gets the fixed chit-chat reply.
pub const FALLBACK_TAG: &str = "general_chitchat";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    CompanyResearcher,
    JobMatcher,
    SectionEnhancer,
    Translation,
    /// Any tag outside the closed set, `general_chitchat` included.
    Unrecognized,
}

impl Capability {
    /// Resolves a routed tag. Trims and lowercases before matching, so the
    /// router can pass tags through verbatim.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "company_researcher" => Self::CompanyResearcher,
            "job_matcher" => Self::JobMatcher,
            "section_enhancer" => Self::SectionEnhancer,
            "translation" => Self::Translation,
            _ => Self::Unrecognized,
        }
    }

    /// Human-readable label used to prefix each step's reasoning in the
    /// aggregated response.
    pub fn title(self) -> &'static str {
        match self {
            Self::CompanyResearcher => "Company Research",
            Self::JobMatcher => "Job Matching",
            Self::SectionEnhancer => "Section Enhancement",
            Self::Translation => "Translation & Localization",
            Self::Unrecognized => "General",
        }
    }

    /// Invocation template with `{message}` and `{current_document}`
    /// placeholders. `None` for `Unrecognized` — the orchestrator never
    /// invokes it.
    pub fn prompt_template(self) -> Option<&'static str> {
        match self {
            Self::CompanyResearcher => Some(prompts::COMPANY_RESEARCH_TEMPLATE),
            Self::JobMatcher => Some(prompts::JOB_MATCH_TEMPLATE),
            Self::SectionEnhancer => Some(prompts::SECTION_ENHANCE_TEMPLATE),
            Self::Translation => Some(prompts::TRANSLATION_TEMPLATE),
            Self::Unrecognized => None,
        }
    }

    pub fn system_prompt(self) -> Option<&'static str> {
        match self {
            Self::CompanyResearcher => Some(prompts::COMPANY_RESEARCH_SYSTEM),
            Self::JobMatcher => Some(prompts::JOB_MATCH_SYSTEM),
            Self::SectionEnhancer => Some(prompts::SECTION_ENHANCE_SYSTEM),
            Self::Translation => Some(prompts::TRANSLATION_SYSTEM),
            Self::Unrecognized => None,
        }
    }

    /// What the step is expected to emit. Prompting documentation only —
    /// never consulted for control flow.
    pub fn expected_output(self) -> Option<&'static str> {
        match self {
            Self::CompanyResearcher => {
                Some("An explanation of the alignment changes, followed by the full updated resume.")
            }
            Self::JobMatcher => Some(
                "An analysis with a match score, a list of skill gaps, and the full updated resume.",
            ),
            Self::SectionEnhancer => {
                Some("An explanation of the improvements, followed by the full updated resume.")
            }
            Self::Translation => Some(
                "An explanation of localization choices, followed by the full translated resume.",
            ),
            Self::Unrecognized => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_resolves_known_capabilities() {
        assert_eq!(
            Capability::from_tag("company_researcher"),
            Capability::CompanyResearcher
        );
        assert_eq!(Capability::from_tag("job_matcher"), Capability::JobMatcher);
        assert_eq!(
            Capability::from_tag("section_enhancer"),
            Capability::SectionEnhancer
        );
        assert_eq!(Capability::from_tag("translation"), Capability::Translation);
    }

    #[test]
    fn test_from_tag_normalizes_case_and_whitespace() {
        assert_eq!(
            Capability::from_tag("  Job_Matcher \n"),
            Capability::JobMatcher
        );
        assert_eq!(
            Capability::from_tag("TRANSLATION"),
            Capability::Translation
        );
    }

    #[test]
    fn test_from_tag_maps_everything_else_to_unrecognized() {
        assert_eq!(
            Capability::from_tag(FALLBACK_TAG),
            Capability::Unrecognized
        );
        assert_eq!(Capability::from_tag("unknown_tag"), Capability::Unrecognized);
        assert_eq!(Capability::from_tag(""), Capability::Unrecognized);
    }

    #[test]
    fn test_worker_capabilities_carry_full_registry_entries() {
        for cap in [
            Capability::CompanyResearcher,
            Capability::JobMatcher,
            Capability::SectionEnhancer,
            Capability::Translation,
        ] {
            assert!(cap.prompt_template().is_some());
            assert!(cap.system_prompt().is_some());
            assert!(cap.expected_output().is_some());
        }
    }

    #[test]
    fn test_unrecognized_has_no_invocation_entry() {
        assert!(Capability::Unrecognized.prompt_template().is_none());
        assert!(Capability::Unrecognized.system_prompt().is_none());
        assert_eq!(Capability::Unrecognized.title(), "General");
    }
}
