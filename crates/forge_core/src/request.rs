use serde::{Deserialize, Serialize};

use crate::report::{ScriptArtifact, ValidationReport};
use crate::selectors::SelectorSet;

/// Backend-side refinement rounds per analyze/regenerate call.
pub const MAX_ITERATIONS: u32 = 3;
/// Backend crawl depth cap for script runs.
pub const MAX_PAGES: u32 = 3;

pub type RequestId = u64;

/// Body of the analyze/regenerate call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
    pub pagination_enabled: bool,
    pub pagination_selector: String,
    pub selectors: SelectorSet,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

/// Body of the run-script call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub script: String,
    pub url: String,
    pub format: OutputFormat,
    pub max_pages: u32,
}

/// Which flavour of analyze call is in flight. Both use the same contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeMode {
    Initial,
    Regenerate,
}

impl AnalyzeMode {
    pub fn fallback_error(self) -> &'static str {
        match self {
            AnalyzeMode::Initial => "Error analyzing webpage",
            AnalyzeMode::Regenerate => "Error regenerating script",
        }
    }

    pub fn loading_text(self) -> &'static str {
        match self {
            AnalyzeMode::Initial => "Fetching webpage content...",
            AnalyzeMode::Regenerate => "Regenerating script and validating selectors...",
        }
    }
}

/// Decoded success payload of an analyze/regenerate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub selectors: SelectorSet,
    pub script: ScriptArtifact,
    pub report: ValidationReport,
}

pub const NO_DETAILS: &str = "No detailed error information available.";

/// A failed backend call as seen by the workflow.
///
/// `traceback` and `errors` are alternative detail channels; only one is shown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceFailure {
    pub message: Option<String>,
    pub traceback: Option<String>,
    pub errors: Option<String>,
}

impl ServiceFailure {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// The backend message, or `fallback` when it sent none.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
    }

    /// Traceback if present, else collected errors, else a fixed placeholder.
    pub fn detail(&self) -> &str {
        non_empty(&self.traceback)
            .or_else(|| non_empty(&self.errors))
            .unwrap_or(NO_DETAILS)
    }
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|s| !s.trim().is_empty())
}
