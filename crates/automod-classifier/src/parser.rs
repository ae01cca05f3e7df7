//! Verdict extraction from model output text

use automod_core::{Error, Result, Safety, Verdict};
use regex::Regex;
use std::fmt::Debug;

/// Turns the full text of a guard-model response into a [`Verdict`]
pub trait VerdictParser: Send + Sync + Debug {
    /// Parse the complete (trimmed) response text
    fn parse(&self, text: &str) -> Verdict;
}

/// Marker-based parser for guard models that answer in the form
/// ```text
/// Safety: Unsafe
/// Categories: Violent
/// ```
/// Both markers are matched case-insensitively and independently.
#[derive(Debug, Clone)]
pub struct RegexVerdictParser {
    safety_regex: Regex,
    categories_regex: Regex,
}

impl RegexVerdictParser {
    /// Create a new marker parser
    pub fn new() -> Result<Self> {
        // Word boundary keeps "Safety: Safely" from reading as Safe
        let safety_regex = Regex::new(r"(?i)Safety:\s*(Safe|Unsafe|Controversial)\b")
            .map_err(|e| Error::internal(format!("Failed to compile safety regex: {}", e)))?;
        // Capture stays on the marker's own line
        let categories_regex = Regex::new(r"(?i)Categories:[ \t]*([^\r\n]*)")
            .map_err(|e| Error::internal(format!("Failed to compile categories regex: {}", e)))?;

        Ok(Self {
            safety_regex,
            categories_regex,
        })
    }
}

impl Default for RegexVerdictParser {
    fn default() -> Self {
        Self::new().expect("Failed to create verdict parser")
    }
}

impl VerdictParser for RegexVerdictParser {
    fn parse(&self, text: &str) -> Verdict {
        let safety = self
            .safety_regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| Safety::from_label(m.as_str()))
            .unwrap_or(Safety::Unknown);

        let categories = self
            .categories_regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|c| !c.is_empty())
            .map(str::to_owned);

        Verdict::new(safety, categories)
    }
}
