//! Input checks for prompts arriving at the advice relay.
//! Keeps the templated instruction from being hijacked by free text.

use thiserror::Error;
use tracing::warn;

pub const MAX_PROMPT_CHARS: usize = 64;

/// Prompt injection detection patterns
const INJECTION_PATTERNS: &[&str] = &[
    "ignore previous",
    "ignore above",
    "disregard",
    "forget your instructions",
    "new instructions",
    "system prompt",
    "you are now",
    "act as",
    "pretend to be",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("prompt must not be empty")]
    Empty,
    #[error("prompt is longer than {} characters", MAX_PROMPT_CHARS)]
    TooLong,
    #[error("prompt was rejected")]
    Injection,
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Check if input contains a prompt injection phrase as whole words, so
/// labels such as "Impact assist" are not caught by "act as".
pub fn contains_injection(text: &str) -> bool {
    let text_words = words(text);
    INJECTION_PATTERNS.iter().any(|pattern| {
        let pattern_words = words(pattern);
        text_words
            .windows(pattern_words.len())
            .any(|window| window == pattern_words.as_slice())
    })
}

/// Trims the prompt, collapses whitespace runs and control characters to
/// single spaces, then validates it.
pub fn normalize_prompt(raw: &str) -> Result<String, GuardError> {
    let collapsed = raw
        .split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.is_empty() {
        return Err(GuardError::Empty);
    }
    if collapsed.chars().count() > MAX_PROMPT_CHARS {
        warn!("Guard: Rejected over-long prompt ({} chars)", collapsed.chars().count());
        return Err(GuardError::TooLong);
    }
    if contains_injection(&collapsed) {
        warn!("Guard: Blocked potential prompt injection attempt");
        return Err(GuardError::Injection);
    }
    Ok(collapsed)
}
