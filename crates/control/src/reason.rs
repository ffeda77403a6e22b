// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transition-reason sanitization
//!
//! The pipeline API restricts the free-text reason on a disabled transition
//! to a small character set and 300 characters. Event summaries are
//! arbitrary text, so they are scrubbed before submission.

/// Maximum length the pipeline API accepts for a transition reason.
const MAX_REASON_LENGTH: usize = 300;

/// Replace every character outside `[a-zA-Z0-9!@ ().*?-]` with `-` and
/// truncate to the API limit.
pub fn sanitize_reason(reason: &str) -> String {
    reason
        .chars()
        .map(|c| if is_allowed(c) { c } else { '-' })
        .take(MAX_REASON_LENGTH)
        .collect()
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '!' | '@' | ' ' | '(' | ')' | '.' | '*' | '?' | '-')
}

#[cfg(test)]
#[path = "reason_tests.rs"]
mod tests;
