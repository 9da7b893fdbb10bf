//! @ai:module:intent Text heuristics applied to probe responses
//! @ai:module:layer application
//! @ai:module:public_api ResponseAnalyzer, mentions_any, mentions_all, lexical_diversity
//! @ai:module:stateless true

use crate::results::ComplexityMetrics;
use regex::Regex;
use std::collections::HashSet;

/// @ai:intent Detects code and grades code-shaped responses
pub struct ResponseAnalyzer {
    code_block_regex: Regex,
    code_keyword_regex: Regex,
    big_o_regex: Regex,
}

impl ResponseAnalyzer {
    /// @ai:intent Create a new analyzer
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            code_block_regex: Regex::new(r"```(\w*)\n([\s\S]*?)```").unwrap(),
            code_keyword_regex: Regex::new(
                r"(?m)(\bdef\s+\w+\s*\(|\bfunction\b|\bclass\s+\w+|^\s*import\s|console\.log|\bfunc\s+\w+|#include\s*<|\bpublic\s+static\b|=>)",
            )
            .unwrap(),
            big_o_regex: Regex::new(r"O\((1|n|log\s*n|n\s*log\s*n|n\^?2)\)").unwrap(),
        }
    }

    /// @ai:intent Whether a response contains a fenced block or recognizable code
    /// @ai:effects pure
    pub fn contains_code(&self, text: &str) -> bool {
        self.code_block_regex.is_match(text) || self.code_keyword_regex.is_match(text)
    }

    /// @ai:intent Bodies of all fenced code blocks
    /// @ai:effects pure
    pub fn code_blocks<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.code_block_regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(2).map(|m| m.as_str()))
            .collect()
    }

    /// @ai:intent Structural quality: comments, functions, error handling, entry point
    /// @ai:effects pure
    pub fn code_quality(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let mut score = 0.0;

        if lower.contains("//") || lower.contains("# ") || lower.contains("/*") || lower.contains("\"\"\"") {
            score += 25.0;
        }
        if mentions_any(&lower, &["def ", "function", "class ", "fn ", "func "]) {
            score += 25.0;
        }
        if mentions_any(&lower, &["try", "catch", "except", "raise", "throw", "result<"]) {
            score += 30.0;
        }
        if lower.contains("main") {
            score += 20.0;
        }

        score
    }

    /// @ai:intent Presence of control flow, returns, boolean logic and assignment
    /// @ai:effects pure
    pub fn logic_correctness(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let mut score = 0.0;

        if mentions_any(&lower, &["for ", "while ", "if "]) {
            score += 35.0;
        }
        if lower.contains("return") {
            score += 25.0;
        }
        if mentions_any(&lower, &[" and ", " or ", "&&", "||"]) {
            score += 20.0;
        }
        if lower.replace("==", "").contains('=') {
            score += 20.0;
        }

        score
    }

    /// @ai:intent Awareness of efficient constructs and complexity analysis
    /// @ai:effects pure
    pub fn runtime_efficiency(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let mut score = 0.0;

        if mentions_any(&lower, &["map(", "filter(", "reduce(", "comprehension"]) {
            score += 30.0;
        }
        if mentions_any(&lower, &["set", "hash", "dict", "map<"]) {
            score += 25.0;
        }
        if self.big_o_regex.is_match(text) {
            score += 30.0;
        }
        if mentions_any(&lower, &["len(", "size()", ".length"]) {
            score += 15.0;
        }

        score
    }

    /// @ai:intent Deepest structural level a response demonstrates, 1 to 5
    /// @ai:effects pure
    pub fn complexity_depth(&self, text: &str) -> u8 {
        if text.trim().is_empty() {
            return 0;
        }

        let lower = text.to_lowercase();
        let mut depth = 1;
        if lower.contains("class ") {
            depth = 2;
        }
        if depth >= 2 && mentions_any(&lower, &["inherit", "extends", "implements", "super("]) {
            depth = 3;
        }
        if mentions_any(&lower, &["async", "thread", "concurrent", "await"]) {
            depth = depth.max(4);
        }
        if depth >= 3 && mentions_any(&lower, &["design pattern", "factory", "observer", "strategy"]) {
            depth = 5;
        }

        depth
    }

    /// @ai:intent Full complexity metrics for one response
    /// Structure and logic are graded on fenced code when the response has any.
    /// @ai:effects pure
    pub fn complexity_metrics(&self, text: &str) -> ComplexityMetrics {
        let blocks = self.code_blocks(text);
        let code = if blocks.is_empty() {
            text.to_string()
        } else {
            blocks.concat()
        };

        ComplexityMetrics {
            max_handled_depth: self.complexity_depth(text),
            response_chars: text.chars().count(),
            code_quality: self.code_quality(&code),
            logic_correctness: self.logic_correctness(&code),
            runtime_efficiency: self.runtime_efficiency(text),
        }
    }
}

impl Default for ResponseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// @ai:intent Case-insensitive check that any needle appears
/// @ai:effects pure
pub fn mentions_any(text: &str, needles: &[&str]) -> bool {
    let lower = text.to_lowercase();
    needles.iter().any(|n| lower.contains(&n.to_lowercase()))
}

/// @ai:intent Case-insensitive check that every needle appears
/// @ai:effects pure
pub fn mentions_all(text: &str, needles: &[&str]) -> bool {
    let lower = text.to_lowercase();
    needles.iter().all(|n| lower.contains(&n.to_lowercase()))
}

/// @ai:intent Unique words over total words, as a percentage
/// @ai:effects pure
pub fn lexical_diversity(text: &str) -> f64 {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return 0.0;
    }

    let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
    unique.len() as f64 / words.len() as f64 * 100.0
}
