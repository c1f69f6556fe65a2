//! Answer extraction from free-form rationale text.
//!
//! Pure text processing, no I/O. The same parser is applied to raw rationales
//! from the generator and to rewritten rationales from the corrector, so both
//! sides of the consensus check see identically shaped answers.
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`extract_answer`] | Pull the short answer out of a reasoning chain |
//! | [`answer_key`] | Normalized comparison key used for majority counting |

use crate::core::string::truncate_chars;

/// Explicit answer markers, checked in order. The last occurrence of the
/// first marker present wins.
const ANSWER_MARKERS: &[&str] = &[
    "final answer:",
    "the answer is",
    "answer:",
    "answer is",
    "conclusion:",
];

/// Words that start a trailing justification after the answer.
const TRAILING_CONNECTIVES: &[&str] = &["Therefore", "Thus", "Hence"];

/// Connectives stripped from the start of a concluding sentence.
const LEADING_CONNECTIVES: &[&str] = &["So ", "Thus ", "Therefore ", "Hence "];

/// Prefixes removed when building a comparison key.
const KEY_PREFIXES: &[&str] = &["the answer is", "answer:", "therefore", "thus", "so"];

/// Maximum characters of an answer that participate in comparison.
const KEY_MAX_CHARS: usize = 100;

/// Extract the answer from a rationale.
///
/// 1. Markdown emphasis (`*`, `**`) is removed.
/// 2. If an explicit marker (`Final Answer:`, `The answer is`, `Answer:`, ...)
///    is present, the first line after its last occurrence is taken, cut at a
///    trailing `Therefore`/`Thus`/`Hence`, and reduced to its first sentence.
/// 3. Otherwise the last sentence is used, minus a leading `So`/`Thus`/...
/// 4. If nothing can be parsed, the trimmed text itself is returned.
///
/// The result is never empty unless `text` is blank.
///
/// # Examples
///
/// ```
/// use cok_domain::rationale::parsing::extract_answer;
///
/// assert_eq!(extract_answer("France's capital city is well known.\nAnswer: Paris"), "Paris");
/// assert_eq!(extract_answer("The river flows north. So the answer is the Nile"), "the Nile");
/// assert_eq!(extract_answer("Paris"), "Paris");
/// ```
pub fn extract_answer(text: &str) -> String {
    let cleaned = text.replace('*', "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return text.trim().to_string();
    }

    if let Some(answer) = answer_after_marker(cleaned)
        && !answer.is_empty()
    {
        return answer;
    }

    if let Some(sentence) = last_sentence(cleaned)
        && !sentence.is_empty()
    {
        return sentence;
    }

    cleaned.to_string()
}

/// Normalized comparison key for an extracted answer.
///
/// Lowercases, drops conventional lead-ins ("the answer is", "so", ...),
/// collapses whitespace, strips surrounding punctuation and quotes, and keeps
/// the first 100 characters. `"Paris."`, `"paris"` and `"So, Paris"` share a key.
pub fn answer_key(answer: &str) -> String {
    let mut key = answer.trim().to_lowercase();

    for prefix in KEY_PREFIXES {
        if let Some(rest) = key.strip_prefix(prefix)
            && rest
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric())
        {
            key = rest.to_string();
            break;
        }
    }

    let key = key
        .trim_start_matches(|c: char| c == ':' || c == ',' || c.is_whitespace())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let key = key.trim_matches(|c: char| {
        matches!(c, '.' | '!' | '?' | ',' | ';' | ':' | '"' | '\'' | '`')
    });

    truncate_chars(key, KEY_MAX_CHARS).trim_end().to_string()
}

fn answer_after_marker(text: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lower = text.to_ascii_lowercase();

    let (pos, marker) = ANSWER_MARKERS
        .iter()
        .find_map(|m| lower.rfind(m).map(|pos| (pos, *m)))?;

    let after = text[pos + marker.len()..].trim_start();
    let mut answer = after.lines().next().unwrap_or("").trim();

    for connective in TRAILING_CONNECTIVES {
        if let Some(idx) = answer.find(connective) {
            answer = answer[..idx].trim();
        }
    }

    let answer = answer.trim_start_matches(':').trim();
    let answer = match answer.find(". ") {
        Some(idx) => &answer[..idx],
        None => answer,
    };

    Some(answer.trim().to_string())
}

fn last_sentence(text: &str) -> Option<String> {
    let sentence = text
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .next_back()?;

    for connective in LEADING_CONNECTIVES {
        if let Some(rest) = sentence.strip_prefix(connective) {
            return Some(rest.trim().to_string());
        }
    }
    Some(sentence.to_string())
}
