//! Validator response parsing.
//!
//! Pure text matching over the free-form reply of the consensus validator.
//! A reply without a "yes" token counts as a rejection.

/// Tokens that affirm the candidate answer.
const AFFIRMATIVE_TOKENS: &[&str] = &["yes"];

/// Whether a validator reply affirms the candidate answer.
///
/// The reply is lowercased and split on non-alphanumeric characters. It is
/// affirmative iff one of the tokens is `yes`; other words in the
/// explanation (including "no") do not override it.
///
/// ```
/// use cok_domain::consensus::parsing::is_affirmative;
///
/// assert!(is_affirmative("YES - Paris is the capital."));
/// assert!(is_affirmative("Yes, there is no doubt."));
/// assert!(!is_affirmative("No, that is not relevant."));
/// assert!(!is_affirmative("It depends."));
/// ```
pub fn is_affirmative(response: &str) -> bool {
    response
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| AFFIRMATIVE_TOKENS.contains(&token))
}
