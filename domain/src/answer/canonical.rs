//! Canonical short-form answers for reporting.
//!
//! The pipeline returns the deciding stage's text verbatim; these helpers map
//! it onto dataset conventions when a caller wants a label or a letter.

/// Fact-verification labels in their dataset spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactLabel {
    Supports,
    Refutes,
    NotEnoughInfo,
}

impl FactLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactLabel::Supports => "SUPPORTS",
            FactLabel::Refutes => "REFUTES",
            FactLabel::NotEnoughInfo => "NOT ENOUGH INFO",
        }
    }
}

impl std::fmt::Display for FactLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map free text onto a fact-verification label.
///
/// "Not enough info" is checked first because its wording overlaps with
/// negated forms of the other two labels.
pub fn fact_label(answer: &str) -> Option<FactLabel> {
    let upper = answer.to_uppercase();

    if upper.contains("NOT ENOUGH")
        || upper.contains("INSUFFICIENT")
        || upper.contains("CANNOT BE DETERMINED")
    {
        return Some(FactLabel::NotEnoughInfo);
    }
    if upper.contains("REFUTE") || upper.contains("FALSE") || upper.contains("CONTRADICT") {
        return Some(FactLabel::Refutes);
    }
    if upper.contains("SUPPORT") || upper.contains("TRUE") || upper.contains("CORRECT") {
        return Some(FactLabel::Supports);
    }
    None
}

/// Letter for option index `i` (`0 → 'A'`).
pub fn option_letter(index: usize) -> Option<char> {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i))
}

/// Pick the multiple-choice letter an answer refers to.
///
/// Accepts a bare letter (`"B"`, `"(b)"`, `"B."`), a letter after an answer
/// lead-in (`"The answer is C"`), or the full text of one option.
pub fn choice_letter(answer: &str, choices: &[String]) -> Option<char> {
    let in_range = |c: char| {
        c.is_ascii_alphabetic()
            && ((c.to_ascii_uppercase() as u8 - b'A') as usize) < choices.len()
    };

    let trimmed = answer
        .trim()
        .trim_matches(|c: char| matches!(c, '(' | ')' | '.' | ':' | '*' | '"' | '\''));

    let mut chars = trimmed.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && in_range(c)
    {
        return Some(c.to_ascii_uppercase());
    }

    // Standalone single-letter token, e.g. "Option (C) is right" or "answer: d"
    let lone = trimmed
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| token.len() == 1)
        .filter_map(|token| token.chars().next())
        .filter(|c| c.is_ascii_uppercase() || answer.trim().len() <= 3)
        .find(|c| in_range(*c));
    if let Some(c) = lone {
        return Some(c.to_ascii_uppercase());
    }

    let lower = answer.to_lowercase();
    choices
        .iter()
        .position(|choice| {
            let choice = choice.trim().to_lowercase();
            !choice.is_empty() && lower.contains(&choice)
        })
        .and_then(option_letter)
}
