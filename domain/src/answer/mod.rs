//! Canonical answer helpers

pub mod canonical;

pub use canonical::{FactLabel, choice_letter, fact_label, option_letter};
