//! Reasoning domain: how rationales are sampled.

pub mod policy;

pub use policy::{KeywordTier, ReasoningTemplate, SamplingDecision, SamplingPolicy, SamplingReason};
