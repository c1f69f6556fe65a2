//! Completion backend adapters

pub mod cache;
pub mod openai;

pub use cache::CachingBackend;
pub use openai::OpenAiCompatibleBackend;
