//! Response cache for deterministic completion calls.
//!
//! Only zero-temperature calls are memoized. Sampled calls always reach the
//! inner backend so the k rationales of a batch stay independent.

use async_trait::async_trait;
use cok_application::ports::completion::{CompletionBackend, CompletionError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Caching decorator around another [`CompletionBackend`]
pub struct CachingBackend {
    inner: Arc<dyn CompletionBackend>,
    entries: Mutex<HashMap<(String, u32), String>>,
}

impl CachingBackend {
    pub fn new(inner: Arc<dyn CompletionBackend>) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CompletionBackend for CachingBackend {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, CompletionError> {
        if temperature != 0.0 {
            return self.inner.complete(prompt, temperature, max_tokens).await;
        }

        let key = (prompt.to_string(), max_tokens);
        if let Ok(entries) = self.entries.lock()
            && let Some(hit) = entries.get(&key)
        {
            debug!("Cache hit ({} chars)", hit.len());
            return Ok(hit.clone());
        }

        let text = self.inner.complete(prompt, temperature, max_tokens).await?;
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, text.clone());
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
