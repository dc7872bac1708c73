/*!
 * Mock provider implementations for testing
 *
 * These adapters avoid external API calls in tests. Each one implements
 * the ProviderAdapter trait and returns predetermined responses while
 * tracking the calls it received.
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use modloc::errors::ProviderError;
use modloc::providers::ProviderAdapter;

/// Tracks calls to ensure no actual external requests are made
#[derive(Debug, Default)]
pub struct CallTracker {
    /// Count of mock calls made
    pub call_count: usize,
    /// Last prompt received
    pub last_prompt: Option<String>,
}

/// Extracts the numbered source texts (`N. "text"`) from a prompt
pub fn sources_from_prompt(prompt: &str) -> Vec<String> {
    prompt
        .lines()
        .filter_map(|line| {
            let (num, rest) = line.split_once(". \"")?;
            num.trim().parse::<usize>().ok()?;
            Some(rest.strip_suffix('"')?.to_string())
        })
        .collect()
}

/// Mock adapter that answers every prompt by uppercasing its source texts
#[derive(Debug)]
pub struct UppercaseTranslator {
    tracker: Arc<Mutex<CallTracker>>,
}

impl UppercaseTranslator {
    pub fn new() -> Self {
        Self {
            tracker: Arc::new(Mutex::new(CallTracker::default())),
        }
    }

    pub fn tracker(&self) -> Arc<Mutex<CallTracker>> {
        self.tracker.clone()
    }

    pub fn call_count(&self) -> usize {
        self.tracker.lock().unwrap().call_count
    }
}

impl Default for UppercaseTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for UppercaseTranslator {
    fn name(&self) -> &str {
        "mock-uppercase"
    }

    async fn initialize(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn call(&self, prompt: &str) -> Result<String, ProviderError> {
        {
            let mut tracker = self.tracker.lock().unwrap();
            tracker.call_count += 1;
            tracker.last_prompt = Some(prompt.to_string());
        }

        let translations: Vec<String> = sources_from_prompt(prompt)
            .iter()
            .map(|s| s.to_uppercase())
            .collect();

        serde_json::to_string(&translations)
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

/// Mock adapter that replays a fixed script of raw responses, then fails
#[derive(Debug)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
    tracker: Arc<Mutex<CallTracker>>,
}

impl ScriptedProvider {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            tracker: Arc::new(Mutex::new(CallTracker::default())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.tracker.lock().unwrap().call_count
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedProvider {
    fn name(&self) -> &str {
        "mock-scripted"
    }

    async fn initialize(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn call(&self, prompt: &str) -> Result<String, ProviderError> {
        {
            let mut tracker = self.tracker.lock().unwrap();
            tracker.call_count += 1;
            tracker.last_prompt = Some(prompt.to_string());
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::RequestFailed("script exhausted".to_string()))
    }
}
