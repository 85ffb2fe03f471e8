/*!
 * Mock provider for testing.
 *
 * The mock reads the first JSON object of the user message (the batch being
 * translated) and answers according to its `MockBehavior`:
 * - `MockProvider::echo()` - flat `{index: "tr: text"}` map
 * - `MockProvider::deep_echo()` - `{index: {optimized_subtitle, revised_translation}}`
 * - `MockProvider::failing()` - always fails with a connection error
 */

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{ChatRequest, ChatResponse, Provider};

/// Prefix the echo behaviors put in front of every "translated" line
pub const MOCK_TRANSLATION_PREFIX: &str = "tr: ";

/// Answer used for requests whose user message holds no JSON batch
pub const MOCK_PLAIN_ANSWER: &str = "A short summary.";

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Flat map with one prefixed translation per input line
    Echo,
    /// Deep map restating every line verbatim
    DeepEcho,
    /// Like `Echo`, but fails for batches with more than `max_entries` lines
    FailAboveBatch { max_entries: usize },
    /// Like `Echo`, but every Nth request fails
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Answers with prose instead of JSON
    Garbage,
    /// Returns the given bodies in order, repeating the last one
    Scripted(Vec<String>),
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn deep_echo() -> Self {
        Self::new(MockBehavior::DeepEcho)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn scripted<S: Into<String>>(bodies: impl IntoIterator<Item = S>) -> Self {
        Self::new(MockBehavior::Scripted(bodies.into_iter().map(Into::into).collect()))
    }

    /// Number of `complete` calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// First JSON object embedded in `content`, if any
    pub fn extract_batch(content: &str) -> Option<Map<String, Value>> {
        let start = content.find('{')?;
        let mut stream = serde_json::Deserializer::from_str(&content[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => Some(map),
            _ => None,
        }
    }

    fn flat_answer(batch: &Map<String, Value>) -> String {
        let out: Map<String, Value> = batch
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(format!("{}{}", MOCK_TRANSLATION_PREFIX, text_of(v)))))
            .collect();
        Value::Object(out).to_string()
    }

    fn deep_answer(batch: &Map<String, Value>) -> String {
        let out: Map<String, Value> = batch
            .iter()
            .map(|(k, v)| {
                let text = text_of(v);
                (
                    k.clone(),
                    json!({
                        "optimized_subtitle": text,
                        "revised_translation": format!("{}{}", MOCK_TRANSLATION_PREFIX, text),
                    }),
                )
            })
            .collect();
        Value::Object(out).to_string()
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn mock_error(message: &str) -> ProviderError {
    ProviderError::ConnectionError(format!("Simulated failure: {}", message))
}

#[async_trait]
impl Provider for MockProvider {
    type Request = ChatRequest;
    type Response = ChatResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let batch = request.user_content().and_then(Self::extract_batch);

        let text = match (&self.behavior, batch) {
            (MockBehavior::Failing, _) => return Err(mock_error("provider is down")),
            (MockBehavior::Garbage, _) => "Sorry, I can only answer in prose.".to_string(),
            (MockBehavior::Scripted(bodies), _) => bodies
                .get(count)
                .or_else(|| bodies.last())
                .cloned()
                .unwrap_or_default(),
            (MockBehavior::Intermittent { fail_every }, _)
                if *fail_every > 0 && count % fail_every == fail_every - 1 =>
            {
                return Err(ProviderError::ApiError {
                    status_code: 503,
                    message: "Simulated intermittent failure".to_string(),
                });
            }
            (MockBehavior::FailAboveBatch { max_entries }, Some(batch)) if batch.len() > *max_entries => {
                return Err(mock_error("batch too large"));
            }
            (_, None) => MOCK_PLAIN_ANSWER.to_string(),
            (MockBehavior::DeepEcho, Some(batch)) => Self::deep_answer(&batch),
            (_, Some(batch)) => Self::flat_answer(&batch),
        };

        Ok(ChatResponse::from_text(request.model, text))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(mock_error("provider is down")),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text()
    }
}
