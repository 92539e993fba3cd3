//! Scripted language model for testing.
//!
//! Provides [`ScriptedModel`], a deterministic, queue-based
//! [`LanguageModel`] that replays pre-configured replies. Agent and tool
//! flows can be exercised end to end without a real model behind them.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use ambit_plugins::{CompletionRequest, LanguageModel, PluginError, PluginResult};

/// A single scripted reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return this text.
    Text(String),
    /// Fail with this message.
    Error(String),
}

/// A deterministic, queue-based [`LanguageModel`] for tests.
///
/// Replies are popped from the front of the queue on each call to
/// [`complete`](LanguageModel::complete). When the queue is exhausted the
/// fallback reply is used if one was set, otherwise the call fails. Every
/// request is captured and can be inspected via
/// [`requests`](Self::requests).
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    fallback: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    /// A model that replays `replies` in order.
    #[must_use]
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| ScriptedReply::Text(r.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// A model that answers every request with `text`.
    #[must_use]
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            fallback: Some(text.into()),
            ..Self::default()
        }
    }

    /// Queue a failing reply.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn then_error(self, message: impl Into<String>) -> Self {
        self.replies
            .lock()
            .expect("lock poisoned")
            .push_back(ScriptedReply::Error(message.into()));
        self
    }

    /// Number of completed calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("lock poisoned").len()
    }

    /// Snapshot of every captured request, one per call.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
#[allow(clippy::unnecessary_literal_bound)]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> PluginResult<String> {
        self.requests.lock().expect("lock poisoned").push(request);
        let next = self.replies.lock().expect("lock poisoned").pop_front();
        match next {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Error(message)) => Err(PluginError::ExecutionFailed(message)),
            None => self.fallback.clone().ok_or_else(|| {
                PluginError::ExecutionFailed("ScriptedModel: no more replies queued".into())
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambit_plugins::Message;

    fn request(text: &str) -> CompletionRequest {
        CompletionRequest {
            system: "sys".into(),
            messages: vec![Message::user(text)],
            tool_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_replays_in_order_then_fails() {
        let model = ScriptedModel::new(["one", "two"]);
        assert_eq!(model.complete(request("a")).await.unwrap(), "one");
        assert_eq!(model.complete(request("b")).await.unwrap(), "two");
        assert!(model.complete(request("c")).await.is_err());
        assert_eq!(model.call_count(), 3);
        assert_eq!(model.requests()[1].messages[0].content, "b");
    }

    #[tokio::test]
    async fn test_fallback_and_errors() {
        let model = ScriptedModel::always("fine").then_error("boom");
        assert!(matches!(
            model.complete(request("a")).await,
            Err(PluginError::ExecutionFailed(m)) if m == "boom"
        ));
        assert_eq!(model.complete(request("b")).await.unwrap(), "fine");
    }
}
