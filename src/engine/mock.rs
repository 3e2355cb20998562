use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Engine, EngineLoader, ExplainError, Renderable};
use crate::format::{FormatterConfig, HighlightedText};

/// What a [`MockEngine`] answers for an input.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Plain text, regardless of the formatter.
    Text(String),
    /// Highlighted text, flattened with the formatter passed to `explain`.
    Highlighted(HighlightedText),
    /// A declaration error with these messages.
    Errors(Vec<String>),
    /// Panic inside `explain`.
    Panic(String),
}

/// Inputs a [`MockEngine`] has been asked to explain, shared with the test.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, input: &str) {
        self.0.lock().unwrap().push(input.to_string());
    }
}

/// A scripted engine for tests. Answers per exact input, with a fallback.
#[derive(Debug, Clone)]
pub struct MockEngine {
    replies: HashMap<String, Reply>,
    fallback: Reply,
    log: CallLog,
}

impl MockEngine {
    /// Answer every input with `text`.
    pub fn echo(text: impl Into<String>) -> Self {
        Self::with_fallback(Reply::Text(text.into()))
    }

    pub fn with_fallback(fallback: Reply) -> Self {
        Self {
            replies: HashMap::new(),
            fallback,
            log: CallLog::default(),
        }
    }

    /// Answer `input` with `reply`.
    pub fn reply(mut self, input: impl Into<String>, reply: Reply) -> Self {
        self.replies.insert(input.into(), reply);
        self
    }

    /// Handle on the inputs this engine (and its clones) receive.
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl Engine for MockEngine {
    fn explain(&self, input: &str, formatter: &FormatterConfig) -> Result<Renderable, ExplainError> {
        self.log.record(input);
        match self.replies.get(input).unwrap_or(&self.fallback) {
            Reply::Text(text) => Ok(Renderable::Text(text.clone())),
            Reply::Highlighted(text) => Ok(formatter.render(text)),
            Reply::Errors(messages) => Err(ExplainError::Declaration(messages.clone())),
            Reply::Panic(message) => panic!("{message}"),
        }
    }
}

enum Plan {
    Ready(MockEngine),
    Reject(String),
    Never,
}

/// A scripted loader: resolves, rejects or never settles, optionally after a delay.
pub struct MockLoader {
    plan: Plan,
    delay: Duration,
}

impl MockLoader {
    pub fn ready(engine: MockEngine) -> Self {
        Self {
            plan: Plan::Ready(engine),
            delay: Duration::ZERO,
        }
    }

    pub fn reject(message: impl Into<String>) -> Self {
        Self {
            plan: Plan::Reject(message.into()),
            delay: Duration::ZERO,
        }
    }

    pub fn never() -> Self {
        Self {
            plan: Plan::Never,
            delay: Duration::ZERO,
        }
    }

    /// Settle only after `delay`.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl EngineLoader for MockLoader {
    async fn load(self: Box<Self>) -> Result<Box<dyn Engine>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.plan {
            Plan::Ready(engine) => Ok(Box::new(engine)),
            Plan::Reject(message) => Err(anyhow!(message)),
            Plan::Never => futures::future::pending().await,
        }
    }
}
