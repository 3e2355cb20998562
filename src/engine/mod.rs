pub mod mock;
pub mod process;

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::format::FormatterConfig;

/// A successful explanation, ready for the output surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Renderable {
    /// Inserted as plain text.
    Text(String),
    /// Pre-formatted markup. Trusted and inserted as rendered content.
    Markup(String),
}

impl Renderable {
    pub fn as_str(&self) -> &str {
        match self {
            Renderable::Text(s) | Renderable::Markup(s) => s,
        }
    }

    pub fn is_markup(&self) -> bool {
        matches!(self, Renderable::Markup(_))
    }
}

/// Why an explanation could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplainError {
    /// The engine rejected the input, one message per structural problem.
    #[error("{}", .0.join("\n"))]
    Declaration(Vec<String>),
    /// Anything else the engine produced instead of a message list.
    #[error("{0}")]
    Unexpected(String),
}

impl ExplainError {
    /// Messages to show, in order.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ExplainError::Declaration(messages) => messages.clone(),
            ExplainError::Unexpected(message) => vec![message.clone()],
        }
    }
}

/// Why the engine never became callable.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load the explainer engine: {0:#}")]
    Rejected(anyhow::Error),
    #[error("timed out after {} ms waiting for the explainer engine", .0.as_millis())]
    TimedOut(Duration),
}

/// A loaded explainer. Calls are synchronous and never suspend.
pub trait Engine: Send + Sync {
    fn explain(&self, input: &str, formatter: &FormatterConfig) -> Result<Renderable, ExplainError>;
}

/// Produces an [`Engine`] once. The controller races this against its load timeout.
#[async_trait]
pub trait EngineLoader: Send {
    async fn load(self: Box<Self>) -> Result<Box<dyn Engine>>;
}

/// Call `engine.explain`, folding a panic inside the engine into
/// [`ExplainError::Unexpected`] so the caller always gets a value to render.
pub fn explain_guarded(
    engine: &dyn Engine,
    input: &str,
    formatter: &FormatterConfig,
) -> Result<Renderable, ExplainError> {
    match catch_unwind(AssertUnwindSafe(|| engine.explain(input, formatter))) {
        Ok(result) => result,
        Err(payload) => Err(ExplainError::Unexpected(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "explainer engine panicked".to_string()
    }
}
