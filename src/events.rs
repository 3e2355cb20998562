//! The controller's event queue.
//!
//! Engine settlement, the load timer and input edits all arrive as [`Event`]s
//! on one unbounded [`tokio::sync::mpsc`] channel, so the controller handles
//! them one at a time in arrival order.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::engine::Engine;

/// Something the controller has to react to.
pub enum Event {
    /// The engine load settled successfully.
    EngineLoaded(Box<dyn Engine>),
    /// The engine load settled with an error.
    EngineFailed(anyhow::Error),
    /// The load timer fired after the given duration.
    LoadTimedOut(Duration),
    /// The user changed the input field; carries the full new text.
    InputChanged(String),
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::EngineLoaded(_) => f.write_str("EngineLoaded"),
            Event::EngineFailed(err) => f.debug_tuple("EngineFailed").field(err).finish(),
            Event::LoadTimedOut(after) => f.debug_tuple("LoadTimedOut").field(after).finish(),
            Event::InputChanged(text) => f.debug_tuple("InputChanged").field(text).finish(),
        }
    }
}

/// Receiving half of the queue, owned by whoever drives the controller.
pub type EventStream = mpsc::UnboundedReceiver<Event>;

/// Sending half of the queue. Cheap to clone into tasks.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventBus {
    /// Create a queue, returning the bus and the stream it feeds.
    pub fn new() -> (Self, EventStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue an event. Returns `false` if the stream has been dropped.
    pub fn emit(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }
}
