//! The page primitives the controller drives: an input surface, an output
//! surface and the page URL.
//!
//! [`memory::MemoryPage`] keeps everything in memory for tests;
//! [`terminal::TerminalPage`] hosts a session in a terminal.

pub mod history;
pub mod memory;
pub mod terminal;

use crate::engine::Renderable;

pub use history::History;

/// How the output surface should style what it shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Normal,
    /// A loading indicator.
    Pending,
    Error,
}

/// Where the user types declarations.
pub trait InputSurface {
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
}

/// Where explanations, errors and the loading indicator are shown.
pub trait OutputSurface {
    /// Replace whatever is shown with `content`.
    fn show(&mut self, content: &Renderable, tone: Tone);
}

/// The page URL's query string, used as a key-value store.
pub trait UrlState {
    fn query(&self, key: &str) -> Option<String>;
    /// Set `key` without navigating or adding a history entry.
    fn replace_query(&mut self, key: &str, value: &str);
}

pub trait Page {
    fn input(&mut self) -> &mut dyn InputSurface;
    fn output(&mut self) -> &mut dyn OutputSurface;
    fn location(&mut self) -> &mut dyn UrlState;
}
