use anyhow::Result;

use super::{History, InputSurface, OutputSurface, Page, Tone, UrlState};
use crate::engine::Renderable;

/// An input field held in memory. Starts disabled, like a page whose
/// scripts have not run yet.
#[derive(Debug, Clone, Default)]
pub struct MemoryInput {
    text: String,
    enabled: bool,
}

impl InputSurface for MemoryInput {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// An output area held in memory. Counts how often it was redrawn.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    content: Option<Renderable>,
    tone: Tone,
    renders: usize,
}

impl MemoryOutput {
    pub fn content(&self) -> Option<&Renderable> {
        self.content.as_ref()
    }

    /// The shown text, or `""` if nothing has been shown.
    pub fn text(&self) -> &str {
        self.content.as_ref().map(Renderable::as_str).unwrap_or("")
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn is_error(&self) -> bool {
        self.tone == Tone::Error
    }

    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl OutputSurface for MemoryOutput {
    fn show(&mut self, content: &Renderable, tone: Tone) {
        self.content = Some(content.clone());
        self.tone = tone;
        self.renders += 1;
    }
}

/// A page kept entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    pub input: MemoryInput,
    pub output: MemoryOutput,
    pub history: History,
}

impl MemoryPage {
    pub fn new(history: History) -> Self {
        Self {
            input: MemoryInput::default(),
            output: MemoryOutput::default(),
            history,
        }
    }

    /// A page opened at `url`.
    pub fn at(url: &str) -> Result<Self> {
        Ok(Self::new(History::parse(url)?))
    }

    /// The current `code` query value.
    pub fn code(&self) -> Option<String> {
        self.history.query(crate::consts::CODE_PARAM)
    }
}

impl Page for MemoryPage {
    fn input(&mut self) -> &mut dyn InputSurface {
        &mut self.input
    }

    fn output(&mut self) -> &mut dyn OutputSurface {
        &mut self.output
    }

    fn location(&mut self) -> &mut dyn UrlState {
        &mut self.history
    }
}
