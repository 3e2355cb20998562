//! Highlighted explanation text and the formatters that flatten it.
//!
//! Engines that know which parts of an explanation are qualifiers, types,
//! identifiers and so on build a [`HighlightedText`] and hand it to
//! [`FormatterConfig::render`]; the configuration picks plain text or
//! class-annotated markup.

pub mod html;

use std::ops::{Deref, DerefMut};

pub use html::{ClassMapping, HtmlFormatter};

use crate::engine::Renderable;

/// Semantic highlight categories of an explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    None,
    /// Type or storage class qualifier.
    Qualifier,
    PrimitiveType,
    /// Struct, union, enum or typedef name.
    UserDefinedType,
    Ident,
    Number,
    /// Words like "function" or "pointer" that read as keywords in the explanation.
    QuasiKeyword,
}

/// A run of text sharing one highlight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedTextSegment {
    pub text: String,
    pub highlight: Highlight,
}

impl HighlightedTextSegment {
    pub fn new(text: impl Into<String>, highlight: Highlight) -> Self {
        Self {
            text: text.into(),
            highlight,
        }
    }
}

/// An explanation made of highlighted segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightedText(pub Vec<HighlightedTextSegment>);

impl Deref for HighlightedText {
    type Target = Vec<HighlightedTextSegment>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for HighlightedText {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<HighlightedTextSegment>> for HighlightedText {
    fn from(segments: Vec<HighlightedTextSegment>) -> Self {
        Self(segments)
    }
}

impl From<String> for HighlightedText {
    fn from(text: String) -> Self {
        Self(vec![HighlightedTextSegment::new(text, Highlight::None)])
    }
}

impl HighlightedText {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append unhighlighted text, extending the last segment when it is unhighlighted too.
    pub fn push_str(&mut self, text: &str) {
        match self.0.last_mut() {
            Some(last) if last.highlight == Highlight::None => last.text.push_str(text),
            _ => self.push(HighlightedTextSegment::new(text, Highlight::None)),
        }
    }

    /// Concatenated text without any highlighting.
    pub fn plain(&self) -> String {
        PlainFormatter.format(self)
    }
}

/// Flattens [`HighlightedText`] into a string.
pub trait Formatter {
    fn format(&self, text: &HighlightedText) -> String;
}

/// Drops all highlighting.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn format(&self, text: &HighlightedText) -> String {
        text.iter().map(|segment| segment.text.as_str()).collect()
    }
}

/// The formatter the controller passes along with every `explain` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormatterConfig {
    /// Plain text output.
    #[default]
    Plain,
    /// Markup output with one class per highlight category.
    Html(ClassMapping),
}

impl FormatterConfig {
    pub fn is_markup(&self) -> bool {
        matches!(self, FormatterConfig::Html(_))
    }

    /// Flatten `text` the way this configuration asks for.
    pub fn render(&self, text: &HighlightedText) -> Renderable {
        match self {
            FormatterConfig::Plain => Renderable::Text(PlainFormatter.format(text)),
            FormatterConfig::Html(classes) => {
                Renderable::Markup(HtmlFormatter::new(classes.clone()).format(text))
            }
        }
    }
}
