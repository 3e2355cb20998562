//! A page hosted in a terminal: stdin lines are edits of the input field and
//! the output area is printed to stdout.

use std::io::{IsTerminal, Write};

use super::{History, InputSurface, OutputSurface, Page, Tone, UrlState};
use crate::engine::Renderable;
use crate::format::{ClassMapping, Highlight};
use crate::spinner::Spinner;

const RESET: &str = "\x1b[0m";
const RED_BOLD: &str = "\x1b[1;31m";

/// Terminal colors for the highlight classes of rendered markup.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: Vec<(String, &'static str)>,
}

impl Palette {
    /// Assign each configured class the terminal color of its category.
    pub fn for_classes(classes: &ClassMapping) -> Self {
        let colors = classes
            .classes()
            .into_iter()
            .map(|(highlight, class)| (class.to_string(), ansi_for(highlight)))
            .collect();
        Self { colors }
    }

    fn color_of(&self, class_attr: &str) -> Option<&'static str> {
        class_attr.split_whitespace().find_map(|class| {
            self.colors
                .iter()
                .find(|(name, _)| name == class)
                .map(|(_, color)| *color)
        })
    }
}

fn ansi_for(highlight: Highlight) -> &'static str {
    match highlight {
        Highlight::Qualifier => "\x1b[36m",
        Highlight::PrimitiveType => "\x1b[33m",
        Highlight::UserDefinedType => "\x1b[35m",
        Highlight::Ident => "\x1b[31m",
        Highlight::Number => "\x1b[34m",
        Highlight::QuasiKeyword => "\x1b[32m",
        Highlight::None => RESET,
    }
}

/// Render class-annotated markup as terminal text.
///
/// `<span class="...">` elements get the color of their class when `color`
/// is set; every other tag is dropped and entities are decoded.
pub fn render_markup(markup: &str, palette: &Palette, color: bool) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut open: Vec<Option<&'static str>> = Vec::new();
    let mut rest = markup;

    while let Some(start) = rest.find('<') {
        out.push_str(&html_escape::decode_html_entities(&rest[..start]));
        let Some(len) = rest[start..].find('>') else {
            // Unterminated tag: show it as text.
            out.push_str(&html_escape::decode_html_entities(&rest[start..]));
            rest = "";
            break;
        };
        let tag = rest[start + 1..start + len].trim();
        rest = &rest[start + len + 1..];

        if let Some(name) = tag.strip_prefix('/') {
            if name.trim().eq_ignore_ascii_case("span") && open.pop().flatten().is_some() && color {
                out.push_str(RESET);
                if let Some(outer) = open.iter().rev().find_map(|c| *c) {
                    out.push_str(outer);
                }
            }
        } else if is_span(tag) {
            let ansi = class_attr(tag).and_then(|class| palette.color_of(&class));
            if let (Some(ansi), true) = (ansi, color) {
                out.push_str(ansi);
            }
            open.push(ansi);
        }
    }
    out.push_str(&html_escape::decode_html_entities(rest));
    if color && open.iter().any(Option::is_some) {
        out.push_str(RESET);
    }
    out
}

fn is_span(tag: &str) -> bool {
    let name = tag.split(|c: char| c.is_whitespace() || c == '/').next().unwrap_or("");
    name.eq_ignore_ascii_case("span")
}

fn class_attr(tag: &str) -> Option<String> {
    let start = tag.find("class=\"")? + "class=\"".len();
    let len = tag[start..].find('"')?;
    Some(html_escape::decode_html_entities(&tag[start..start + len]).into_owned())
}

/// The terminal's input line. Disabled until the controller enables it.
#[derive(Debug, Default)]
pub struct TerminalInput {
    text: String,
    enabled: bool,
}

impl InputSurface for TerminalInput {
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

/// Prints to stdout. Pending content goes to stderr, as a spinner when
/// stderr is a terminal and as a plain line otherwise.
#[derive(Debug)]
pub struct TerminalOutput {
    color: bool,
    animate: bool,
    palette: Palette,
    spinner: Option<Spinner>,
    tone: Option<Tone>,
}

impl TerminalOutput {
    pub fn new(palette: Palette) -> Self {
        Self {
            color: std::io::stdout().is_terminal(),
            animate: std::io::stderr().is_terminal(),
            palette,
            spinner: None,
            tone: None,
        }
    }

    /// Turn terminal colors on or off.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Turn the pending spinner on or off.
    pub fn with_spinner(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    /// Tone of the last thing shown.
    pub fn tone(&self) -> Option<Tone> {
        self.tone
    }

    /// Clear a running loading spinner, leaving the terminal as it was.
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop();
        }
    }

    /// What `show` prints for `content` and `tone`, without the trailing newline.
    pub fn display(&self, content: &Renderable, tone: Tone) -> String {
        let body = match content {
            Renderable::Text(text) => text.clone(),
            Renderable::Markup(markup) => render_markup(markup, &self.palette, self.color),
        };
        if tone == Tone::Error && self.color {
            format!("{RED_BOLD}{body}{RESET}")
        } else {
            body
        }
    }
}

impl OutputSurface for TerminalOutput {
    fn show(&mut self, content: &Renderable, tone: Tone) {
        self.stop_spinner();
        self.tone = Some(tone);
        if tone == Tone::Pending {
            if self.animate && tokio::runtime::Handle::try_current().is_ok() {
                self.spinner = Some(Spinner::start(content.as_str()));
            } else {
                eprintln!("{}", content.as_str());
            }
            return;
        }
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", self.display(content, tone));
        let _ = stdout.flush();
    }
}

/// A page in a terminal session.
#[derive(Debug)]
pub struct TerminalPage {
    input: TerminalInput,
    output: TerminalOutput,
    history: History,
}

impl TerminalPage {
    pub fn new(history: History, output: TerminalOutput) -> Self {
        Self {
            input: TerminalInput::default(),
            output,
            history,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn input_text(&self) -> &str {
        &self.input.text
    }

    pub fn input_enabled(&self) -> bool {
        self.input.enabled
    }

    /// Tone of the last thing the output area showed.
    pub fn last_tone(&self) -> Option<Tone> {
        self.output.tone()
    }

    pub fn stop_spinner(&mut self) {
        self.output.stop_spinner();
    }
}

impl Page for TerminalPage {
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
