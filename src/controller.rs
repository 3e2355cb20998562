//! Keeps the input field, the output area and the page URL in sync with the
//! explainer engine.
//!
//! The engine load races a timer: both run as independent tasks and post
//! their settlement to the [`EventBus`]. Whichever is handled first decides
//! between [`Phase::Ready`] and [`Phase::Failed`]; the other is ignored
//! because both transitions are only taken out of [`Phase::Loading`].

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::consts::{
    CODE_PARAM, DEFAULT_DECLARATION, DEFAULT_LOAD_TIMEOUT, LOADING_MESSAGE, LOAD_FAILURE_HINT,
};
use crate::engine::{Engine, EngineLoader, LoadError, Renderable, explain_guarded};
use crate::events::{Event, EventBus, EventStream};
use crate::format::FormatterConfig;
use crate::page::{Page, Tone};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Input disabled, loading message shown, nothing started.
    Uninitialized,
    /// The engine load is racing the timeout.
    Loading,
    /// Engine available, input enabled. Never left.
    Ready,
    /// The engine did not load. Never left.
    Failed,
}

impl Phase {
    pub fn is_settled(self) -> bool {
        matches!(self, Phase::Ready | Phase::Failed)
    }
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub load_timeout: Duration,
    /// Seeds the input when the URL has no `code`.
    pub default_declaration: String,
    pub formatter: FormatterConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            default_declaration: DEFAULT_DECLARATION.to_string(),
            formatter: FormatterConfig::Plain,
        }
    }
}

/// Drives one page session.
pub struct Controller<P: Page> {
    page: P,
    config: ControllerConfig,
    phase: Phase,
    engine: Option<Box<dyn Engine>>,
}

impl<P: Page> Controller<P> {
    /// Take over `page`: its input is disabled and its output shows the loading message.
    pub fn new(mut page: P, config: ControllerConfig) -> Self {
        page.input().set_enabled(false);
        page.output()
            .show(&Renderable::Text(LOADING_MESSAGE.to_string()), Tone::Pending);
        Self {
            page,
            config,
            phase: Phase::Uninitialized,
            engine: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn into_page(self) -> P {
        self.page
    }

    /// Seed the input from the URL and start racing `loader` against the load timeout.
    ///
    /// Both settle through `bus`; feed the matching stream back into
    /// [`Controller::handle`] (or [`Controller::settle`]) to complete the
    /// transition. Must be called inside a tokio runtime. Calling it more
    /// than once has no effect.
    pub fn initialize(&mut self, loader: Box<dyn EngineLoader>, bus: &EventBus) {
        if self.phase != Phase::Uninitialized {
            warn!(phase = ?self.phase, "controller already initialized");
            return;
        }

        let seed = self
            .page
            .location()
            .query(CODE_PARAM)
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| self.config.default_declaration.clone());
        debug!(seed = %seed, "seeding input");
        self.page.input().set_text(&seed);
        self.page
            .output()
            .show(&Renderable::Text(LOADING_MESSAGE.to_string()), Tone::Pending);
        self.phase = Phase::Loading;

        let load_bus = bus.clone();
        tokio::spawn(async move {
            let event = match loader.load().await {
                Ok(engine) => Event::EngineLoaded(engine),
                Err(err) => Event::EngineFailed(err),
            };
            load_bus.emit(event);
        });

        let timeout = self.config.load_timeout;
        let timer_bus = bus.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            timer_bus.emit(Event::LoadTimedOut(timeout));
        });

        info!(timeout_ms = timeout.as_millis() as u64, "loading explainer engine");
    }

    /// React to one event.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::EngineLoaded(engine) => self.on_loaded(engine),
            Event::EngineFailed(err) => self.on_load_failed(LoadError::Rejected(err)),
            Event::LoadTimedOut(after) => self.on_load_failed(LoadError::TimedOut(after)),
            Event::InputChanged(text) => self.on_input(text),
        }
    }

    /// Handle events until the load race is decided or `events` closes.
    pub async fn settle(&mut self, events: &mut EventStream) -> Phase {
        while self.phase == Phase::Loading {
            match events.recv().await {
                Some(event) => self.handle(event),
                None => break,
            }
        }
        self.phase
    }

    /// Handle every event already queued on `events` without waiting.
    pub fn drain(&mut self, events: &mut EventStream) {
        while let Ok(event) = events.try_recv() {
            self.handle(event);
        }
    }

    /// Mirror the input into the URL and re-render the explanation.
    ///
    /// Does nothing until the engine is loaded. Whitespace-only input updates
    /// the URL but leaves the previous output in place.
    pub fn process_input(&mut self) {
        let Some(engine) = self.engine.as_deref() else {
            debug!(phase = ?self.phase, "no engine; input not processed");
            return;
        };

        let text = self.page.input().text();
        self.page.location().replace_query(CODE_PARAM, &text);

        if text.trim().is_empty() {
            debug!("empty input; keeping previous output");
            return;
        }

        match explain_guarded(engine, &text, &self.config.formatter) {
            Ok(rendered) => self.page.output().show(&rendered, Tone::Normal),
            Err(err) => {
                debug!(error = %err, "explain failed");
                let message = err.messages().join("\n");
                self.page
                    .output()
                    .show(&Renderable::Text(message), Tone::Error);
            }
        }
    }

    fn on_loaded(&mut self, engine: Box<dyn Engine>) {
        if self.phase != Phase::Loading {
            warn!(phase = ?self.phase, "ignoring engine load that settled too late");
            return;
        }
        info!("explainer engine ready");
        self.engine = Some(engine);
        self.phase = Phase::Ready;
        self.page.input().set_enabled(true);
        self.process_input();
    }

    fn on_load_failed(&mut self, err: LoadError) {
        if self.phase != Phase::Loading {
            debug!(phase = ?self.phase, error = %err, "ignoring load failure after settlement");
            return;
        }
        error!(error = %err, "explainer engine failed to load");
        self.phase = Phase::Failed;
        let message = format!("{err}\n{LOAD_FAILURE_HINT}");
        self.page
            .output()
            .show(&Renderable::Text(message), Tone::Error);
    }

    fn on_input(&mut self, text: String) {
        if self.phase != Phase::Ready || !self.page.input().is_enabled() {
            debug!(phase = ?self.phase, "input is disabled; edit dropped");
            return;
        }
        self.page.input().set_text(&text);
        self.process_input();
    }
}
