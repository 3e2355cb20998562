use std::time::Duration;

use tokio::time::Instant;

use c2e_live::consts::{DEFAULT_DECLARATION, LOAD_FAILURE_HINT};
use c2e_live::controller::{Controller, ControllerConfig, Phase};
use c2e_live::engine::Renderable;
use c2e_live::engine::mock::{MockEngine, MockLoader, Reply};
use c2e_live::events::{Event, EventBus, EventStream};
use c2e_live::format::{
    ClassMapping, FormatterConfig, Highlight, HighlightedText, HighlightedTextSegment,
};
use c2e_live::page::memory::MemoryPage;
use c2e_live::page::{InputSurface, Tone};

const PAGE: &str = "http://localhost/";

fn config(timeout_ms: u64) -> ControllerConfig {
    ControllerConfig {
        load_timeout: Duration::from_millis(timeout_ms),
        ..ControllerConfig::default()
    }
}

/// A controller on `url` that has started loading with `loader`.
fn start(
    url: &str,
    loader: MockLoader,
    config: ControllerConfig,
) -> (Controller<MemoryPage>, EventStream) {
    let mut controller = Controller::new(MemoryPage::at(url).unwrap(), config);
    let (bus, events) = EventBus::new();
    controller.initialize(Box::new(loader), &bus);
    (controller, events)
}

async fn ready(url: &str, engine: MockEngine) -> (Controller<MemoryPage>, EventStream) {
    let (mut controller, mut events) = start(url, MockLoader::ready(engine), config(10_000));
    assert_eq!(controller.settle(&mut events).await, Phase::Ready);
    (controller, events)
}

fn edit(controller: &mut Controller<MemoryPage>, text: &str) {
    controller.handle(Event::InputChanged(text.to_string()));
}

#[tokio::test(start_paused = true)]
async fn code_param_prefills_input_and_is_explained_on_load() {
    let engine = MockEngine::echo("declare x as int");
    let log = engine.log();
    let (controller, _events) = ready("http://localhost/?code=int%20x", engine).await;

    let page = controller.page();
    assert_eq!(page.input.text(), "int x");
    assert!(page.input.is_enabled());
    assert_eq!(page.output.text(), "declare x as int");
    assert_eq!(page.output.tone(), Tone::Normal);
    assert_eq!(log.calls(), vec!["int x"]);
}

#[tokio::test(start_paused = true)]
async fn missing_code_param_seeds_default_declaration() {
    let engine = MockEngine::echo("a big explanation");
    let log = engine.log();
    let (controller, _events) = ready(PAGE, engine).await;

    assert_eq!(controller.page().input.text(), DEFAULT_DECLARATION);
    assert_eq!(controller.page().code().as_deref(), Some(DEFAULT_DECLARATION));
    assert_eq!(log.calls(), vec![DEFAULT_DECLARATION]);
}

#[tokio::test(start_paused = true)]
async fn edits_are_explained_and_mirrored_into_the_url() {
    let engine = MockEngine::echo("unused")
        .reply(
            "const char *foo(int bar)",
            Reply::Text("declare foo as function (bar as int) returning pointer to const char".to_string()),
        );
    let (mut controller, _events) = ready(PAGE, engine).await;

    edit(&mut controller, "const char *foo(int bar)");

    let page = controller.page();
    assert_eq!(
        page.output.text(),
        "declare foo as function (bar as int) returning pointer to const char"
    );
    assert!(!page.output.is_error());
    assert_eq!(page.code().as_deref(), Some("const char *foo(int bar)"));
    assert_eq!(
        page.history.current().query(),
        Some("code=const+char+*foo%28int+bar%29")
    );
}

#[tokio::test(start_paused = true)]
async fn declaration_errors_are_shown_with_error_tone() {
    let engine = MockEngine::echo("fine").reply(
        "int )",
        Reply::Errors(vec!["expected identifier".to_string()]),
    );
    let (mut controller, _events) = ready(PAGE, engine).await;

    edit(&mut controller, "int )");

    let output = &controller.page().output;
    assert_eq!(output.text(), "expected identifier");
    assert_eq!(output.tone(), Tone::Error);
    assert_eq!(controller.page().code().as_deref(), Some("int )"));
}

#[tokio::test(start_paused = true)]
async fn multiple_errors_are_joined_one_per_line() {
    let engine = MockEngine::with_fallback(Reply::Errors(vec![
        "unexpected ')'".to_string(),
        "expected identifier".to_string(),
    ]));
    let (controller, _events) = ready("http://localhost/?code=int%20)%20)", engine).await;

    assert_eq!(
        controller.page().output.text(),
        "unexpected ')'\nexpected identifier"
    );
    assert!(controller.page().output.is_error());
}

#[tokio::test(start_paused = true)]
async fn whitespace_input_updates_url_but_keeps_output() {
    let engine = MockEngine::echo("declare x as int");
    let log = engine.log();
    let (mut controller, _events) = ready("http://localhost/?code=int%20x", engine).await;
    let renders = controller.page().output.renders();

    edit(&mut controller, "   ");

    let page = controller.page();
    assert_eq!(page.output.text(), "declare x as int");
    assert_eq!(page.output.renders(), renders);
    assert_eq!(page.code().as_deref(), Some("   "));
    assert_eq!(log.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn processing_the_same_input_twice_is_idempotent() {
    let (mut controller, _events) =
        ready("http://localhost/?code=int%20x", MockEngine::echo("declare x as int")).await;

    controller.process_input();
    let first_url = controller.page().history.current().clone();
    let first_output = controller.page().output.content().cloned();

    controller.process_input();
    assert_eq!(controller.page().history.current(), &first_url);
    assert_eq!(controller.page().output.content().cloned(), first_output);
}

#[tokio::test(start_paused = true)]
async fn url_updates_replace_the_current_entry() {
    let (mut controller, _events) = ready(PAGE, MockEngine::echo("ok")).await;
    for text in ["int a", "int b", "", "char c"] {
        edit(&mut controller, text);
    }
    assert_eq!(
        controller.page().history.current().as_str(),
        "http://localhost/?code=char+c"
    );
    assert_eq!(controller.page().code().as_deref(), Some("char c"));
}

#[tokio::test(start_paused = true)]
async fn other_query_params_survive_url_updates() {
    let (mut controller, _events) =
        ready("http://localhost/?theme=dark&code=int%20x#top", MockEngine::echo("ok")).await;
    edit(&mut controller, "long y");

    let url = controller.page().history.current();
    assert_eq!(url.query(), Some("theme=dark&code=long+y"));
    assert_eq!(url.fragment(), Some("top"));
}

#[tokio::test(start_paused = true)]
async fn load_that_wins_the_race_stays_ready_after_the_timer_fires() {
    let (mut controller, mut events) = start(
        PAGE,
        MockLoader::ready(MockEngine::echo("ok")),
        config(50),
    );
    assert_eq!(controller.settle(&mut events).await, Phase::Ready);
    let renders = controller.page().output.renders();

    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.drain(&mut events);

    assert_eq!(controller.phase(), Phase::Ready);
    assert!(controller.page().input.is_enabled());
    assert_eq!(controller.page().output.text(), "ok");
    assert_eq!(controller.page().output.renders(), renders);
}

#[tokio::test(start_paused = true)]
async fn timeout_that_wins_the_race_stays_failed_after_a_late_load() {
    let engine = MockEngine::echo("too late");
    let log = engine.log();
    let (mut controller, mut events) = start(
        "http://localhost/?code=int%20x",
        MockLoader::ready(engine).after(Duration::from_millis(200)),
        config(50),
    );
    assert_eq!(controller.settle(&mut events).await, Phase::Failed);
    let shown = controller.page().output.content().cloned();

    tokio::time::sleep(Duration::from_millis(300)).await;
    controller.drain(&mut events);

    assert_eq!(controller.phase(), Phase::Failed);
    assert!(!controller.page().input.is_enabled());
    assert_eq!(controller.page().output.content().cloned(), shown);
    assert!(log.is_empty());
}

#[tokio::test(start_paused = true)]
async fn never_settling_load_times_out() {
    let (mut controller, mut events) = start(PAGE, MockLoader::never(), config(50));
    assert_eq!(controller.settle(&mut events).await, Phase::Failed);

    let output = &controller.page().output;
    assert!(output.is_error());
    assert!(output.text().contains("timed out after 50 ms"));
    assert!(output.text().ends_with(LOAD_FAILURE_HINT));
    assert!(!controller.page().input.is_enabled());
}

/// Asserts that `start` lies `ms` milliseconds in the past on the paused clock.
fn assert_elapsed(start: Instant, ms: u64) {
    let elapsed = start.elapsed();
    assert!(
        elapsed >= Duration::from_millis(ms) && elapsed < Duration::from_millis(ms + 1),
        "expected {ms} ms to elapse, got {elapsed:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn timeout_fires_at_the_configured_delay() {
    let started = Instant::now();
    let (mut controller, mut events) = start(PAGE, MockLoader::never(), config(50));

    tokio::time::sleep(Duration::from_millis(49)).await;
    controller.drain(&mut events);
    assert_eq!(controller.phase(), Phase::Loading);
    assert_eq!(controller.page().output.tone(), Tone::Pending);

    assert_eq!(controller.settle(&mut events).await, Phase::Failed);
    assert_elapsed(started, 50);
    assert!(controller.page().output.is_error());
}

#[tokio::test(start_paused = true)]
async fn load_just_before_the_timeout_is_ready() {
    let started = Instant::now();
    let (mut controller, mut events) = start(
        "http://localhost/?code=int%20x",
        MockLoader::ready(MockEngine::echo("declare x as int")).after(Duration::from_millis(40)),
        config(50),
    );

    assert_eq!(controller.settle(&mut events).await, Phase::Ready);
    assert_elapsed(started, 40);

    tokio::time::sleep(Duration::from_millis(20)).await;
    controller.drain(&mut events);
    assert_eq!(controller.phase(), Phase::Ready);
    assert_eq!(controller.page().output.text(), "declare x as int");
}

#[tokio::test(start_paused = true)]
async fn load_just_after_the_timeout_is_failed() {
    let engine = MockEngine::echo("too late");
    let log = engine.log();
    let started = Instant::now();
    let (mut controller, mut events) = start(
        PAGE,
        MockLoader::ready(engine).after(Duration::from_millis(60)),
        config(50),
    );

    assert_eq!(controller.settle(&mut events).await, Phase::Failed);
    assert_elapsed(started, 50);

    tokio::time::sleep(Duration::from_millis(20)).await;
    controller.drain(&mut events);
    assert_eq!(controller.phase(), Phase::Failed);
    assert!(!controller.page().input.is_enabled());
    assert!(log.is_empty());
}

#[tokio::test(start_paused = true)]
async fn rejected_load_fails_with_the_reason() {
    let (mut controller, mut events) =
        start(PAGE, MockLoader::reject("module is corrupt"), config(10_000));
    assert_eq!(controller.settle(&mut events).await, Phase::Failed);

    let output = &controller.page().output;
    assert!(output.is_error());
    assert!(output.text().contains("module is corrupt"));
}

#[tokio::test(start_paused = true)]
async fn edits_after_failure_are_ignored() {
    let (mut controller, mut events) = start(PAGE, MockLoader::never(), config(50));
    controller.settle(&mut events).await;
    let before = controller.page().history.current().clone();

    edit(&mut controller, "int x");

    assert_eq!(controller.page().history.current(), &before);
    assert_eq!(controller.page().input.text(), DEFAULT_DECLARATION);
}

#[tokio::test(start_paused = true)]
async fn engine_panic_becomes_a_single_error_message() {
    let engine = MockEngine::echo("ok").reply("int boom", Reply::Panic("engine blew up".to_string()));
    let (mut controller, _events) = ready(PAGE, engine).await;

    edit(&mut controller, "int boom");

    let output = &controller.page().output;
    assert_eq!(output.text(), "engine blew up");
    assert!(output.is_error());

    edit(&mut controller, "int fine");
    assert_eq!(controller.page().output.text(), "ok");
    assert!(!controller.page().output.is_error());
}

#[tokio::test(start_paused = true)]
async fn highlight_mode_renders_markup() {
    let text = HighlightedText::from(vec![
        HighlightedTextSegment::new("declare ", Highlight::None),
        HighlightedTextSegment::new("x", Highlight::Ident),
        HighlightedTextSegment::new(" as ", Highlight::None),
        HighlightedTextSegment::new("int", Highlight::PrimitiveType),
    ]);
    let config = ControllerConfig {
        formatter: FormatterConfig::Html(ClassMapping::default()),
        ..ControllerConfig::default()
    };
    let (mut controller, mut events) = start(
        "http://localhost/?code=int%20x",
        MockLoader::ready(MockEngine::with_fallback(Reply::Highlighted(text))),
        config,
    );
    controller.settle(&mut events).await;

    assert_eq!(
        controller.page().output.content(),
        Some(&Renderable::Markup(
            r#"declare <span class="identifier">x</span> as <span class="primitive-type">int</span>"#
                .to_string()
        ))
    );
}

#[tokio::test(start_paused = true)]
async fn settle_before_initialize_returns_immediately() {
    let mut controller = Controller::new(MemoryPage::at(PAGE).unwrap(), config(50));
    let (_bus, mut events) = EventBus::new();
    assert_eq!(controller.settle(&mut events).await, Phase::Uninitialized);
}
