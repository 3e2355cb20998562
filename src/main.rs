use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::bail;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use c2e_live::banner::{BannerInfo, print_banner, print_session_summary};
use c2e_live::commands::{CommandRegistry, CommandResult, SessionInfo};
use c2e_live::config::Settings;
use c2e_live::consts::{CODE_PARAM, DEFAULT_PAGE_URL};
use c2e_live::controller::{Controller, Phase};
use c2e_live::engine::process::{ProcessConfig, ProcessLoader};
use c2e_live::events::{Event, EventBus};
use c2e_live::page::terminal::{Palette, TerminalOutput, TerminalPage};
use c2e_live::page::{History, Tone, UrlState};

#[derive(Parser)]
#[command(
    name = "c2e-live",
    version,
    about = "Explain C declarations in English as you type them."
)]
struct Cli {
    /// Page URL; its `code` query parameter seeds the input
    #[arg(short, long, default_value = DEFAULT_PAGE_URL)]
    url: String,

    /// Explainer executable (overrides config and C2E_ENGINE)
    #[arg(short, long)]
    engine: Option<PathBuf>,

    /// Engine load timeout in milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Render highlighted markup instead of plain text
    #[arg(long, default_value_t = false)]
    highlight: bool,

    /// Config file (default: <config dir>/c2e-live/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Explain a single declaration and exit (non-interactive)
    #[arg(short, long)]
    run: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn settings_for(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply_env();
    if let Some(engine) = &cli.engine {
        settings.engine_command = engine.display().to_string();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        settings.load_timeout_ms = timeout_ms;
    }
    if cli.highlight {
        settings.highlight = true;
    }
    Ok(settings)
}

/// Put a `--run` declaration into the page URL the controller seeds from.
///
/// A blank declaration would leave `code` empty and the controller would
/// fall back to the default declaration, so it is rejected here.
fn seed_declaration(history: &mut History, declaration: &str) -> anyhow::Result<()> {
    if declaration.trim().is_empty() {
        bail!("--run needs a non-empty declaration");
    }
    history.replace_query(CODE_PARAM, declaration);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = settings_for(&cli)?;

    let mut history = History::parse(&cli.url)?;
    if let Some(declaration) = &cli.run {
        seed_declaration(&mut history, declaration)?;
    }
    let interactive = cli.run.is_none();

    if interactive {
        print_banner(&BannerInfo {
            engine: &settings.engine_command,
            timeout_ms: settings.load_timeout_ms,
            output: if settings.highlight { "highlighted" } else { "plain" },
            url: &cli.url,
        });
    }

    let output = TerminalOutput::new(Palette::for_classes(&settings.classes));
    let page = TerminalPage::new(history, output);
    let mut controller = Controller::new(page, settings.controller_config());

    let (bus, mut events) = EventBus::new();
    let loader = ProcessLoader::new(ProcessConfig::new(&settings.engine_command));
    controller.initialize(Box::new(loader), &bus);

    if interactive {
        println!("input: {}", controller.page().input_text());
    }

    // Ctrl+C while loading abandons the session
    let settled = tokio::select! {
        phase = controller.settle(&mut events) => Some(phase),
        _ = tokio::signal::ctrl_c() => None,
    };
    controller.page_mut().stop_spinner();
    let Some(phase) = settled else {
        println!();
        return Ok(ExitCode::from(130));
    };

    if !interactive {
        let ok = phase == Phase::Ready && controller.page().last_tone() == Some(Tone::Normal);
        return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    if phase == Phase::Failed {
        print_session_summary(controller.page().history().current().as_str());
        return Ok(ExitCode::FAILURE);
    }

    let registry = CommandRegistry::new();
    let engine_label = settings.engine_command.clone();

    // Async stdin so Ctrl+C is caught at the prompt too
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\nc2e> ");
        io::stdout().flush()?;

        tokio::select! {
            result = lines.next_line() => {
                let line = match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        // Ctrl+D (EOF)
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {e}");
                        break;
                    }
                };

                let page = controller.page();
                let deep_link = page.history().current().to_string();
                let info = SessionInfo {
                    phase: controller.phase(),
                    input: page.input_text(),
                    deep_link: &deep_link,
                    engine: &engine_label,
                };
                match registry.dispatch(&line, &info) {
                    CommandResult::Quit => break,
                    CommandResult::Handled => {}
                    CommandResult::NotACommand => controller.handle(Event::InputChanged(line)),
                }
            }
            Some(event) = events.recv() => controller.handle(event),
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    print_session_summary(controller.page().history().current().as_str());
    Ok(ExitCode::SUCCESS)
}
