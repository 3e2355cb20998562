//! An engine backed by an external explainer executable such as the `c2e`
//! command-line tool.
//!
//! Each `explain` spawns the executable, writes the declaration as one line
//! on its stdin, closes it, and reads the explanation from stdout. Parse
//! errors are reported on stderr after [`PARSE_ERROR_HEADER`], one per line.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

use super::{Engine, EngineLoader, ExplainError, Renderable};
use crate::format::{FormatterConfig, HighlightedText};

/// Line the explainer prints on stderr before its parse errors.
pub const PARSE_ERROR_HEADER: &str = "Error(s) parsing declaration:";

/// Maximum output size in bytes. Anything beyond this is truncated.
const MAX_OUTPUT_BYTES: usize = 50_000;

/// Environment variables passed through to the explainer. Everything else is stripped.
const SAFE_ENV_VARS: &[&str] = &["PATH", "HOME", "USER", "LANG", "LC_ALL", "TZ"];

#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub max_output_bytes: usize,
}

impl ProcessConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            max_output_bytes: MAX_OUTPUT_BYTES,
        }
    }
}

/// Loads a [`ProcessEngine`] by probing the executable once.
#[derive(Debug, Clone)]
pub struct ProcessLoader {
    config: ProcessConfig,
}

impl ProcessLoader {
    pub fn new(config: ProcessConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EngineLoader for ProcessLoader {
    async fn load(self: Box<Self>) -> Result<Box<dyn Engine>> {
        let program = self.config.program.display().to_string();
        debug!(program = %program, "probing explainer");

        // An explainer reading an empty stdin must exit cleanly.
        let output = tokio::process::Command::new(&self.config.program)
            .args(&self.config.args)
            .env_clear()
            .envs(filtered_env())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to start explainer `{program}`"))?;

        if !output.status.success() {
            bail!(
                "explainer `{}` exited with code {} during startup: {}",
                program,
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(Box::new(ProcessEngine {
            config: self.config,
        }))
    }
}

/// Explains declarations by running an external explainer per call.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    config: ProcessConfig,
}

impl ProcessEngine {
    fn run(&self, input: &str) -> std::io::Result<std::process::Output> {
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .env_clear()
            .envs(filtered_env())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // The explainer reads one declaration per line.
            let line = input.replace(['\r', '\n'], " ");
            if let Err(err) = writeln!(stdin, "{line}") {
                debug!(error = %err, "explainer closed its stdin early");
            }
        }
        child.wait_with_output()
    }
}

impl Engine for ProcessEngine {
    fn explain(&self, input: &str, formatter: &FormatterConfig) -> Result<Renderable, ExplainError> {
        let output = self.run(input).map_err(|e| {
            ExplainError::Unexpected(format!(
                "failed to run explainer `{}`: {e}",
                self.config.program.display()
            ))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let text = interpret_output(
            output.status.success(),
            output.status.code(),
            &stdout,
            &stderr,
        )?;
        let text = truncate_output(&text, self.config.max_output_bytes);
        Ok(formatter.render(&HighlightedText::from(text)))
    }
}

/// Turn an explainer run into its explanation text or error messages.
fn interpret_output(
    success: bool,
    code: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> Result<String, ExplainError> {
    if let Some((_, errors)) = stderr.split_once(PARSE_ERROR_HEADER) {
        let messages: Vec<String> = errors
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if messages.is_empty() {
            return Err(ExplainError::Declaration(vec![
                "the declaration could not be parsed".to_string(),
            ]));
        }
        return Err(ExplainError::Declaration(messages));
    }

    if !success {
        return Err(ExplainError::Unexpected(format!(
            "explainer exited with code {}: {}",
            code.unwrap_or(-1),
            stderr.trim()
        )));
    }

    Ok(stdout.trim_end().to_string())
}

fn truncate_output(output: &str, max_bytes: usize) -> String {
    if output.len() <= max_bytes {
        return output.to_string();
    }
    let mut end = max_bytes;
    while !output.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}\n\n[truncated: showing {}/{} bytes]",
        &output[..end],
        end,
        output.len()
    )
}

fn filtered_env() -> Vec<(String, String)> {
    SAFE_ENV_VARS
        .iter()
        .filter_map(|key| std::env::var(key).ok().map(|val| (key.to_string(), val)))
        .collect()
}
