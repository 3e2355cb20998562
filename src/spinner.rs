//! A minimal terminal spinner shown while the explainer engine loads.

use std::io::Write;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Braille spinner frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Frame interval.
const INTERVAL: Duration = Duration::from_millis(80);

/// A terminal spinner that runs in a background task and writes to stderr.
///
/// Must be started from inside a tokio runtime.
#[derive(Debug)]
pub struct Spinner {
    handle: JoinHandle<()>,
}

impl Spinner {
    /// Start a spinner with the given message (e.g. `"Loading WASM module…"`).
    pub fn start(message: &str) -> Self {
        let message = message.to_string();

        let handle = tokio::spawn(async move {
            let mut i = 0;
            loop {
                let frame = FRAMES[i % FRAMES.len()];
                // \r moves to start of line, \x1b[2K clears the line
                eprint!("\x1b[2K\r{frame} {message}");
                let _ = std::io::stderr().flush();
                tokio::time::sleep(INTERVAL).await;
                i += 1;
            }
        });

        Self { handle }
    }

    /// Stop the spinner and clear its line.
    ///
    /// `abort` does not wait for the task. On a current-thread runtime, which
    /// the binary uses, the task cannot run between the abort and the clear,
    /// so later output is never overdrawn. On a multi-thread runtime a last
    /// frame may still land after the clear.
    pub fn stop(self) {
        self.handle.abort();
        eprint!("\x1b[2K\r");
        let _ = std::io::stderr().flush();
    }
}
