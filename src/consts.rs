//! Project-wide constants.

use std::time::Duration;

pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// The one query parameter mirrored from the input field.
pub const CODE_PARAM: &str = "code";

/// Shown when the URL carries no declaration.
pub const DEFAULT_DECLARATION: &str = "const char *(*foo[3])(int bar, void *baz)";

/// How long the engine may take to load before the session gives up.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Shown while the engine loads.
pub const LOADING_MESSAGE: &str = "Loading WASM module…";

/// Appended to every load error.
pub const LOAD_FAILURE_HINT: &str =
    "The explainer could not be started. Your browser may not support WebAssembly.";

/// Explainer executable used when nothing else is configured.
pub const DEFAULT_ENGINE_COMMAND: &str = "c2e";

/// Page URL a terminal session starts at when none is given.
pub const DEFAULT_PAGE_URL: &str = "http://localhost/";
