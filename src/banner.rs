//! Startup banner and session summary display.

use crate::consts::REPO;

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub engine: &'a str,
    pub timeout_ms: u64,
    pub output: &'a str,
    pub url: &'a str,
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   c2e-live {}
   say what a C declaration means, as you type it

   repo      {}
   engine    {}
   timeout   {} ms
   output    {}
   page      {}

   type a declaration, /help for commands
"#,
        env!("CARGO_PKG_VERSION"),
        REPO,
        info.engine,
        info.timeout_ms,
        info.output,
        info.url,
    );
}

/// Print the link that restores this session, then say goodbye.
pub fn print_session_summary(deep_link: &str) {
    println!("share: {deep_link}");
    println!("goodbye.");
}
