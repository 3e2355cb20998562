//! A live C declaration explainer.
//!
//! The [`controller::Controller`] keeps an input field, an output area and
//! the page URL in sync with an explainer [`engine::Engine`] that is loaded
//! asynchronously under a timeout. Page primitives live in [`page`]; the
//! `c2e-live` binary hosts a session in a terminal.

pub mod banner;
pub mod commands;
pub mod config;
pub mod consts;
pub mod controller;
pub mod engine;
pub mod events;
pub mod format;
pub mod page;
pub mod spinner;
