//! `deploykit_log`:
//! operator-facing output for deploy runs.
//!
//! - `console`    : color-coded `[deploy-copy]` lines ([`ConsoleReporter`])
//! - `styles`     : owo-colors stylesheet
//! - `subscriber` : `tracing` subscriber setup for binaries

pub mod console;
pub mod styles;
pub mod subscriber;

pub use console::ConsoleReporter;
pub use styles::Styles;
pub use subscriber::init_tracing;
