//! Command Line Interface (CLI) layer for SARMAP.
//!
//! This module defines argument parsing (`args`), startup error types
//! (`errors`), and the bootstrap logic (`runner`): logging, Earth Engine
//! authentication, router assembly and the listener.
//!
//! To embed the map service into another application, use `sarmap::api`
//! and `sarmap::server` directly instead of this module.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
