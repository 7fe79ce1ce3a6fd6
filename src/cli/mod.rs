//! CLI module
//!
//! Command-line interface for building documents from HAR captures and
//! for running the recorder as an HTTP service.
//!
//! # Commands
//!
//! - `build` - Record a HAR file and write the OpenAPI document
//! - `endpoints` - List the endpoints a HAR file clusters into
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve};
