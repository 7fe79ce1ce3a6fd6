// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # oas-recorder
//!
//! Synthesizes OpenAPI 3.1 documents from observed HTTP traffic.
//!
//! ## Features
//!
//! - **Endpoint Clustering**: Exchanges grouped by host, method and path template
//! - **Schema Inference**: JSON Schemas merged across every retained sample
//! - **Operator Parameterisation**: Turn `/users/42` into `/users/{id}` and fold siblings
//! - **HAR Import**: Record devtools network exports
//! - **HTTP Mode**: Drive a long-lived recorder over REST
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use oas_recorder::{Recorder, RecorderConfig, Method};
//! use oas_recorder::exchange::{Body, CapturedExchange};
//!
//! #[tokio::main]
//! async fn main() -> oas_recorder::Result<()> {
//!     let recorder = Recorder::started(&RecorderConfig::default()).await;
//!
//!     let exchange = CapturedExchange::new(Method::GET, "https://api.example.com/users/1")?
//!         .with_response_content_type("application/json")
//!         .with_response_body(Some(Body::json(serde_json::json!({"id": 1}))));
//!     recorder.record(exchange).await;
//!
//!     recorder.parameterise(0, "/users/{id}", "api.example.com").await?;
//!     println!("{}", recorder.document().await.to_json_pretty());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Recorder handle                        │
//! │  start/stop/clear   record(exchange)   parameterise   hosts  │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────┬──────────────────┼─────────────┬─────────────────┐
//! │ Exchange  │   Store          │   Path      │   Document      │
//! ├───────────┼──────────────────┼─────────────┼─────────────────┤
//! │ HAR       │ Clustering       │ Templates   │ OpenAPI 3.1     │
//! │ JSON form │ FIFO samples     │ Matching    │ Schema merge    │
//! │ Filter    │ Host filter      │ Heuristics  │ Parameters      │
//! └───────────┴──────────────────┴─────────────┴─────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the recorder
pub mod error;

/// Common types and type aliases
pub mod types;

/// Schema inference and merging
pub mod schema;

/// Path templates and matching
pub mod path;

/// Captured exchanges and HAR adapters
pub mod exchange;

/// Endpoint clustering and sample retention
pub mod store;

/// OpenAPI document construction
pub mod document;

/// Concurrent recorder handle
pub mod recorder;

/// Configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{load_config, load_config_from_str, RecorderConfig};
pub use document::{DocumentBuilder, OpenApiDocument};
pub use recorder::Recorder;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
