//! Recorder module
//!
//! The synchronization boundary around the endpoint store. A `Recorder` is
//! a cloneable handle shared by capture clients, the HTTP server and the
//! CLI.
//!
//! # Overview
//!
//! - `Recorder` - serialized mutations, snapshot reads, change notification
//! - `IngestTicket` - generation token that discards exchanges racing a clear
//! - `ExchangeSource` - async producer of exchanges (HAR files, HAR logs)

mod handle;
mod source;

pub use handle::{ImportSummary, IngestTicket, RecordOutcome, Recorder, RecorderSnapshot};
pub use source::{ExchangeSource, ExchangeStream, HarFileSource, HarSource};
