//! Exchange module
//!
//! The boundary with traffic capture. Raw request/response events are
//! validated and normalized into `CapturedExchange` values here, before they
//! reach the endpoint store.
//!
//! # Overview
//!
//! - `CapturedExchange` - one observed request/response pair
//! - `Body` - JSON or opaque payload; unparseable bodies degrade to opaque
//! - `har` - HAR 1.2 log and entry adapters (devtools network export)
//! - `CaptureFilter` - decides which exchanges are worth recording

mod har;
mod types;

pub use har::{Har, HarContent, HarEntry, HarLog, HarPostData, HarRequest, HarResponse};
pub use types::{Body, CaptureFilter, CapturedExchange, ExchangeInput};
