//! Endpoint store module
//!
//! Owns the observed endpoints. Exchanges are clustered by
//! `(host, method, path template)`, samples are kept in a bounded FIFO per
//! endpoint, and an operator can re-parameterise a template to merge
//! endpoints that turn out to be the same operation.
//!
//! # Overview
//!
//! - `EndpointStore` - synchronous single-owner store
//! - `Endpoint` / `Sample` - clustered operation and its retained observations
//! - `HostEndpoints` - read-only grouping view by host
//!
//! Concurrent access goes through [`crate::recorder::Recorder`].

mod manager;
mod types;

pub use manager::{EndpointStore, InsertOutcome, ParameteriseOutcome, DEFAULT_SAMPLE_CAP};
pub use types::{
    BodySample, Endpoint, EndpointKey, EndpointSummary, HostEndpoints, ResponseSamples, Sample,
};
