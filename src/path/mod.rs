//! Path template module
//!
//! Decides whether a concrete URL path belongs to an endpoint and renders
//! parameterised templates such as `/users/{id}`.
//!
//! # Overview
//!
//! - `PathTemplate` - ordered literal and parameter segments
//! - `split_path` - normalizes a raw path into comparable segments
//! - `ParameterPolicy` - whether new endpoints may start with parameters

mod template;

pub use template::{split_path, ParameterPolicy, PathSegment, PathTemplate};
