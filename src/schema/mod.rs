//! Schema inference module
//!
//! Infers structural JSON Schemas from observed bodies and merges them
//! across samples.
//!
//! # Features
//!
//! - **Type Inference**: Infers a tagged [`Schema`] from a JSON value
//! - **Schema Merging**: Order-independent merge of schemas from many samples
//! - **Required Relaxation**: Fields missing from any sample become optional
//! - **Array Type Inference**: Item schema covers every element
//! - **Format Detection**: date-time, date, uri, email and uuid strings

mod inference;
mod types;

pub(crate) use inference::is_uuid;
pub use inference::{merge_schemas, SchemaInferrer};
pub use types::{Field, Kind, Schema};
