//! OpenAPI document module
//!
//! Projects the endpoint set into an OpenAPI 3.1 document, merging body
//! schemas per endpoint, status code and content type.
//!
//! # Overview
//!
//! - `DocumentBuilder` - builds an `OpenApiDocument` from endpoints
//! - `OpenApiDocument` - serializable document (paths, operations, schemas)
//! - `sort_endpoints` - deterministic presentation order

mod builder;
mod types;

pub use builder::{sort_endpoints, DocumentBuilder};
pub use types::{
    Info, MediaType, OpenApiDocument, Operation, Parameter, ParameterLocation, PathItem,
    RequestBody, Response, Server, OPENAPI_VERSION,
};

#[cfg(test)]
mod tests;
