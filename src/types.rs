//! Common types used throughout oas-recorder
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    CONNECT,
    HEAD,
    OPTIONS,
    TRACE,
}

impl Method {
    /// Presentation rank: GET, POST, PUT, PATCH, DELETE, then the rest alphabetically
    pub fn precedence(self) -> u8 {
        match self {
            Method::GET => 0,
            Method::POST => 1,
            Method::PUT => 2,
            Method::PATCH => 3,
            Method::DELETE => 4,
            Method::CONNECT => 5,
            Method::HEAD => 6,
            Method::OPTIONS => 7,
            Method::TRACE => 8,
        }
    }

    /// Upper-case wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
            Method::CONNECT => "CONNECT",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
        }
    }

    /// Lower-case name used as the OpenAPI path item key
    pub fn as_lower(self) -> &'static str {
        match self {
            Method::GET => "get",
            Method::POST => "post",
            Method::PUT => "put",
            Method::PATCH => "patch",
            Method::DELETE => "delete",
            Method::CONNECT => "connect",
            Method::HEAD => "head",
            Method::OPTIONS => "options",
            Method::TRACE => "trace",
        }
    }

    /// Whether OpenAPI 3.1 has a path item field for this method
    pub fn is_documentable(self) -> bool {
        !matches!(self, Method::CONNECT)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            "CONNECT" => Ok(Method::CONNECT),
            "HEAD" => Ok(Method::HEAD),
            "OPTIONS" => Ok(Method::OPTIONS),
            "TRACE" => Ok(Method::TRACE),
            other => Err(crate::Error::invalid_exchange(format!(
                "unsupported HTTP method '{other}'"
            ))),
        }
    }
}

// ============================================================================
// Recording Status
// ============================================================================

/// Lifecycle of a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingStatus {
    /// Nothing recorded yet, or just cleared
    #[default]
    Idle,
    /// Exchanges are being ingested
    Recording,
    /// Ingestion paused, recorded data kept
    Stopped,
}

impl RecordingStatus {
    /// Whether exchanges should be ingested
    pub fn accepts_exchanges(self) -> bool {
        self == RecordingStatus::Recording
    }
}
