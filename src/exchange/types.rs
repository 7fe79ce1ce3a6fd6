//! Exchange types

use crate::error::{Error, Result};
use crate::path::split_path;
use crate::types::{JsonValue, Method};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

// ============================================================================
// Body
// ============================================================================

/// A request or response payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Body {
    /// Parsed JSON document
    Json { value: JsonValue },
    /// Non-JSON or unparseable payload; only its size is kept
    Opaque { len: usize },
}

impl Body {
    /// Parse raw bytes, degrading to `Opaque` rather than failing
    ///
    /// Empty payloads are treated as absent.
    pub fn from_bytes(bytes: &[u8], content_type: Option<&str>) -> Option<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        let may_be_json = content_type.map_or(true, is_json_media_type);
        if may_be_json {
            if let Ok(value) = serde_json::from_slice::<JsonValue>(bytes) {
                return Some(Body::Json { value });
            }
        }
        Some(Body::Opaque { len: bytes.len() })
    }

    /// Parse body text
    pub fn from_text(text: &str, content_type: Option<&str>) -> Option<Self> {
        Self::from_bytes(text.as_bytes(), content_type)
    }

    /// Wrap an already parsed JSON value
    pub fn json(value: JsonValue) -> Self {
        Body::Json { value }
    }

    /// Parsed JSON, if any
    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Body::Json { value } => Some(value),
            Body::Opaque { .. } => None,
        }
    }
}

/// Lower-cased media type without parameters (`application/json; charset=utf-8` → `application/json`)
pub(crate) fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub(crate) fn is_json_media_type(content_type: &str) -> bool {
    let media = media_type(content_type);
    media == "application/json" || media.ends_with("+json") || media.ends_with("/json")
}

// ============================================================================
// Captured Exchange
// ============================================================================

/// One observed request/response pair, normalized at the capture boundary
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedExchange {
    pub method: Method,
    pub url: Url,
    pub scheme: String,
    /// Host including a non-default port
    pub host: String,
    /// Normalized path segments
    pub path: Vec<String>,
    pub query: Vec<(String, String)>,
    pub request_body: Option<Body>,
    pub request_content_type: Option<String>,
    pub status: u16,
    pub response_content_type: Option<String>,
    pub response_body: Option<Body>,
    pub timestamp: DateTime<Utc>,
}

impl CapturedExchange {
    /// Create an exchange from a method and absolute URL
    ///
    /// Fails for unparseable URLs and URLs without a host.
    pub fn new(method: Method, url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(Error::invalid_exchange(format!("URL '{url}' has no host")));
            }
        };
        let path = split_path(url.path());
        let query = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Ok(Self {
            method,
            scheme: url.scheme().to_string(),
            host,
            path,
            query,
            url,
            request_body: None,
            request_content_type: None,
            status: 200,
            response_content_type: None,
            response_body: None,
            timestamp: Utc::now(),
        })
    }

    /// Set the response status
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Set the request body
    #[must_use]
    pub fn with_request_body(mut self, body: Option<Body>) -> Self {
        self.request_body = body;
        self
    }

    /// Set the request content type
    #[must_use]
    pub fn with_request_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.request_content_type = Some(media_type(&content_type.into()));
        self
    }

    /// Set the response body
    #[must_use]
    pub fn with_response_body(mut self, body: Option<Body>) -> Self {
        self.response_body = body;
        self
    }

    /// Set the response content type
    #[must_use]
    pub fn with_response_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.response_content_type = Some(media_type(&content_type.into()));
        self
    }

    /// Set the observation time
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Path as observed, normalized
    pub fn path_string(&self) -> String {
        format!("/{}", self.path.join("/"))
    }
}

// ============================================================================
// JSON Input
// ============================================================================

/// Exchange as posted by a capture client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeInput {
    pub method: String,
    pub url: String,
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub request_content_type: Option<String>,
    #[serde(default)]
    pub request_body: Option<JsonValue>,
    #[serde(default)]
    pub response_content_type: Option<String>,
    #[serde(default)]
    pub response_body: Option<JsonValue>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

fn default_status() -> u16 {
    200
}

impl ExchangeInput {
    /// Validate and convert into a captured exchange
    pub fn into_exchange(self) -> Result<CapturedExchange> {
        let method: Method = self.method.parse()?;
        let mut exchange = CapturedExchange::new(method, &self.url)?
            .with_status(self.status)
            .with_request_body(self.request_body.map(Body::json))
            .with_response_body(self.response_body.map(Body::json));
        if let Some(ct) = self.request_content_type {
            exchange = exchange.with_request_content_type(ct);
        }
        if let Some(ct) = self.response_content_type {
            exchange = exchange.with_response_content_type(ct);
        }
        if let Some(ts) = self.timestamp {
            exchange = exchange.with_timestamp(ts);
        }
        Ok(exchange)
    }
}

// ============================================================================
// Capture Filter
// ============================================================================

/// Decides which exchanges are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFilter {
    /// Only keep exchanges whose response is JSON
    pub json_only: bool,
}

impl Default for CaptureFilter {
    fn default() -> Self {
        Self { json_only: true }
    }
}

impl CaptureFilter {
    /// Whether the exchange should reach the store
    pub fn accepts(&self, exchange: &CapturedExchange) -> bool {
        if !(100..600).contains(&exchange.status) {
            return false;
        }
        if !self.json_only {
            return true;
        }
        match &exchange.response_content_type {
            Some(ct) => is_json_media_type(ct),
            // Bodyless responses (204 and friends) still document the operation
            None => !matches!(exchange.response_body, Some(Body::Opaque { .. })),
        }
    }
}
