//! HAR 1.2 adapter
//!
//! Browser devtools export captured traffic as HAR. Only the fields needed
//! to model an exchange are deserialized; everything else is ignored.

use super::types::{Body, CapturedExchange};
use crate::error::{Error, Result};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// HAR document root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Har {
    pub log: HarLog,
}

/// HAR log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarLog {
    #[serde(default)]
    pub entries: Vec<HarEntry>,
}

/// One request/response entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarEntry {
    #[serde(default)]
    pub started_date_time: Option<String>,
    pub request: HarRequest,
    pub response: HarResponse,
}

/// HAR request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub post_data: Option<HarPostData>,
}

/// HAR request payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarPostData {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// HAR response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarResponse {
    pub status: u16,
    #[serde(default)]
    pub content: HarContent,
}

/// HAR response payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarContent {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl Har {
    /// Parse a HAR document from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::har(format!("invalid HAR document: {e}")))
    }
}

impl CapturedExchange {
    /// Convert a HAR entry
    ///
    /// The URL and method must be valid; bodies and timestamps degrade
    /// gracefully when missing or malformed.
    pub fn from_har_entry(entry: &HarEntry) -> Result<Self> {
        let method = entry.request.method.parse()?;
        let mut exchange =
            CapturedExchange::new(method, &entry.request.url)?.with_status(entry.response.status);

        if let Some(started) = entry
            .started_date_time
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        {
            exchange = exchange.with_timestamp(started.with_timezone(&Utc));
        }

        if let Some(post) = &entry.request.post_data {
            if let Some(ct) = &post.mime_type {
                exchange = exchange.with_request_content_type(ct.as_str());
            }
            let body = post
                .text
                .as_deref()
                .and_then(|text| Body::from_text(text, post.mime_type.as_deref()));
            exchange = exchange.with_request_body(body);
        }

        let content = &entry.response.content;
        if let Some(ct) = content.mime_type.as_deref().filter(|ct| !ct.is_empty()) {
            exchange = exchange.with_response_content_type(ct);
        }
        exchange = exchange.with_response_body(response_body(content));

        Ok(exchange)
    }
}

fn response_body(content: &HarContent) -> Option<Body> {
    let text = content.text.as_deref()?;
    let ct = content.mime_type.as_deref().filter(|ct| !ct.is_empty());
    if content.encoding.as_deref() == Some("base64") {
        return match base64::engine::general_purpose::STANDARD.decode(text.trim()) {
            Ok(bytes) => Body::from_bytes(&bytes, ct),
            Err(_) => Some(Body::Opaque { len: text.len() }),
        };
    }
    Body::from_text(text, ct)
}
