//! Endpoint store types

use crate::exchange::{Body, CapturedExchange};
use crate::path::PathTemplate;
use crate::types::Method;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Clustering identity of an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    pub host: String,
    pub method: Method,
    pub template: PathTemplate,
}

/// Facts retained from one exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Store-wide insertion number
    pub seq: u64,
    pub scheme: String,
    pub path: Vec<String>,
    pub query: Vec<(String, String)>,
    pub request_content_type: Option<String>,
    pub request_body: Option<Body>,
    pub status: u16,
    pub response_content_type: Option<String>,
    pub response_body: Option<Body>,
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    /// Keep what the document needs from an exchange
    pub fn from_exchange(seq: u64, exchange: CapturedExchange) -> Self {
        Self {
            seq,
            scheme: exchange.scheme,
            path: exchange.path,
            query: exchange.query,
            request_content_type: exchange.request_content_type,
            request_body: exchange.request_body,
            status: exchange.status,
            response_content_type: exchange.response_content_type,
            response_body: exchange.response_body,
            timestamp: exchange.timestamp,
        }
    }
}

/// A body together with the content type it was sent with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySample<'a> {
    pub content_type: Option<&'a str>,
    pub body: &'a Body,
}

/// Retained responses for one status code
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseSamples<'a> {
    /// Responses seen with this status, with or without a body
    pub count: usize,
    /// Distinct content types in first-seen order
    pub content_types: Vec<&'a str>,
    pub bodies: Vec<BodySample<'a>>,
}

/// A clustered logical API operation
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub host: String,
    pub method: Method,
    pub template: PathTemplate,
    pub(crate) samples: VecDeque<Sample>,
    pub(crate) first_seen: u64,
}

impl Endpoint {
    pub(crate) fn new(host: String, method: Method, template: PathTemplate, first: Sample) -> Self {
        let first_seen = first.seq;
        let mut samples = VecDeque::new();
        samples.push_back(first);
        Self {
            host,
            method,
            template,
            samples,
            first_seen,
        }
    }

    /// Clustering identity
    pub fn key(&self) -> EndpointKey {
        EndpointKey {
            host: self.host.clone(),
            method: self.method,
            template: self.template.clone(),
        }
    }

    /// Retained samples, oldest first
    pub fn samples(&self) -> impl ExactSizeIterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Number of retained samples
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Insertion number of the first exchange that created this endpoint
    pub fn first_seen(&self) -> u64 {
        self.first_seen
    }

    /// Most recent observation time
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.samples.iter().map(|s| s.timestamp).max()
    }

    /// Request bodies from retained samples
    pub fn request_body_samples(&self) -> impl Iterator<Item = BodySample<'_>> {
        self.samples.iter().filter_map(|s| {
            s.request_body.as_ref().map(|body| BodySample {
                content_type: s.request_content_type.as_deref(),
                body,
            })
        })
    }

    /// Retained responses grouped by status code
    pub fn responses_by_status(&self) -> BTreeMap<u16, ResponseSamples<'_>> {
        let mut by_status: BTreeMap<u16, ResponseSamples<'_>> = BTreeMap::new();
        for sample in &self.samples {
            let entry = by_status.entry(sample.status).or_default();
            entry.count += 1;
            let content_type = sample.response_content_type.as_deref();
            if let Some(ct) = content_type {
                if !entry.content_types.contains(&ct) {
                    entry.content_types.push(ct);
                }
            }
            if let Some(body) = &sample.response_body {
                entry.bodies.push(BodySample { content_type, body });
            }
        }
        by_status
    }

    /// Every retained sample matches the template
    pub fn is_consistent(&self) -> bool {
        !self.samples.is_empty() && self.samples.iter().all(|s| self.template.matches(&s.path))
    }

    pub(crate) fn push_sample(&mut self, sample: Sample, cap: usize) {
        self.samples.push_back(sample);
        while self.samples.len() > cap {
            self.samples.pop_front();
        }
    }

    /// Summary for listings
    pub fn summary(&self) -> EndpointSummary {
        let mut statuses: Vec<u16> = self.samples.iter().map(|s| s.status).collect();
        statuses.sort_unstable();
        statuses.dedup();
        EndpointSummary {
            host: self.host.clone(),
            method: self.method,
            path: self.template.to_string(),
            samples: self.samples.len(),
            statuses,
            parameterised: self.template.has_params(),
            last_seen: self.last_seen(),
        }
    }
}

/// Serializable endpoint overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSummary {
    pub host: String,
    pub method: Method,
    pub path: String,
    pub samples: usize,
    pub statuses: Vec<u16>,
    pub parameterised: bool,
    pub last_seen: Option<DateTime<Utc>>,
}

/// Endpoints of one host, in first-observed order
#[derive(Debug, Clone, PartialEq)]
pub struct HostEndpoints {
    pub host: String,
    pub endpoints: Vec<Endpoint>,
}
