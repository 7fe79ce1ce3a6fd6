//! Endpoint store implementation

use super::types::{Endpoint, HostEndpoints, Sample};
use crate::error::{Error, Result};
use crate::exchange::CapturedExchange;
use crate::path::{ParameterPolicy, PathTemplate};
use crate::types::Method;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Samples retained per endpoint unless configured otherwise
pub const DEFAULT_SAMPLE_CAP: usize = 100;

/// What `insert` did with an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new endpoint was created
    Created,
    /// The exchange was appended to an existing endpoint
    Appended,
}

/// Result of a successful parameterisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameteriseOutcome {
    pub host: String,
    pub method: Method,
    pub path: String,
    /// Other endpoints folded into this one
    pub merged: usize,
    /// Samples retained after the merge
    pub samples: usize,
}

/// Synchronous store of observed endpoints
#[derive(Debug, Clone)]
pub struct EndpointStore {
    /// Endpoints in first-observed order
    endpoints: Vec<Endpoint>,
    /// Every observed host in first-observed order
    hosts: Vec<String>,
    disabled_hosts: BTreeSet<String>,
    next_seq: u64,
    sample_cap: usize,
    policy: ParameterPolicy,
}

impl Default for EndpointStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EndpointStore {
    /// Create an empty store with default settings
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_SAMPLE_CAP, ParameterPolicy::Manual)
    }

    /// Create an empty store with a sample cap and parameter policy
    pub fn with_settings(sample_cap: usize, policy: ParameterPolicy) -> Self {
        Self {
            endpoints: Vec::new(),
            hosts: Vec::new(),
            disabled_hosts: BTreeSet::new(),
            next_seq: 0,
            sample_cap: sample_cap.max(1),
            policy,
        }
    }

    /// Samples retained per endpoint
    pub fn sample_cap(&self) -> usize {
        self.sample_cap
    }

    /// Record an exchange
    ///
    /// Never fails. The most specific matching endpoint (most literal
    /// segments, then earliest observed) receives the sample; without a
    /// match a new endpoint is created. Disabled hosts are still recorded.
    pub fn insert(&mut self, exchange: CapturedExchange) -> InsertOutcome {
        let seq = self.next_seq;
        self.next_seq += 1;

        if !self.hosts.contains(&exchange.host) {
            self.hosts.push(exchange.host.clone());
        }

        if let Some(index) = self.find_match(&exchange.host, exchange.method, &exchange.path) {
            let cap = self.sample_cap;
            let endpoint = &mut self.endpoints[index];
            endpoint.push_sample(Sample::from_exchange(seq, exchange), cap);
            debug_assert!(endpoint.is_consistent());
            debug!(
                host = %endpoint.host,
                method = %endpoint.method,
                path = %endpoint.template,
                samples = endpoint.sample_count(),
                "sample appended"
            );
            return InsertOutcome::Appended;
        }

        let template = PathTemplate::for_new_endpoint(&exchange.path, self.policy);
        let host = exchange.host.clone();
        let method = exchange.method;
        debug!(%host, %method, path = %template, "new endpoint");
        self.endpoints.push(Endpoint::new(
            host,
            method,
            template,
            Sample::from_exchange(seq, exchange),
        ));
        InsertOutcome::Created
    }

    fn find_match(&self, host: &str, method: Method, path: &[String]) -> Option<usize> {
        self.endpoints
            .iter()
            .enumerate()
            .filter(|(_, e)| e.host == host && e.method == method && e.template.matches(path))
            .max_by(|(ia, a), (ib, b)| {
                a.template
                    .literal_count()
                    .cmp(&b.template.literal_count())
                    .then(ib.cmp(ia))
            })
            .map(|(i, _)| i)
    }

    /// Replace the template of a host's `index`-th endpoint
    ///
    /// Every other endpoint of the same host and method whose samples all
    /// match the new template is merged in. Validation failures leave the
    /// store unchanged.
    pub fn parameterise(
        &mut self,
        index: usize,
        template: &str,
        host: &str,
    ) -> Result<ParameteriseOutcome> {
        let result = self.try_parameterise(index, template, host);
        if let Err(e) = &result {
            warn!(%host, index, template, error = %e, "parameterise rejected");
        }
        result
    }

    fn try_parameterise(
        &mut self,
        index: usize,
        template: &str,
        host: &str,
    ) -> Result<ParameteriseOutcome> {
        let position = self
            .endpoints
            .iter()
            .enumerate()
            .filter(|(_, e)| e.host == host)
            .nth(index)
            .map(|(i, _)| i)
            .ok_or_else(|| Error::parameterise(host, index, "no endpoint at this index"))?;

        let template = PathTemplate::parse(template)?;
        let target = &self.endpoints[position];

        if template.len() != target.template.len() {
            return Err(Error::parameterise(
                host,
                index,
                format!(
                    "template has {} segments but endpoint '{}' has {}",
                    template.len(),
                    target.template,
                    target.template.len()
                ),
            ));
        }
        if let Some(sample) = target.samples().find(|s| !template.matches(&s.path)) {
            return Err(Error::parameterise(
                host,
                index,
                format!("observed path '/{}' does not match", sample.path.join("/")),
            ));
        }

        let method = target.method;
        let involved: Vec<usize> = self
            .endpoints
            .iter()
            .enumerate()
            .filter(|(i, e)| {
                *i == position
                    || (e.host == host
                        && e.method == method
                        && e.samples().all(|s| template.matches(&s.path)))
            })
            .map(|(i, _)| i)
            .collect();

        // Lowest index is the earliest observed; the merged endpoint takes its slot
        let slot = involved[0];
        let mut samples: Vec<Sample> = Vec::new();
        let mut first_seen = u64::MAX;
        for &i in involved.iter().rev() {
            let endpoint = if i == slot {
                self.endpoints[i].clone()
            } else {
                self.endpoints.remove(i)
            };
            first_seen = first_seen.min(endpoint.first_seen);
            samples.extend(endpoint.samples);
        }
        samples.sort_by_key(|s| s.seq);
        let overflow = samples.len().saturating_sub(self.sample_cap);
        samples.drain(..overflow);

        let merged = &mut self.endpoints[slot];
        merged.template = template;
        merged.samples = samples.into();
        merged.first_seen = first_seen;
        debug_assert!(merged.is_consistent(), "parameterise broke endpoint {merged:?}");

        let outcome = ParameteriseOutcome {
            host: host.to_string(),
            method,
            path: merged.template.to_string(),
            merged: involved.len() - 1,
            samples: merged.sample_count(),
        };
        debug_assert!(self.keys_unique());
        info!(
            host = %outcome.host,
            method = %outcome.method,
            path = %outcome.path,
            merged = outcome.merged,
            "endpoint parameterised"
        );
        Ok(outcome)
    }

    fn keys_unique(&self) -> bool {
        let keys: std::collections::HashSet<_> = self.endpoints.iter().map(Endpoint::key).collect();
        keys.len() == self.endpoints.len()
    }

    /// Endpoints of enabled hosts, first-observed order
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.endpoints
            .iter()
            .filter(|e| !self.disabled_hosts.contains(&e.host))
            .cloned()
            .collect()
    }

    /// Every endpoint including disabled hosts
    pub fn all_endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Endpoints of enabled hosts grouped by host, host insertion order
    pub fn endpoints_by_host(&self) -> Vec<HostEndpoints> {
        self.hosts
            .iter()
            .filter(|h| !self.disabled_hosts.contains(*h))
            .map(|host| HostEndpoints {
                host: host.clone(),
                endpoints: self
                    .endpoints
                    .iter()
                    .filter(|e| &e.host == host)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    /// Every observed host, including disabled ones
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Replace the disabled-host filter
    pub fn set_disabled_hosts<I, S>(&mut self, hosts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled_hosts = hosts.into_iter().map(Into::into).collect();
    }

    /// Current disabled-host filter
    pub fn disabled_hosts(&self) -> &BTreeSet<String> {
        &self.disabled_hosts
    }

    /// Discard every endpoint, host and filter
    pub fn clear(&mut self) {
        self.endpoints.clear();
        self.hosts.clear();
        self.disabled_hosts.clear();
        self.next_seq = 0;
    }

    /// Number of endpoints, including disabled hosts
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// No endpoints recorded
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
