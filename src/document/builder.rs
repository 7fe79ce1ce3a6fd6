//! Document builder implementation

use super::types::{
    Info, MediaType, OpenApiDocument, Operation, Parameter, ParameterLocation, RequestBody,
    Response, Server,
};
use crate::config::{InfoConfig, RecorderConfig};
use crate::exchange::Body;
use crate::path::{PathSegment, PathTemplate};
use crate::schema::{merge_schemas, Schema, SchemaInferrer};
use crate::store::{Endpoint, Sample};
use crate::types::Method;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

const DEFAULT_JSON_TYPE: &str = "application/json";
const DEFAULT_OPAQUE_TYPE: &str = "application/octet-stream";

/// Sort endpoints for presentation
///
/// Path template first (segment by segment), then method precedence
/// (GET, POST, PUT, PATCH, DELETE, then the rest alphabetically), then host.
pub fn sort_endpoints(endpoints: &mut [Endpoint]) {
    endpoints.sort_by(|a, b| {
        a.template
            .sort_cmp(&b.template)
            .then(a.method.precedence().cmp(&b.method.precedence()))
            .then_with(|| a.host.cmp(&b.host))
    });
}

/// Builds OpenAPI documents from endpoints
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    info: InfoConfig,
    inferrer: SchemaInferrer,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new(InfoConfig::default(), SchemaInferrer::new())
    }
}

/// Endpoints sharing a rendered path and method, across hosts
struct OperationGroup<'a> {
    template: &'a PathTemplate,
    method: Method,
    endpoints: Vec<&'a Endpoint>,
}

impl<'a> OperationGroup<'a> {
    fn samples(&self) -> impl Iterator<Item = &'a Sample> + '_ {
        self.endpoints.iter().copied().flat_map(Endpoint::samples)
    }
}

impl DocumentBuilder {
    /// Create a builder
    pub fn new(info: InfoConfig, inferrer: SchemaInferrer) -> Self {
        Self { info, inferrer }
    }

    /// Create a builder from recorder configuration
    pub fn from_config(config: &RecorderConfig) -> Self {
        Self::new(config.info.clone(), config.inferrer())
    }

    /// Build a document; `endpoints` should already be host-filtered
    pub fn build(&self, endpoints: &[Endpoint]) -> OpenApiDocument {
        let mut document = OpenApiDocument::empty(Info {
            title: self.info.title.clone(),
            version: self.info.version.clone(),
            description: self.info.description.clone(),
        });
        document.servers = servers(endpoints);

        let mut sorted = endpoints.to_vec();
        sort_endpoints(&mut sorted);

        let mut operation_ids = HashSet::new();
        for group in group_operations(&sorted) {
            let path = group.template.to_string();
            let operation = self.build_operation(&group, &path, &mut operation_ids);
            document
                .paths
                .entry(path)
                .or_default()
                .insert(group.method.as_lower().to_string(), operation);
        }

        debug!(
            paths = document.paths.len(),
            operations = document.operation_count(),
            "document built"
        );
        document
    }

    fn build_operation(
        &self,
        group: &OperationGroup<'_>,
        path: &str,
        operation_ids: &mut HashSet<String>,
    ) -> Operation {
        let mut parameters = self.path_parameters(group);
        parameters.extend(self.query_parameters(group));

        let mut responses = self.responses(group);
        if responses.is_empty() {
            responses.insert(
                "default".to_string(),
                Response {
                    description: "Response".to_string(),
                    content: BTreeMap::new(),
                },
            );
        }

        Operation {
            summary: format!("{} {}", group.method, path),
            operation_id: unique_operation_id(group, operation_ids),
            parameters,
            request_body: self.request_body(group),
            responses,
        }
    }

    /// One required parameter per placeholder, typed from observed values
    fn path_parameters(&self, group: &OperationGroup<'_>) -> Vec<Parameter> {
        group
            .template
            .params()
            .map(|(position, name)| {
                let values = group
                    .samples()
                    .filter_map(|s| s.path.get(position).map(String::as_str));
                Parameter {
                    name: name.to_string(),
                    location: ParameterLocation::Path,
                    required: true,
                    schema: self.text_schema(values),
                }
            })
            .collect()
    }

    /// Query keys in first-seen order; required when present in every sample
    fn query_parameters(&self, group: &OperationGroup<'_>) -> Vec<Parameter> {
        let total = group.samples().count();
        let mut names: Vec<&str> = Vec::new();
        for sample in group.samples() {
            for (name, _) in &sample.query {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }

        names
            .into_iter()
            .map(|name| {
                let present = group
                    .samples()
                    .filter(|s| s.query.iter().any(|(k, _)| k == name))
                    .count();
                let values = group
                    .samples()
                    .flat_map(|s| s.query.iter())
                    .filter(|(k, _)| k == name)
                    .map(|(_, v)| v.as_str());
                Parameter {
                    name: name.to_string(),
                    location: ParameterLocation::Query,
                    required: present == total,
                    schema: self.text_schema(values),
                }
            })
            .collect()
    }

    /// Number when every value is numeric, string otherwise
    fn text_schema<'v>(&self, values: impl Iterator<Item = &'v str>) -> Value {
        let merged = values
            .map(|v| self.inferrer.infer_text(v))
            .reduce(|a, b| merge_schemas(&a, &b));
        match merged {
            Some(schema @ (Schema::Integer | Schema::Number | Schema::String { .. })) => {
                schema.to_json_schema()
            }
            _ => json!({ "type": "string" }),
        }
    }

    fn request_body(&self, group: &OperationGroup<'_>) -> Option<RequestBody> {
        let mut content: BTreeMap<String, Schema> = BTreeMap::new();
        let mut with_body = 0;
        let mut total = 0;
        for endpoint in &group.endpoints {
            total += endpoint.sample_count();
            for sample in endpoint.request_body_samples() {
                with_body += 1;
                self.fold_body(&mut content, sample.content_type, sample.body);
            }
        }
        if content.is_empty() {
            return None;
        }
        Some(RequestBody {
            required: with_body == total,
            content: media_types(content),
        })
    }

    /// Per status, per content type, merged independently
    fn responses(&self, group: &OperationGroup<'_>) -> BTreeMap<String, Response> {
        let mut by_status: BTreeMap<u16, BTreeMap<String, Schema>> = BTreeMap::new();
        for endpoint in &group.endpoints {
            for (status, samples) in endpoint.responses_by_status() {
                let content = by_status.entry(status).or_default();
                for sample in samples.bodies {
                    self.fold_body(content, sample.content_type, sample.body);
                }
            }
        }

        by_status
            .into_iter()
            .map(|(status, content)| {
                (
                    status.to_string(),
                    Response {
                        description: status_description(status),
                        content: media_types(content),
                    },
                )
            })
            .collect()
    }

    fn fold_body(
        &self,
        content: &mut BTreeMap<String, Schema>,
        content_type: Option<&str>,
        body: &Body,
    ) {
        let (schema, fallback_type) = match body {
            Body::Json { value } => (self.inferrer.infer(value), DEFAULT_JSON_TYPE),
            Body::Opaque { .. } => (Schema::string(), DEFAULT_OPAQUE_TYPE),
        };
        let key = content_type.unwrap_or(fallback_type).to_string();
        let merged = match content.get(&key) {
            Some(existing) => merge_schemas(existing, &schema),
            None => schema,
        };
        content.insert(key, merged);
    }
}

fn media_types(content: BTreeMap<String, Schema>) -> BTreeMap<String, MediaType> {
    content
        .into_iter()
        .map(|(ct, schema)| {
            (
                ct,
                MediaType {
                    schema: schema.to_json_schema(),
                },
            )
        })
        .collect()
}

/// Group sorted endpoints by (path shape, method), skipping methods OpenAPI cannot describe
///
/// Templates differing only in placeholder names share one path key, named
/// after the first of them in sorted order.
fn group_operations(sorted: &[Endpoint]) -> Vec<OperationGroup<'_>> {
    let mut shapes: Vec<&PathTemplate> = Vec::new();
    let mut groups: Vec<OperationGroup<'_>> = Vec::new();
    for endpoint in sorted {
        if !endpoint.method.is_documentable() {
            debug!(method = %endpoint.method, path = %endpoint.template, "skipping undocumentable method");
            continue;
        }

        let template = match shapes.iter().find(|t| t.same_shape(&endpoint.template)) {
            Some(canonical) => *canonical,
            None => {
                shapes.push(&endpoint.template);
                &endpoint.template
            }
        };
        if *template != endpoint.template {
            debug!(
                from = %endpoint.template,
                to = %template,
                method = %endpoint.method,
                "renaming placeholders to match path"
            );
        }

        match groups
            .iter_mut()
            .find(|g| g.method == endpoint.method && g.template == template)
        {
            Some(group) => group.endpoints.push(endpoint),
            None => groups.push(OperationGroup {
                template,
                method: endpoint.method,
                endpoints: vec![endpoint],
            }),
        }
    }
    groups
}

/// Distinct `scheme://host` in first-seen order
fn servers(endpoints: &[Endpoint]) -> Vec<Server> {
    let mut servers: Vec<Server> = Vec::new();
    for endpoint in endpoints {
        for sample in endpoint.samples() {
            let url = format!("{}://{}", sample.scheme, endpoint.host);
            if !servers.iter().any(|s| s.url == url) {
                servers.push(Server { url });
            }
        }
    }
    servers
}

fn status_description(status: u16) -> String {
    axum::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Response")
        .to_string()
}

/// `get_users_by_id` style identifier, suffixed on collision
fn unique_operation_id(group: &OperationGroup<'_>, taken: &mut HashSet<String>) -> String {
    let mut parts = vec![group.method.as_lower().to_string()];
    for segment in group.template.segments() {
        let part = match segment {
            PathSegment::Literal(literal) => sanitize(literal),
            PathSegment::Param(name) => format!("by_{}", sanitize(name)),
        };
        if !part.is_empty() {
            parts.push(part);
        }
    }
    if group.template.is_empty() {
        parts.push("root".to_string());
    }

    let base = parts.join("_");
    let mut candidate = base.clone();
    let mut suffix = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{base}_{suffix}");
        suffix += 1;
    }
    candidate
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}
