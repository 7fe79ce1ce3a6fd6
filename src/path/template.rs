//! Path template types and matching

use crate::error::{Error, Result};
use crate::schema::is_uuid;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Split a raw path into segments
///
/// Query string and fragment are dropped, empty segments (leading, trailing
/// or doubled slashes) are skipped, so `/` yields no segments and
/// `/users/1/` equals `/users/1`.
pub fn split_path(path: &str) -> Vec<String> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end]
        .split('/')
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Policy for placeholders on newly created endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterPolicy {
    /// Templates start fully literal; only explicit parameterisation adds placeholders
    #[default]
    Manual,
    /// Numeric and UUID-looking segments become placeholders on first sight
    Heuristic,
}

/// One segment of a path template
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PathSegment {
    Literal(String),
    Param(String),
}

impl PathSegment {
    /// Whether this segment accepts the concrete segment
    pub fn matches(&self, concrete: &str) -> bool {
        match self {
            PathSegment::Literal(literal) => literal == concrete,
            PathSegment::Param(_) => true,
        }
    }

    /// Parameter name, if this is a placeholder
    pub fn param_name(&self) -> Option<&str> {
        match self {
            PathSegment::Param(name) => Some(name),
            PathSegment::Literal(_) => None,
        }
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Literal(literal) => f.write_str(literal),
            PathSegment::Param(name) => write!(f, "{{{name}}}"),
        }
    }
}

/// Ordered sequence of path segments
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathTemplate {
    segments: Vec<PathSegment>,
}

impl PathTemplate {
    /// Fully literal template for a concrete path
    pub fn literal(segments: &[String]) -> Self {
        Self {
            segments: segments
                .iter()
                .map(|s| PathSegment::Literal(s.clone()))
                .collect(),
        }
    }

    /// Template for a concrete path under the given policy
    pub fn for_new_endpoint(segments: &[String], policy: ParameterPolicy) -> Self {
        match policy {
            ParameterPolicy::Manual => Self::literal(segments),
            ParameterPolicy::Heuristic => Self::detect(segments),
        }
    }

    /// Replace numeric and UUID segments with `param1`, `param2`, ...
    fn detect(segments: &[String]) -> Self {
        let mut next = 0;
        let segments = segments
            .iter()
            .map(|s| {
                if looks_like_id(s) {
                    next += 1;
                    PathSegment::Param(format!("param{next}"))
                } else {
                    PathSegment::Literal(s.clone())
                }
            })
            .collect();
        Self { segments }
    }

    /// Parse a template string such as `/users/{id}/posts`
    pub fn parse(template: &str) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut segments = Vec::new();

        for raw in split_path(template) {
            if let Some(inner) = raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
                let name = inner.trim();
                if name.is_empty() {
                    return Err(Error::invalid_template(template, "empty parameter name"));
                }
                if name.contains(['{', '}']) {
                    return Err(Error::invalid_template(
                        template,
                        format!("malformed parameter '{raw}'"),
                    ));
                }
                if !seen.insert(name.to_string()) {
                    return Err(Error::invalid_template(
                        template,
                        format!("duplicate parameter '{name}'"),
                    ));
                }
                segments.push(PathSegment::Param(name.to_string()));
            } else if raw.contains(['{', '}']) {
                return Err(Error::invalid_template(
                    template,
                    format!("malformed segment '{raw}'"),
                ));
            } else {
                segments.push(PathSegment::Literal(raw));
            }
        }

        Ok(Self { segments })
    }

    /// Segment list
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Root template
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of literal segments; more literals means a more specific match
    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, PathSegment::Literal(_)))
            .count()
    }

    /// Whether the template has any placeholder
    pub fn has_params(&self) -> bool {
        self.literal_count() < self.len()
    }

    /// Positions and names of placeholders
    pub fn params(&self) -> impl Iterator<Item = (usize, &str)> {
        self.segments
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.param_name().map(|name| (i, name)))
    }

    /// Same literals and placeholder positions, placeholder names aside
    pub fn same_shape(&self, other: &Self) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| match (a, b) {
                    (PathSegment::Literal(x), PathSegment::Literal(y)) => x == y,
                    (PathSegment::Param(_), PathSegment::Param(_)) => true,
                    _ => false,
                })
    }

    /// Equal segment counts and every position matches
    pub fn matches(&self, concrete: &[String]) -> bool {
        self.segments.len() == concrete.len()
            && self
                .segments
                .iter()
                .zip(concrete)
                .all(|(segment, value)| segment.matches(value))
    }

    /// Presentation order: segment by segment on rendered text, shorter first on ties
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.segments.iter().zip(&other.segments) {
            let ordering = a.to_string().cmp(&b.to_string());
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        self.segments.len().cmp(&other.segments.len())
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for PathTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn looks_like_id(segment: &str) -> bool {
    (!segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())) || is_uuid(segment)
}
