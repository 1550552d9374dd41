//! Request URL construction
//!
//! Paths are resolved against an optional base prefix injected at construction.
//! With an empty base the builder emits origin-relative `path?query` strings so a
//! same-origin reverse proxy can route them; with an absolute base (or an
//! absolute input path) it emits full URLs.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use reqwest::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Placeholder origin used to parse origin-relative paths
const PLACEHOLDER_ORIGIN: &str = "http://localhost/";

fn separator_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("/{2,}").expect("static regex"))
}

/// A single query parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Skipped when building the query string
    Absent,
}

impl QueryValue {
    fn render(&self) -> Option<String> {
        match self {
            QueryValue::Text(s) => Some(s.clone()),
            QueryValue::Number(n) => Some(n.to_string()),
            QueryValue::Bool(b) => Some(b.to_string()),
            QueryValue::Absent => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Number(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Number(value as f64)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Number(f64::from(value))
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(QueryValue::Absent)
    }
}

/// Ordered query parameters; a repeated key keeps its last value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(Vec<(String, QueryValue)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<QueryValue>) {
        self.0.push((key.to_string(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Output of [`UrlBuilder::build`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedUrl {
    /// Scheme, host and path
    Absolute(String),
    /// Path and query only, to be sent to the current origin
    Relative(String),
}

impl ResolvedUrl {
    pub fn as_str(&self) -> &str {
        match self {
            ResolvedUrl::Absolute(s) | ResolvedUrl::Relative(s) => s,
        }
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self, ResolvedUrl::Absolute(_))
    }

    /// Attach an origin to a relative URL so it can be dispatched
    pub fn with_origin(&self, origin: &str) -> String {
        match self {
            ResolvedUrl::Absolute(s) => s.clone(),
            ResolvedUrl::Relative(s) => format!("{}{}", origin.trim_end_matches('/'), s),
        }
    }
}

impl fmt::Display for ResolvedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves request paths against the configured base prefix
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    /// `scheme://host[:port]` when the base is absolute
    base_origin: Option<String>,
    /// Path part of the base, no trailing separator (may be empty)
    base_path: String,
}

impl UrlBuilder {
    /// Create a builder; `base` may be empty, a path prefix or an absolute URL
    pub fn new(base: &str) -> Result<Self> {
        let base = base.trim();
        if base.starts_with("http") {
            let url = Url::parse(base)
                .map_err(|e| Error::Config(format!("Invalid base URL {:?}: {}", base, e)))?;
            let origin = url.origin().ascii_serialization();
            Ok(Self {
                base_origin: Some(origin),
                base_path: normalize_prefix(url.path()),
            })
        } else {
            Ok(Self {
                base_origin: None,
                base_path: normalize_prefix(base),
            })
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.base_url)
    }

    /// Resolve `path` and merge `params` into its query string
    pub fn build(&self, path: &str, params: &QueryParams) -> Result<ResolvedUrl> {
        let path = path.trim();
        if path.is_empty() {
            return Err(Error::InvalidRequest("request path is empty".into()));
        }

        if path.starts_with("http") {
            let mut url = Url::parse(path)
                .map_err(|e| Error::InvalidRequest(format!("invalid URL {:?}: {}", path, e)))?;
            apply_params(&mut url, params);
            return Ok(ResolvedUrl::Absolute(url.to_string()));
        }

        let path = format!("/{}", path.trim_start_matches('/'));
        let joined = if self.base_path.is_empty() || has_leading_segment(&path, &self.base_path)
        {
            path
        } else {
            format!("{}{}", self.base_path, path)
        };
        let joined = collapse_separators(&joined);

        match &self.base_origin {
            Some(origin) => {
                let full = format!("{}{}", origin, joined);
                let mut url = Url::parse(&full)
                    .map_err(|e| Error::InvalidRequest(format!("invalid URL {:?}: {}", full, e)))?;
                apply_params(&mut url, params);
                Ok(ResolvedUrl::Absolute(url.to_string()))
            }
            None => {
                let mut url = Url::parse(PLACEHOLDER_ORIGIN)
                    .and_then(|root| root.join(&joined))
                    .map_err(|e| {
                        Error::InvalidRequest(format!("invalid path {:?}: {}", joined, e))
                    })?;
                apply_params(&mut url, params);
                let relative = match url.query() {
                    Some(query) => format!("{}?{}", url.path(), query),
                    None => url.path().to_string(),
                };
                Ok(ResolvedUrl::Relative(relative))
            }
        }
    }
}

/// `/api/` and `api` both become `/api`; empty stays empty
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        collapse_separators(&format!("/{}", trimmed))
    }
}

fn has_leading_segment(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

/// Collapse separator runs in the path portion; the query is left alone
fn collapse_separators(path: &str) -> String {
    let (head, tail) = match path.find(|c: char| c == '?' || c == '#') {
        Some(idx) => path.split_at(idx),
        None => (path, ""),
    };
    format!("{}{}", separator_runs().replace_all(head, "/"), tail)
}

/// Set semantics: the first existing pair for a key is replaced, later duplicates dropped
fn apply_params(url: &mut Url, params: &QueryParams) {
    let rendered: Vec<(&str, String)> = params
        .iter()
        .filter_map(|(key, value)| value.render().map(|v| (key, v)))
        .collect();
    if rendered.is_empty() {
        return;
    }

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    for (key, value) in rendered {
        match pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                pairs[first].1 = value;
                let mut idx = 0;
                pairs.retain(|(k, _)| {
                    let keep = k != key || idx == first;
                    idx += 1;
                    keep
                });
            }
            None => pairs.push((key.to_string(), value)),
        }
    }

    url.query_pairs_mut().clear().extend_pairs(pairs.iter());
}
