//! Metric and identity types shared between the host and the publisher.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of plugin, as reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    Publisher,
}

impl PluginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginType::Publisher => "publisher",
        }
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plugin identity fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PluginMeta {
    pub name: &'static str,
    pub version: u32,
    #[serde(rename = "type")]
    pub kind: PluginType,
}

/// Hierarchical metric namespace.
///
/// Rendered the way the host renders it: a leading `/` followed by the
/// segments joined with `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "NamespaceRepr", into = "Vec<String>")]
pub struct Namespace {
    segments: Vec<String>,
}

impl Namespace {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a `/`-delimited path. A single leading `/` is optional.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        if trimmed.is_empty() {
            return Self::default();
        }
        Self::new(trimmed.split('/'))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Exact suffix match against the rendered namespace.
    pub fn ends_with(&self, suffix: &str) -> bool {
        self.to_string().ends_with(suffix)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        f.write_str(&self.segments.join("/"))
    }
}

impl From<Namespace> for Vec<String> {
    fn from(ns: Namespace) -> Self {
        ns.segments
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NamespaceRepr {
    Segments(Vec<String>),
    Path(String),
}

impl From<NamespaceRepr> for Namespace {
    fn from(repr: NamespaceRepr) -> Self {
        match repr {
            NamespaceRepr::Segments(segments) => Namespace::new(segments),
            NamespaceRepr::Path(path) => Namespace::parse(&path),
        }
    }
}

/// A single unit of telemetry received from the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub namespace: Namespace,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Sampled value, if the collector attached one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Metric {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Look up a tag. A missing key is not an error.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_rendering() {
        let ns = Namespace::new(["db", "query", "wait"]);
        assert_eq!(ns.to_string(), "/db/query/wait");
        assert_eq!(Namespace::default().to_string(), "/");
    }

    #[test]
    fn test_namespace_parse() {
        assert_eq!(Namespace::parse("/db/query/wait"), Namespace::new(["db", "query", "wait"]));
        assert_eq!(Namespace::parse("db/query/wait"), Namespace::new(["db", "query", "wait"]));
        assert!(Namespace::parse("/").is_empty());
        // Empty inner segments are kept as-is
        assert_eq!(Namespace::parse("a//b").segments().len(), 3);
    }

    #[test]
    fn test_suffix_is_exact() {
        assert!(Namespace::parse("db/query/wait").ends_with("/wait"));
        assert!(Namespace::parse("wait").ends_with("/wait"));
        assert!(!Namespace::parse("db/query/WAIT").ends_with("/wait"));
        assert!(!Namespace::parse("db/query/wait/").ends_with("/wait"));
        assert!(!Namespace::parse("db/query/nowait").ends_with("/wait"));
    }

    #[test]
    fn test_missing_tag_is_none() {
        let metric = Metric::new(Namespace::parse("db/query/wait"));
        assert_eq!(metric.tag("sql"), None);

        let metric = metric.with_tag("sql", "SELECT 1");
        assert_eq!(metric.tag("sql"), Some("SELECT 1"));
    }

    #[test]
    fn test_metric_deserialize_both_namespace_forms() {
        let json = r#"[
            {"namespace": ["db", "query", "wait"], "tags": {"sql": "SELECT 1"}},
            {"namespace": "/db/query/exec", "data": 4.5}
        ]"#;
        let metrics: Vec<Metric> = serde_json::from_str(json).unwrap();
        assert_eq!(metrics[0].namespace().to_string(), "/db/query/wait");
        assert_eq!(metrics[0].tag("sql"), Some("SELECT 1"));
        assert_eq!(metrics[1].namespace().to_string(), "/db/query/exec");
        assert!(metrics[1].tags.is_empty());
        assert_eq!(metrics[1].data, Some(serde_json::json!(4.5)));
    }

    #[test]
    fn test_plugin_type_display() {
        assert_eq!(PluginType::Publisher.to_string(), "publisher");
    }
}
