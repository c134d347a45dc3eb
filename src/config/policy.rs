//! Config policy: the options a plugin declares to its host.

use serde::Serialize;

use crate::config::schema::ConfigValue;

/// Expected kind of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    String,
    Integer,
    Float,
    Bool,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::String => "string",
            RuleKind::Integer => "integer",
            RuleKind::Float => "float",
            RuleKind::Bool => "bool",
        }
    }

    /// Whether a value satisfies this kind. Integers satisfy float rules.
    pub fn accepts(&self, value: &ConfigValue) -> bool {
        matches!(
            (self, value),
            (RuleKind::String, ConfigValue::String(_))
                | (RuleKind::Integer, ConfigValue::Integer(_))
                | (RuleKind::Float, ConfigValue::Float(_))
                | (RuleKind::Float, ConfigValue::Integer(_))
                | (RuleKind::Bool, ConfigValue::Bool(_))
        )
    }
}

/// A single accepted option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyRule {
    /// Namespace prefix the rule applies to. Empty means the root.
    pub namespace: Vec<String>,
    pub key: String,
    pub kind: RuleKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ConfigValue>,
}

impl PolicyRule {
    /// A rule scoped at the root applies to every metric.
    pub fn is_global(&self) -> bool {
        self.namespace.iter().all(String::is_empty)
    }
}

/// Options accepted by a plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigPolicy {
    rules: Vec<PolicyRule>,
}

impl ConfigPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_string_rule(&mut self, namespace: &[&str], key: &str, required: bool) -> &mut Self {
        self.add_rule(namespace, key, RuleKind::String, required, None)
    }

    pub fn add_rule(
        &mut self,
        namespace: &[&str],
        key: &str,
        kind: RuleKind,
        required: bool,
        default: Option<ConfigValue>,
    ) -> &mut Self {
        self.rules.push(PolicyRule {
            namespace: namespace.iter().map(|s| s.to_string()).collect(),
            key: key.to_string(),
            kind,
            required,
            default,
        });
        self
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    pub fn rule(&self, key: &str) -> Option<&PolicyRule> {
        self.rules.iter().find(|r| r.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
