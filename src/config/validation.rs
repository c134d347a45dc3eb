//! Configuration validation against a plugin's policy.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Options the policy does not mention are passed through untouched
//! - Defaults are applied only to options that are absent

use thiserror::Error;

use crate::config::policy::ConfigPolicy;
use crate::config::schema::Config;

/// A single policy violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required option '{0}' is missing")]
    MissingRequired(String),

    #[error("option '{key}' must be a {expected}, got {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Check `config` against every rule in `policy`.
pub fn validate_config(policy: &ConfigPolicy, config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for rule in policy.rules() {
        match config.get(&rule.key) {
            Some(value) if !rule.kind.accepts(value) => {
                errors.push(ValidationError::TypeMismatch {
                    key: rule.key.clone(),
                    expected: rule.kind.as_str(),
                    found: value.kind(),
                });
            }
            Some(_) => {}
            None if rule.required && rule.default.is_none() => {
                errors.push(ValidationError::MissingRequired(rule.key.clone()));
            }
            None => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Fill absent options from rule defaults.
pub fn apply_defaults(policy: &ConfigPolicy, config: &mut Config) {
    for rule in policy.rules() {
        if config.contains(&rule.key) {
            continue;
        }
        if let Some(default) = &rule.default {
            config.insert(rule.key.clone(), default.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::policy::RuleKind;
    use crate::config::schema::ConfigValue;

    fn policy() -> ConfigPolicy {
        let mut policy = ConfigPolicy::new();
        policy
            .add_string_rule(&[""], "log-level", false)
            .add_rule(&[""], "endpoint", RuleKind::String, true, None)
            .add_rule(&[""], "interval", RuleKind::Integer, true, Some(ConfigValue::Integer(10)));
        policy
    }

    #[test]
    fn test_valid_config() {
        let config = Config::new().with("endpoint", "local").with("log-level", "info");
        assert!(validate_config(&policy(), &config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let config = Config::new().with("log-level", 5i64).with("interval", "soon");
        let errors = validate_config(&policy(), &config).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::MissingRequired("endpoint".into())));
        assert!(errors.contains(&ValidationError::TypeMismatch {
            key: "log-level".into(),
            expected: "string",
            found: "integer",
        }));
    }

    #[test]
    fn test_required_with_default_is_not_missing() {
        let config = Config::new().with("endpoint", "local");
        assert!(validate_config(&policy(), &config).is_ok());
    }

    #[test]
    fn test_apply_defaults() {
        let mut config = Config::new().with("endpoint", "local");
        apply_defaults(&policy(), &mut config);
        assert_eq!(config.get_integer("interval"), Ok(10));
        assert!(!config.contains("log-level"));

        let mut config = Config::new().with("interval", 3i64);
        apply_defaults(&policy(), &mut config);
        assert_eq!(config.get_integer("interval"), Ok(3));
    }

    #[test]
    fn test_unknown_options_pass_through() {
        let config = Config::new().with("endpoint", "local").with("extra", true);
        assert!(validate_config(&policy(), &config).is_ok());
    }
}
