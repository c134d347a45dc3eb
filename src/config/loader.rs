//! Batch file loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::policy::ConfigPolicy;
use crate::config::schema::BatchFile;
use crate::config::validation::{apply_defaults, validate_config, ValidationError};

/// Error type for batch loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a batch file, validate its config against `policy` and fill defaults.
pub fn load_batch(path: &Path, policy: &ConfigPolicy) -> Result<BatchFile, LoadError> {
    let content = fs::read_to_string(path)?;
    parse_batch(&content, policy)
}

/// Same as [`load_batch`] for in-memory TOML.
pub fn parse_batch(content: &str, policy: &ConfigPolicy) -> Result<BatchFile, LoadError> {
    let mut batch: BatchFile = toml::from_str(content)?;

    validate_config(policy, &batch.config).map_err(LoadError::Validation)?;
    apply_defaults(policy, &mut batch.config);

    tracing::debug!(
        options = batch.config.len(),
        metrics = batch.metrics.len(),
        probe = batch.probe.enabled,
        "Batch loaded"
    );

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ConfigPolicy {
        let mut policy = ConfigPolicy::new();
        policy.add_string_rule(&[""], "log-level", false);
        policy
    }

    #[test]
    fn test_parse_batch() {
        let batch = parse_batch(
            r#"
            [config]
            log-level = "info"

            [[metrics]]
            namespace = ["db", "query", "wait"]
            tags = { sql = "SELECT 1" }
            data = 12.5

            [[metrics]]
            namespace = "/db/query/exec"
            "#,
            &policy(),
        )
        .unwrap();

        assert_eq!(batch.config.get_string("log-level"), Ok("info"));
        assert_eq!(batch.metrics.len(), 2);
        assert_eq!(batch.metrics[0].namespace().to_string(), "/db/query/wait");
        assert_eq!(batch.metrics[0].tag("sql"), Some("SELECT 1"));
        assert_eq!(batch.metrics[1].namespace().to_string(), "/db/query/exec");
        assert!(!batch.probe.enabled);
    }

    #[test]
    fn test_empty_batch() {
        let batch = parse_batch("", &policy()).unwrap();
        assert!(batch.config.is_empty());
        assert!(batch.metrics.is_empty());
    }

    #[test]
    fn test_parse_error() {
        let err = parse_batch("[[metrics]\nnamespace = ", &policy()).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_validation_error() {
        let err = parse_batch("[config]\nlog-level = 3\n", &policy()).unwrap_err();
        match err {
            LoadError::Validation(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_probe_section() {
        let batch = parse_batch(
            r#"
            [probe]
            enabled = true
            counters = ['\Memory\Available Mbytes']
            format = "double"

            [probe.samples]
            '\Memory\Available Mbytes' = 2048.0
            "#,
            &policy(),
        )
        .unwrap();

        assert!(batch.probe.enabled);
        assert_eq!(batch.probe.counters, vec![r"\Memory\Available Mbytes".to_string()]);
        assert_eq!(batch.probe.samples.get(r"\Memory\Available Mbytes"), Some(&2048.0));
    }
}
