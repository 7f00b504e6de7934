//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported config format '{0}' (expected .json or .toml)")]
    UnsupportedFormat(String),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration text in the format named by `extension`.
pub fn parse_config(content: &str, extension: &str) -> Result<ProxyConfig, ConfigError> {
    match extension.to_ascii_lowercase().as_str() {
        "json" => Ok(serde_json::from_str(content)?),
        "toml" => Ok(toml::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Load and validate configuration from a JSON or TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content, extension)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_json() {
        let file = write_config(
            ".json",
            r#"{"port": 9000, "sticky": true, "backends": [{"url": "http://127.0.0.1:5001", "weight": 3}]}"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.port, 9000);
        assert!(config.sticky);
        assert_eq!(config.backends.len(), 1);
        assert!(config.backends[0].alive);
    }

    #[test]
    fn test_load_toml() {
        let file = write_config(
            ".toml",
            r#"
port = 9100
strategy = "weighted-round-robin"

[[backends]]
url = "http://127.0.0.1:5001"
weight = 5

[admin]
enabled = true
api_key = "secret"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.backends[0].weight, 5);
        assert_eq!(config.admin.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_unsupported_and_malformed() {
        let file = write_config(".yaml", "port: 1");
        assert!(matches!(load_config(file.path()), Err(ConfigError::UnsupportedFormat(_))));

        let file = write_config(".json", "{ not json");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_validation_error_surfaces() {
        let file = write_config(".json", r#"{"bind_host": "not-an-ip"}"#);
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().starts_with("validation failed"));
    }
}
