//! Error types for configuration building and environment loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Builder input errors
    #[error("loader registered without any file extension")]
    EmptyExtensionSet,

    #[error("invalid file extension '{extension}': {reason}")]
    InvalidExtension { extension: String, reason: String },

    #[error("invalid value for '{field}'{}", .hint.as_ref().map(|h| format!(": {h}")).unwrap_or_default())]
    InvalidValue { field: String, hint: Option<String> },

    // Environment loading errors
    #[error("cannot resolve project root '{}': {source}", .root.display())]
    UnresolvableRoot {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load build environment: {0}")]
    Environment(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Environment(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_renders_hint() {
        let err = ConfigError::InvalidValue {
            field: "mode".to_string(),
            hint: Some("expected development, production or none".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for 'mode': expected development, production or none"
        );
    }

    #[test]
    fn invalid_value_without_hint() {
        let err = ConfigError::InvalidValue {
            field: "mode".to_string(),
            hint: None,
        };
        assert_eq!(err.to_string(), "invalid value for 'mode'");
    }
}
