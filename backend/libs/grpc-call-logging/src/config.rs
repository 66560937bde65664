//! Environment configuration for call logging

use crate::error::Result;
use crate::logger::{CallLogger, Field};
use serde::Deserialize;

/// Call logging settings read from `CALL_LOG_*` environment variables
///
/// - `CALL_LOG_SERVER_NAME`: value of the `server_name` field
/// - `CALL_LOG_FIELDS`: comma-separated field names, e.g. `method,request_id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallLoggingConfig {
    #[serde(default)]
    pub server_name: Option<String>,

    #[serde(default)]
    pub fields: Vec<Field>,
}

impl CallLoggingConfig {
    pub const ENV_PREFIX: &'static str = "CALL_LOG_";

    pub fn from_env() -> Result<Self> {
        let config: Self = envy::prefixed(Self::ENV_PREFIX).from_env()?;
        Ok(config)
    }

    /// Parse from explicit key/value pairs (keys carry the `CALL_LOG_` prefix)
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(Self::ENV_PREFIX).from_iter(vars)?;
        Ok(config)
    }
}

impl CallLogger {
    /// Build a logger from configuration
    pub fn from_config(config: &CallLoggingConfig) -> Result<Self> {
        let mut builder = CallLogger::builder().with_fields(config.fields.iter().copied());
        if let Some(server_name) = &config.server_name {
            builder = builder.with_server_name(server_name.clone());
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallLoggingError;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_fields() {
        let config = CallLoggingConfig::from_vars(vars(&[
            ("CALL_LOG_SERVER_NAME", "feed-service"),
            ("CALL_LOG_FIELDS", "server_name,method,request_id"),
        ]))
        .unwrap();

        assert_eq!(config.server_name.as_deref(), Some("feed-service"));
        assert_eq!(
            config.fields,
            vec![Field::ServerName, Field::Method, Field::RequestId]
        );

        let logger = CallLogger::from_config(&config).unwrap();
        assert!(logger.has_field(Field::Method));
        assert!(!logger.has_field(Field::RemoteAddr));
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CallLoggingConfig::from_vars(Vec::new()).unwrap();

        assert!(config.server_name.is_none());
        assert!(config.fields.is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = CallLoggingConfig::from_vars(vars(&[("CALL_LOG_FIELDS", "method,hostname")]));
        assert!(matches!(result, Err(CallLoggingError::Config(_))));
    }

    #[test]
    fn test_empty_server_name_rejected() {
        let config = CallLoggingConfig {
            server_name: Some(String::new()),
            fields: vec![Field::ServerName],
        };

        assert!(matches!(
            CallLogger::from_config(&config),
            Err(CallLoggingError::InvalidOptionValue(_))
        ));
    }
}
