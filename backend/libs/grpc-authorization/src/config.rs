//! Environment configuration for authorization

use crate::authorization::Authorization;
use crate::error::{AuthorizationError, Result};
use crate::validator::CredentialValidator;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Accepted schemes read from `AUTHORIZATION_*` environment variables
///
/// - `AUTHORIZATION_SCHEMES`: comma-separated scheme names, e.g. `bearer,basic`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizationConfig {
    #[serde(default)]
    pub schemes: Vec<String>,
}

impl AuthorizationConfig {
    pub const ENV_PREFIX: &'static str = "AUTHORIZATION_";

    pub fn from_env() -> Result<Self> {
        let config: Self = envy::prefixed(Self::ENV_PREFIX).from_env()?;
        Ok(config)
    }

    /// Parse from explicit key/value pairs (keys carry the `AUTHORIZATION_` prefix)
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(Self::ENV_PREFIX).from_iter(vars)?;
        Ok(config)
    }
}

impl Authorization {
    /// Build an instance accepting exactly the configured schemes
    ///
    /// `validators` supplies the implementation of each scheme by name;
    /// entries for schemes that are not configured are ignored.
    ///
    /// ## Errors
    ///
    /// `InvalidOptionValue` wrapping `MissingValidator` for a configured
    /// scheme without a validator, or `InvalidSchemeName` for a badly
    /// named one.
    pub fn from_config(
        config: &AuthorizationConfig,
        validators: &HashMap<String, Arc<dyn CredentialValidator>>,
    ) -> Result<Self> {
        let mut builder = Authorization::builder();
        for scheme in &config.schemes {
            builder = match validators.get(scheme) {
                Some(validator) => builder.with_shared_scheme(scheme, validator.clone()),
                None => builder.fail(AuthorizationError::MissingValidator {
                    scheme: scheme.clone(),
                }),
            };
        }
        builder.build()
    }
}
