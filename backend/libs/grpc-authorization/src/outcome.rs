//! Per-call validation outcome

use crate::error::AuthorizationError;
use crate::validator::AuthValue;
use std::sync::Arc;

/// Result of validating one call's credentials
///
/// Computed once when the call enters the authorization layer and stored
/// immutably with the call. `Unchecked` is never produced by validation; it
/// describes a call no authorization layer looked at.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// No authorization layer examined the call
    Unchecked,
    /// No `authorization` metadata was sent
    Missing,
    /// The value does not follow `<scheme> <credential>`
    MalformedHeader(String),
    /// The scheme token violates the naming rule
    InvalidSchemeName { scheme: String, reason: &'static str },
    /// No validator is registered for the scheme
    UnsupportedScheme(String),
    /// The validator rejected the credential or failed
    ValidatorError(Arc<dyn std::error::Error + Send + Sync>),
    /// The validator accepted the credential
    Success(AuthValue),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The success value, if any
    pub fn value(&self) -> Option<&AuthValue> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    /// The error a handler sees for this outcome, `None` on success
    pub fn error(&self) -> Option<AuthorizationError> {
        match self {
            Outcome::Unchecked => Some(AuthorizationError::Unchecked),
            Outcome::Missing => Some(AuthorizationError::Missing),
            Outcome::MalformedHeader(detail) => {
                Some(AuthorizationError::MalformedHeader(detail.clone()))
            }
            Outcome::InvalidSchemeName { scheme, reason } => {
                Some(AuthorizationError::InvalidSchemeName {
                    scheme: scheme.clone(),
                    reason: *reason,
                })
            }
            Outcome::UnsupportedScheme(scheme) => {
                Some(AuthorizationError::UnsupportedScheme(scheme.clone()))
            }
            Outcome::ValidatorError(cause) => Some(AuthorizationError::Validator(cause.clone())),
            Outcome::Success(_) => None,
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Unchecked => "unchecked",
            Outcome::Missing => "missing",
            Outcome::MalformedHeader(_) => "malformed_header",
            Outcome::InvalidSchemeName { .. } => "invalid_scheme_name",
            Outcome::UnsupportedScheme(_) => "unsupported_scheme",
            Outcome::ValidatorError(_) => "validator_error",
            Outcome::Success(_) => "success",
        }
    }
}

impl From<AuthorizationError> for Outcome {
    /// Classify an error raised while validating a call.
    ///
    /// Routing errors keep their kind; everything else counts as a validator
    /// rejection.
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Missing => Outcome::Missing,
            AuthorizationError::MalformedHeader(detail) => Outcome::MalformedHeader(detail),
            AuthorizationError::InvalidSchemeName { scheme, reason } => {
                Outcome::InvalidSchemeName { scheme, reason }
            }
            AuthorizationError::UnsupportedScheme(scheme) => Outcome::UnsupportedScheme(scheme),
            other => Outcome::ValidatorError(Arc::new(other)),
        }
    }
}
