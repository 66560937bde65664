//! Error types for call authorization

use std::sync::Arc;
use thiserror::Error;
use tonic::Status;

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthorizationError>;

/// Errors produced while configuring authorization, validating calls and
/// reading the validation outcome back
///
/// Per-call failures (`Missing` through `Validator`) are what handlers see
/// from [`AuthorizationExt`](crate::AuthorizationExt); match on the variant to
/// choose the message returned to the client.
#[derive(Debug, Clone, Error)]
pub enum AuthorizationError {
    /// Construction-time misconfiguration; wraps the option's own error
    #[error("invalid option value: {0}")]
    InvalidOptionValue(#[source] Box<AuthorizationError>),

    /// A configured scheme has no validator to dispatch to
    #[error("no credential validator supplied for scheme \"{scheme}\"")]
    MissingValidator { scheme: String },

    /// A scheme name violates the naming rule
    #[error("invalid authorization scheme \"{scheme}\": {reason}")]
    InvalidSchemeName { scheme: String, reason: &'static str },

    /// No authorization layer ran for this call
    #[error("authorization metadata is unchecked")]
    Unchecked,

    /// The caller sent no credentials
    #[error("request has no authorization credentials")]
    Missing,

    /// Credentials were sent but could not be parsed
    #[error("authorization credentials are invalid: {0}")]
    MalformedHeader(String),

    /// Credentials use a scheme with no registered validator
    #[error("authorization credentials are invalid: scheme \"{0}\" is not supported")]
    UnsupportedScheme(String),

    /// The validator ran and rejected the credentials
    #[error("authorization credentials are invalid: {0}")]
    Validator(#[source] Arc<dyn std::error::Error + Send + Sync>),

    /// The stored value is not of the requested type
    #[error("authorization has the wrong type: expecting a {expected} but value is a {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The value cannot be carried in ASCII metadata
    #[error("credential cannot be sent as metadata: {0}")]
    InvalidMetadataValue(String),

    /// Environment configuration could not be parsed
    #[error("authorization configuration error: {0}")]
    Config(String),
}

impl From<envy::Error> for AuthorizationError {
    fn from(err: envy::Error) -> Self {
        AuthorizationError::Config(err.to_string())
    }
}

impl AuthorizationError {
    /// Wrap an option failure the way construction reports it
    pub(crate) fn invalid_option(cause: AuthorizationError) -> Self {
        match cause {
            already @ AuthorizationError::InvalidOptionValue(_) => already,
            other => AuthorizationError::InvalidOptionValue(Box::new(other)),
        }
    }

    /// The option error behind an `InvalidOptionValue`, or `self`
    pub fn cause(&self) -> &AuthorizationError {
        match self {
            AuthorizationError::InvalidOptionValue(inner) => inner,
            other => other,
        }
    }

    /// True when the client should be told to authenticate or re-authenticate
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            AuthorizationError::Missing
                | AuthorizationError::MalformedHeader(_)
                | AuthorizationError::InvalidSchemeName { .. }
                | AuthorizationError::UnsupportedScheme(_)
                | AuthorizationError::Validator(_)
        )
    }
}

impl From<AuthorizationError> for Status {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Missing => {
                Status::unauthenticated("request has no authorization credentials")
            }
            err if err.is_client_fault() => {
                Status::unauthenticated("authorization credentials are invalid")
            }
            other => Status::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("token expired")]
    struct Expired;

    #[test]
    fn test_invalid_option_does_not_nest() {
        let err = AuthorizationError::invalid_option(AuthorizationError::MissingValidator {
            scheme: "basic".to_string(),
        });
        let again = AuthorizationError::invalid_option(err);

        assert!(matches!(
            again.cause(),
            AuthorizationError::MissingValidator { .. }
        ));
    }

    #[test]
    fn test_validator_source_preserved() {
        let err = AuthorizationError::Validator(Arc::new(Expired));

        let source = std::error::Error::source(&err).expect("source should be set");
        assert_eq!(source.to_string(), "token expired");
        assert_eq!(
            err.to_string(),
            "authorization credentials are invalid: token expired"
        );
    }

    #[test]
    fn test_status_mapping() {
        let status: Status = AuthorizationError::Missing.into();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert_eq!(status.message(), "request has no authorization credentials");

        let status: Status = AuthorizationError::UnsupportedScheme("ghost".to_string()).into();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert_eq!(status.message(), "authorization credentials are invalid");

        let status: Status = AuthorizationError::Unchecked.into();
        assert_eq!(status.code(), tonic::Code::Internal);

        let status: Status = AuthorizationError::TypeMismatch {
            expected: "u32",
            actual: "alloc::string::String",
        }
        .into();
        assert_eq!(status.code(), tonic::Code::Internal);
    }
}
