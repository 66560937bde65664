//! Authorization instance: construction and the per-call validation engine

use crate::codec::decode;
use crate::context::AuthorizationExt;
use crate::error::{AuthorizationError, Result};
use crate::outcome::Outcome;
use crate::scheme::SchemeRegistry;
use crate::validator::{validator_fn, AuthValue, BoxError, CallInfo, CredentialValidator};
use crate::METADATA_KEY;
use futures::Stream;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Authenticates calls from their `authorization` metadata
///
/// Immutable once built and cheap to clone; every call shares the same
/// registry and all per-call state travels with the request.
#[derive(Clone, Debug)]
pub struct Authorization {
    registry: Arc<SchemeRegistry>,
}

impl Authorization {
    pub fn builder() -> AuthorizationBuilder {
        AuthorizationBuilder::new()
    }

    /// Registered scheme names, sorted
    pub fn schemes(&self) -> Vec<&str> {
        self.registry.schemes()
    }

    pub fn registry(&self) -> &SchemeRegistry {
        &self.registry
    }

    /// Validate the credentials of one call
    ///
    /// Never fails: every failure is classified into an [`Outcome`]. The
    /// validator is the only suspension point and runs without a timeout
    /// of its own.
    pub async fn evaluate(&self, call: &CallInfo) -> Outcome {
        let request_id = call.request_id();

        let value = match call.metadata().get_all(METADATA_KEY).iter().next() {
            Some(value) => value,
            None => {
                debug!(request_id = %request_id, "No authorization metadata on call");
                return Outcome::Missing;
            }
        };

        let value = match value.to_str() {
            Ok(value) => value,
            Err(_) => {
                warn!(request_id = %request_id, "Authorization metadata is not ASCII text");
                return Outcome::MalformedHeader(
                    "authorization metadata is not ASCII text".to_string(),
                );
            }
        };

        let wire = match decode(value) {
            Ok(wire) => wire,
            Err(e) => {
                warn!(
                    request_id = %request_id,
                    error = %e,
                    "Failed to decode authorization metadata"
                );
                return Outcome::from(e);
            }
        };

        let validator = match self.registry.get(&wire.scheme) {
            Some(validator) => validator,
            None => {
                warn!(
                    request_id = %request_id,
                    scheme = %wire.scheme,
                    "Unsupported authorization scheme"
                );
                return Outcome::UnsupportedScheme(wire.scheme);
            }
        };

        let outcome = match validator.validate(call, &wire.credential).await {
            Ok(value) => Outcome::Success(value),
            Err(e) => classify_validator_error(e),
        };

        debug!(
            request_id = %request_id,
            scheme = %wire.scheme,
            outcome = outcome.label(),
            "Authorization evaluated"
        );
        outcome
    }

    /// Evaluate a handler-side request and attach the outcome to it
    pub async fn authorize<T>(&self, request: tonic::Request<T>) -> tonic::Request<T> {
        let call = CallInfo::from_request(&request);
        let outcome = self.evaluate(&call).await;
        request.with_authorization_outcome(outcome)
    }

    /// Wrap a unary handler
    ///
    /// The handler always runs; it decides whether to reject the call by
    /// reading the outcome back. Its result is returned unchanged.
    pub async fn unary<T, F, Fut>(&self, request: tonic::Request<T>, handler: F) -> Fut::Output
    where
        F: FnOnce(tonic::Request<T>) -> Fut,
        Fut: Future,
    {
        let request = self.authorize(request).await;
        handler(request).await
    }

    /// Wrap a streaming handler
    ///
    /// Validation happens once when the stream is established. The inbound
    /// stream stays inside the request, so every message the handler reads
    /// is observed under that single outcome.
    pub async fn streaming<S, F, Fut>(&self, request: tonic::Request<S>, handler: F) -> Fut::Output
    where
        S: Stream,
        F: FnOnce(tonic::Request<S>) -> Fut,
        Fut: Future,
    {
        self.unary(request, handler).await
    }
}

fn classify_validator_error(err: BoxError) -> Outcome {
    match err.downcast::<AuthorizationError>() {
        Ok(err) => Outcome::from(*err),
        Err(other) => Outcome::ValidatorError(Arc::from(other)),
    }
}

/// Builder for [`Authorization`]
///
/// Options apply in call order. The first failing option is kept and every
/// later option is ignored; `build` then reports it.
#[derive(Default)]
pub struct AuthorizationBuilder {
    registry: SchemeRegistry,
    error: Option<AuthorizationError>,
}

impl AuthorizationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `validator` for `scheme`, replacing any earlier one
    pub fn with_scheme<V>(self, scheme: &str, validator: V) -> Self
    where
        V: CredentialValidator + 'static,
    {
        self.with_shared_scheme(scheme, Arc::new(validator))
    }

    pub fn with_shared_scheme(
        mut self,
        scheme: &str,
        validator: Arc<dyn CredentialValidator>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }

        if let Err(e) = self.registry.register(scheme, validator) {
            self.error = Some(AuthorizationError::invalid_option(e));
        }
        self
    }

    /// Register an async closure for `scheme`, see [`validator_fn`]
    pub fn with_scheme_fn<F, Fut>(self, scheme: &str, f: F) -> Self
    where
        F: Fn(CallInfo, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<AuthValue, BoxError>> + Send + 'static,
    {
        self.with_scheme(scheme, validator_fn(f))
    }

    pub(crate) fn fail(mut self, err: AuthorizationError) -> Self {
        if self.error.is_none() {
            self.error = Some(AuthorizationError::invalid_option(err));
        }
        self
    }

    pub fn build(self) -> Result<Authorization> {
        if let Some(e) = self.error {
            return Err(e);
        }

        debug!(schemes = ?self.registry.schemes(), "Authorization configured");
        Ok(Authorization {
            registry: Arc::new(self.registry),
        })
    }
}
