//! Credential validator contract
//!
//! A validator turns the credential string of one scheme into an
//! application-defined value (typically the authenticated user) or an error.
//! Validators may perform I/O; they are awaited on the call's own task with
//! no timeout of their own.

use async_trait::async_trait;
use std::any::{type_name, Any};
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tonic::metadata::MetadataMap;

/// Error type returned by validators
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Snapshot of the call a credential was presented on
#[derive(Debug, Clone, Default)]
pub struct CallInfo {
    metadata: MetadataMap,
    remote_addr: Option<SocketAddr>,
    method: Option<String>,
}

impl CallInfo {
    pub fn new(metadata: MetadataMap) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }

    pub fn with_remote_addr(mut self, remote_addr: Option<SocketAddr>) -> Self {
        self.remote_addr = remote_addr;
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Snapshot of a handler-side request
    pub fn from_request<T>(request: &tonic::Request<T>) -> Self {
        Self::new(request.metadata().clone()).with_remote_addr(request.remote_addr())
    }

    /// Snapshot of a request inside a tower layer
    pub fn from_http_request<B>(request: &http::Request<B>) -> Self {
        use grpc_remote_addr::RemoteAddrExt;

        Self::new(MetadataMap::from_headers(request.headers().clone()))
            .with_remote_addr(request.peer_addr().ok())
            .with_method(request.uri().path())
    }

    /// Inbound metadata of the call
    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    /// Peer address, when the transport recorded one
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Full gRPC method path (`/pkg.Service/Method`), when known
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Correlation id of the call, empty if none
    pub fn request_id(&self) -> String {
        grpc_request_id::from_metadata(&self.metadata)
    }
}

/// Value produced by a successful validation
///
/// Opaque to the authorization layer; handlers read it back with a concrete
/// type through [`AuthorizationExt`](crate::AuthorizationExt). The type name
/// is kept so a mismatch can report what was actually stored.
#[derive(Clone)]
pub struct AuthValue {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl AuthValue {
    pub fn new<V: Any + Send + Sync>(value: V) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<V>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<V: Any>(&self) -> bool {
        self.value.is::<V>()
    }

    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.value.downcast_ref::<V>()
    }
}

impl fmt::Debug for AuthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Validates the credential of one authorization scheme
///
/// Returning an `AuthorizationError` of kind `Missing`, `MalformedHeader`,
/// `InvalidSchemeName` or `UnsupportedScheme` (boxed) keeps that
/// classification; any other error is reported to handlers as
/// `AuthorizationError::Validator`.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, call: &CallInfo, credential: &str) -> Result<AuthValue, BoxError>;
}

/// Validator backed by an async closure, see [`validator_fn`]
#[derive(Clone)]
pub struct FnValidator<F> {
    f: F,
}

/// Build a validator from an async closure
///
/// ```rust
/// use grpc_authorization::{validator_fn, AuthValue, BoxError};
///
/// let validator = validator_fn(|_call, credential| async move {
///     if credential == "letmein" {
///         Ok(AuthValue::new("admin".to_string()))
///     } else {
///         Err(BoxError::from("unknown api key"))
///     }
/// });
/// # let _ = validator;
/// ```
pub fn validator_fn<F, Fut>(f: F) -> FnValidator<F>
where
    F: Fn(CallInfo, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<AuthValue, BoxError>> + Send + 'static,
{
    FnValidator { f }
}

#[async_trait]
impl<F, Fut> CredentialValidator for FnValidator<F>
where
    F: Fn(CallInfo, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<AuthValue, BoxError>> + Send + 'static,
{
    async fn validate(&self, call: &CallInfo, credential: &str) -> Result<AuthValue, BoxError> {
        (self.f)(call.clone(), credential.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct User {
        id: u64,
    }

    #[test]
    fn test_auth_value_downcast() {
        let value = AuthValue::new(User { id: 7 });

        assert!(value.is::<User>());
        assert_eq!(value.downcast_ref::<User>(), Some(&User { id: 7 }));
        assert!(value.downcast_ref::<String>().is_none());
        assert!(value.type_name().ends_with("User"));
    }

    #[test]
    fn test_call_info_from_request() {
        let mut request = tonic::Request::new(());
        request
            .metadata_mut()
            .insert(grpc_request_id::METADATA_KEY, "rid-9".parse().unwrap());

        let call = CallInfo::from_request(&request);
        assert_eq!(call.request_id(), "rid-9");
        assert!(call.remote_addr().is_none());
        assert!(call.method().is_none());
    }

    #[test]
    fn test_call_info_from_http_request() {
        let request = http::Request::builder()
            .uri("/pkg.Svc/Call")
            .header("authorization", "foo bar")
            .body(())
            .unwrap();

        let call = CallInfo::from_http_request(&request);
        assert_eq!(call.method(), Some("/pkg.Svc/Call"));
        assert_eq!(
            call.metadata().get("authorization").unwrap().to_str().unwrap(),
            "foo bar"
        );
    }

    #[tokio::test]
    async fn test_validator_fn() {
        let validator = validator_fn(|_call, credential| async move {
            if credential == "bar" {
                Ok(AuthValue::new(User { id: 1 }))
            } else {
                Err(BoxError::from("boo"))
            }
        });
        let call = CallInfo::default();

        let ok = validator.validate(&call, "bar").await.unwrap();
        assert_eq!(ok.downcast_ref::<User>(), Some(&User { id: 1 }));

        let err = validator.validate(&call, "baz").await.unwrap_err();
        assert_eq!(err.to_string(), "boo");
    }
}
