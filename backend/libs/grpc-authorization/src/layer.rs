//! Tower layer running the validation engine for every call

use crate::authorization::Authorization;
use crate::context::AuthorizationExt;
use crate::validator::CallInfo;
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Server layer that validates credentials once per call
///
/// Works on the HTTP/2 request, so a unary call and a whole stream are each
/// evaluated exactly once, before the handler sees the first message. The
/// call is never rejected here; the outcome is attached to the request and
/// handlers decide through [`AuthorizationExt`].
///
/// ```rust,no_run
/// # use grpc_authorization::{Authorization, AuthorizationLayer};
/// # async fn run(auth: Authorization) -> Result<(), Box<dyn std::error::Error>> {
/// let (_, health) = tonic_health::server::health_reporter();
///
/// tonic::transport::Server::builder()
///     .layer(AuthorizationLayer::new(auth))
///     .add_service(health)
///     .serve("[::1]:50051".parse()?)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthorizationLayer {
    authorization: Authorization,
}

impl AuthorizationLayer {
    pub fn new(authorization: Authorization) -> Self {
        Self { authorization }
    }
}

impl<S> Layer<S> for AuthorizationLayer {
    type Service = AuthorizationService<S>;

    fn layer(&self, service: S) -> Self::Service {
        AuthorizationService {
            inner: service,
            authorization: self.authorization.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthorizationService<S> {
    inner: S,
    authorization: Authorization,
}

impl<S, B> Service<http::Request<B>> for AuthorizationService<S>
where
    S: Service<http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: http::Request<B>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let authorization = self.authorization.clone();

        // Snapshot taken here so the body is not borrowed across the validator
        let call = CallInfo::from_http_request(&request);

        Box::pin(async move {
            let outcome = authorization.evaluate(&call).await;
            inner.call(request.with_authorization_outcome(outcome)).await
        })
    }
}
