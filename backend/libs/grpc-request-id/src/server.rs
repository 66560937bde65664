//! Server-side correlation id layer

use crate::{generate, METADATA_KEY};
use futures::future::BoxFuture;
use http::HeaderValue;
use std::task::{Context, Poll};
use tonic::body::BoxBody;
use tonic::Status;
use tower::{Layer, Service};
use tracing::{debug, error};

/// Tower layer that ensures every call carries a correlation id
///
/// For each incoming call:
/// 1. Reuses the first non-empty `request-id` value sent by the caller, or
///    generates a UUID v4
/// 2. Stores it as the only `request-id` value of the request, so handlers
///    and later layers read it from metadata
/// 3. Sets it in the response headers
///
/// The layer works on the HTTP/2 request, so a streaming call gets a single
/// id for its whole lifetime.
#[derive(Clone, Copy, Default)]
pub struct RequestIdLayer;

impl RequestIdLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RequestIdService { inner: service }
    }
}

#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

fn incoming_id(headers: &http::HeaderMap) -> Option<HeaderValue> {
    headers
        .get(METADATA_KEY)
        .filter(|value| !value.is_empty())
        .cloned()
}

impl<S, B> Service<http::Request<B>> for RequestIdService<S>
where
    S: Service<http::Request<B>, Response = http::Response<BoxBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: http::Request<B>) -> Self::Future {
        // Keep the service that was driven to readiness
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let id = match incoming_id(request.headers()) {
            Some(id) => id,
            None => {
                let generated = generate();
                match HeaderValue::try_from(generated) {
                    Ok(id) => id,
                    Err(e) => {
                        error!("Failed to encode generated request id: {}", e);
                        let status =
                            Status::internal("failed setting request correlation identifier");
                        return Box::pin(async move { Ok(status.into_http()) });
                    }
                }
            }
        };

        debug!(request_id = ?id, "Request correlation id set");
        request.headers_mut().insert(METADATA_KEY, id.clone());

        Box::pin(async move {
            let mut response = inner.call(request).await?;
            response.headers_mut().insert(METADATA_KEY, id);
            Ok(response)
        })
    }
}
