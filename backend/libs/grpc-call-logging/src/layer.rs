//! Tower layer that opens the call span

use crate::error::{CallLoggingError, Result};
use crate::logger::CallLogger;
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use tonic::body::BoxBody;
use tonic::Status;
use tower::{Layer, Service};
use tracing::{error, Instrument, Span};

/// Span of the call being served, stored in request extensions
#[derive(Debug, Clone)]
pub struct CallSpan(pub Span);

/// Server layer that runs every call inside its [`CallLogger`] span
///
/// If a configured field cannot be computed (no peer address when
/// `remote_addr` is requested) the call is rejected with `Status::internal`.
#[derive(Clone)]
pub struct CallLoggingLayer {
    logger: CallLogger,
}

impl CallLoggingLayer {
    pub fn new(logger: CallLogger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for CallLoggingLayer {
    type Service = CallLoggingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        CallLoggingService {
            inner: service,
            logger: self.logger.clone(),
        }
    }
}

#[derive(Clone)]
pub struct CallLoggingService<S> {
    inner: S,
    logger: CallLogger,
}

impl<S, B> Service<http::Request<B>> for CallLoggingService<S>
where
    S: Service<http::Request<B>, Response = http::Response<BoxBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: http::Request<B>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let span = match self.logger.span_for(&request) {
            Ok(span) => span,
            Err(e) => {
                error!(method = %request.uri().path(), "Failed to build call span: {}", e);
                let status = Status::internal("failed setting request logger");
                return Box::pin(async move { Ok(status.into_http()) });
            }
        };

        request.extensions_mut().insert(CallSpan(span.clone()));
        Box::pin(async move { inner.call(request).await }.instrument(span))
    }
}

/// Access to the call span from handlers and later layers
pub trait CallSpanExt {
    /// The call span, or `NoSpanInContext` when the layer is not installed
    fn call_span(&self) -> Result<&Span>;

    /// The call span, or a disabled span when the layer is not installed
    fn call_span_or_none(&self) -> Span {
        self.call_span().cloned().unwrap_or_else(|_| Span::none())
    }
}

impl<T> CallSpanExt for tonic::Request<T> {
    fn call_span(&self) -> Result<&Span> {
        self.extensions()
            .get::<CallSpan>()
            .map(|CallSpan(span)| span)
            .ok_or(CallLoggingError::NoSpanInContext)
    }
}

impl<B> CallSpanExt for http::Request<B> {
    fn call_span(&self) -> Result<&Span> {
        self.extensions()
            .get::<CallSpan>()
            .map(|CallSpan(span)| span)
            .ok_or(CallLoggingError::NoSpanInContext)
    }
}
