//! Request Correlation Identifiers for gRPC
//!
//! Carries a unique identifier for every call in the `request-id` metadata
//! entry, similar to the `X-Request-Id` header in HTTP.
//!
//! ## Components
//!
//! - **RequestIdLayer**: server-side tower layer that makes sure every call has
//!   a correlation id (reusing the caller's or generating a UUID v4) and echoes
//!   it in the response headers
//! - **RequestIdInterceptor** / **append_request_id**: client-side helpers that
//!   put an id on outgoing calls
//! - **current** / **from_metadata**: read the id back in handlers and other
//!   middleware (empty string when there is none)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use grpc_request_id::RequestIdLayer;
//! use tonic::transport::Server;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (_reporter, health) = tonic_health::server::health_reporter();
//! Server::builder()
//!     .layer(RequestIdLayer::new())
//!     .add_service(health)
//!     .serve("[::1]:50051".parse()?)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod server;

pub use client::{append_request_id, RequestIdInterceptor};
pub use server::{RequestIdLayer, RequestIdService};

use thiserror::Error;
use tonic::metadata::MetadataMap;
use tonic::Request;

/// Name of the metadata entry that holds the call's correlation identifier
pub const METADATA_KEY: &str = "request-id";

/// Errors from the request id helpers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestIdError {
    /// The id cannot be carried as ASCII metadata
    #[error("invalid request correlation identifier: {0}")]
    InvalidValue(String),
}

/// Correlation id of the call described by `metadata`, or an empty string.
///
/// Only the first value is considered when the entry is repeated.
pub fn from_metadata(metadata: &MetadataMap) -> String {
    metadata
        .get(METADATA_KEY)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default()
}

/// Same as [`from_metadata`], for tower layers working on raw HTTP headers
pub fn from_headers(headers: &http::HeaderMap) -> String {
    headers
        .get(METADATA_KEY)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default()
}

/// Correlation id of an incoming request, or an empty string
pub fn current<T>(request: &Request<T>) -> String {
    from_metadata(request.metadata())
}

/// Generate a fresh random correlation id
pub fn generate() -> String {
    uuid::Uuid::new_v4().to_string()
}
