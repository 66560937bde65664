//! Structured Call Logging for gRPC Services
//!
//! Opens a `tracing` span for every call and records a configurable set of
//! call attributes on it, so every event a handler logs while serving the call
//! carries them.
//!
//! ## Fields
//!
//! | Field | Value |
//! |---|---|
//! | `server_name` | Fixed name given at construction |
//! | `server_type` | gRPC service name (`pkg.Service`) |
//! | `remote_addr` | Peer socket address (see `grpc-remote-addr`) |
//! | `method` | Full method path (`/pkg.Service/Method`) |
//! | `request_id` | Correlation id (see `grpc-request-id`), when present |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use grpc_call_logging::{CallLogger, CallLoggingLayer, Field};
//! use tonic::transport::Server;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let logger = CallLogger::builder()
//!     .with_server_name("content-service")
//!     .with_fields([Field::ServerName, Field::Method, Field::RequestId])
//!     .build()?;
//!
//! let (_reporter, health) = tonic_health::server::health_reporter();
//! Server::builder()
//!     .layer(CallLoggingLayer::new(logger))
//!     .add_service(health)
//!     .serve("[::1]:50051".parse()?)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! In handlers, `request.call_span_or_none()` returns the call's span for
//! work spawned off the call's task.

mod config;
mod error;
mod layer;
mod logger;

pub use config::CallLoggingConfig;
pub use error::{CallLoggingError, Result};
pub use layer::{CallLoggingLayer, CallLoggingService, CallSpan, CallSpanExt};
pub use logger::{CallLogger, CallLoggerBuilder, Field};
