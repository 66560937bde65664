//! Call Authorization for gRPC Services
//!
//! Authenticates each call from its `authorization` metadata, which carries
//! `<scheme> <credential>` (e.g. `bearer eyJhbGciOi...`). The scheme selects a
//! caller-supplied [`CredentialValidator`]; the value it returns (typically
//! the authenticated user) is attached to the call and read back by handlers
//! with its concrete type.
//!
//! The layer never rejects a call. Handlers decide by matching on the error
//! returned by [`AuthorizationExt::authorization`]:
//!
//! | Error | Meaning |
//! |---|---|
//! | `Unchecked` | No authorization layer ran (wiring bug) |
//! | `Missing` | The client sent no credentials |
//! | `MalformedHeader` | The value is not `<scheme> <credential>` |
//! | `InvalidSchemeName` | The scheme token is not a valid scheme name |
//! | `UnsupportedScheme` | No validator is registered for the scheme |
//! | `Validator` | The validator rejected the credential |
//! | `TypeMismatch` | The stored value has another type |
//!
//! ## Server
//!
//! ```rust,no_run
//! use grpc_authorization::{AuthValue, Authorization, AuthorizationLayer, BoxError};
//! use tonic::transport::Server;
//!
//! #[derive(Clone)]
//! struct User {
//!     name: String,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let auth = Authorization::builder()
//!     .with_scheme_fn("bearer", |_call, token| async move {
//!         if token == "s3cr3t" {
//!             Ok(AuthValue::new(User { name: "admin".into() }))
//!         } else {
//!             Err(BoxError::from("unknown token"))
//!         }
//!     })
//!     .build()?;
//!
//! let (_reporter, health) = tonic_health::server::health_reporter();
//! Server::builder()
//!     .layer(AuthorizationLayer::new(auth))
//!     .add_service(health)
//!     .serve("[::1]:50051".parse()?)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! In a handler, `request.authorization::<User>()?` yields the user or maps
//! the failure to `Unauthenticated` / `Internal`.
//!
//! ## Client
//!
//! [`append_credential`] sets the credential of one request and
//! [`CredentialInterceptor`] sets it on every call of a client.

mod authorization;
mod client;
mod codec;
mod config;
mod context;
mod error;
mod layer;
mod outcome;
mod scheme;
mod validator;

pub use authorization::{Authorization, AuthorizationBuilder};
pub use client::{append_credential, CredentialInterceptor};
pub use codec::{decode, encode, WireCredential};
pub use config::AuthorizationConfig;
pub use context::{attach, get, AuthorizationExt};
pub use error::{AuthorizationError, Result};
pub use layer::{AuthorizationLayer, AuthorizationService};
pub use outcome::Outcome;
pub use scheme::{validate_scheme, SchemeRegistry};
pub use validator::{validator_fn, AuthValue, BoxError, CallInfo, CredentialValidator, FnValidator};

/// Metadata key carrying the credential
pub const METADATA_KEY: &str = "authorization";
