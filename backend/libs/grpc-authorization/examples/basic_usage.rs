//! Basic usage example of grpc-authorization
//!
//! Serves the standard health service behind the correlation id, call logging
//! and authorization layers. A single `bearer` scheme accepts the token from
//! `EXAMPLE_TOKEN`.
//!
//! To run this example:
//! ```bash
//! AUTHORIZATION_SCHEMES=bearer EXAMPLE_TOKEN=s3cr3t RUST_LOG=debug \
//!     cargo run --example basic_usage
//!
//! # In another terminal
//! grpcurl -plaintext -H 'authorization: bearer s3cr3t' \
//!     localhost:50051 grpc.health.v1.Health/Check
//! ```

use grpc_authorization::{
    validator_fn, AuthValue, Authorization, AuthorizationConfig, AuthorizationLayer, BoxError,
    CredentialValidator,
};
use grpc_call_logging::{CallLogger, CallLoggingLayer, Field};
use grpc_request_id::RequestIdLayer;
use std::collections::HashMap;
use std::sync::Arc;
use tonic::transport::Server;
use tower::ServiceBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
struct Operator {
    name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,grpc_authorization=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let token = std::env::var("EXAMPLE_TOKEN").unwrap_or_else(|_| "s3cr3t".to_string());
    let grpc_port = std::env::var("GRPC_PORT")
        .unwrap_or_else(|_| "50051".to_string())
        .parse::<u16>()?;

    let bearer: Arc<dyn CredentialValidator> =
        Arc::new(validator_fn(move |call, credential| {
            let token = token.clone();
            async move {
                if credential == token {
                    tracing::info!(request_id = %call.request_id(), "Operator authenticated");
                    Ok(AuthValue::new(Operator {
                        name: "operator".to_string(),
                    }))
                } else {
                    Err(BoxError::from("unknown bearer token"))
                }
            }
        }));

    let mut validators = HashMap::new();
    validators.insert("bearer".to_string(), bearer);

    let mut config = AuthorizationConfig::from_env()?;
    if config.schemes.is_empty() {
        config.schemes.push("bearer".to_string());
    }
    let authorization = Authorization::from_config(&config, &validators)?;
    tracing::info!(schemes = ?authorization.schemes(), "Authorization ready");

    let logger = CallLogger::builder()
        .with_server_name("authorization-example")
        .with_fields([
            Field::ServerName,
            Field::ServerType,
            Field::Method,
            Field::RequestId,
        ])
        .build()?;

    let (_reporter, health_service) = tonic_health::server::health_reporter();

    let addr = format!("0.0.0.0:{}", grpc_port).parse()?;
    tracing::info!("Starting gRPC server on {}", addr);

    let layers = ServiceBuilder::new()
        .layer(RequestIdLayer::new())
        .layer(CallLoggingLayer::new(logger))
        .layer(AuthorizationLayer::new(authorization));

    Server::builder()
        .layer(layers)
        .add_service(health_service)
        .serve(addr)
        .await?;

    Ok(())
}
