//! Outgoing credentials for client calls

use crate::codec::encode;
use crate::error::{AuthorizationError, Result};
use crate::METADATA_KEY;
use tonic::metadata::AsciiMetadataValue;
use tonic::service::Interceptor;
use tonic::{Request, Status};

/// Visible ASCII, space and tab: the bytes a server can read back as text.
/// `AsciiMetadataValue` itself also admits bytes >= 0x80.
fn is_metadata_text(wire: &str) -> bool {
    wire.bytes().all(|b| b == b'\t' || (0x20..0x7f).contains(&b))
}

fn to_metadata_value(wire: String) -> Result<AsciiMetadataValue> {
    if !is_metadata_text(&wire) {
        return Err(AuthorizationError::InvalidMetadataValue(wire));
    }
    AsciiMetadataValue::try_from(wire.as_str())
        .map_err(|_| AuthorizationError::InvalidMetadataValue(wire))
}

/// Set the credential sent with an outgoing request
///
/// The encoded value replaces any `authorization` value already present, so
/// a request carries credentials for exactly one scheme.
///
/// ## Errors
///
/// - `InvalidSchemeName` if `scheme` violates the naming rule
/// - `InvalidMetadataValue` if the encoded value is not visible ASCII
pub fn append_credential<T>(
    mut request: Request<T>,
    scheme: &str,
    credential: &str,
) -> Result<Request<T>> {
    let value = to_metadata_value(encode(scheme, credential)?)?;
    request.metadata_mut().insert(METADATA_KEY, value);
    Ok(request)
}

/// Client interceptor sending the same credential with every call
///
/// ```rust,no_run
/// # use grpc_authorization::CredentialInterceptor;
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let channel = tonic::transport::Endpoint::from_static("http://[::1]:50051")
///     .connect()
///     .await?;
/// let interceptor = CredentialInterceptor::new("bearer", "s3cr3t")?;
/// let _client = tonic_health::pb::health_client::HealthClient::with_interceptor(
///     channel,
///     interceptor,
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CredentialInterceptor {
    value: AsciiMetadataValue,
}

impl CredentialInterceptor {
    pub fn new(scheme: &str, credential: &str) -> Result<Self> {
        Ok(Self {
            value: to_metadata_value(encode(scheme, credential)?)?,
        })
    }
}

impl std::fmt::Debug for CredentialInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialInterceptor").finish_non_exhaustive()
    }
}

impl Interceptor for CredentialInterceptor {
    fn call(&mut self, mut request: Request<()>) -> std::result::Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert(METADATA_KEY, self.value.clone());
        Ok(request)
    }
}
