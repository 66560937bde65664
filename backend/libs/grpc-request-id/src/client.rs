//! Client-side correlation id injection

use crate::{generate, RequestIdError, METADATA_KEY};
use tonic::metadata::AsciiMetadataValue;
use tonic::service::Interceptor;
use tonic::{Request, Status};

fn to_metadata_value(id: String) -> Result<AsciiMetadataValue, RequestIdError> {
    // HeaderValue accepts bytes >= 0x80, which `from_metadata` cannot read back
    if !id.bytes().all(|b| b == b'\t' || (0x20..0x7f).contains(&b)) {
        return Err(RequestIdError::InvalidValue(id));
    }
    AsciiMetadataValue::try_from(id.as_str()).map_err(|_| RequestIdError::InvalidValue(id))
}

/// Append a correlation id to an outgoing request.
///
/// Uses `id` when given, otherwise a random one. The value is appended to any
/// id already present.
pub fn append_request_id<T>(
    mut request: Request<T>,
    id: Option<&str>,
) -> Result<Request<T>, RequestIdError> {
    let id = id.map(str::to_string).unwrap_or_else(generate);
    let value = to_metadata_value(id)?;
    request.metadata_mut().append(METADATA_KEY, value);
    Ok(request)
}

/// Client interceptor that tags every outgoing call with a correlation id
///
/// With a fixed id, all calls made through the client share it (useful when
/// forwarding the id of the call being served). Without one, each call gets a
/// fresh UUID v4.
#[derive(Clone, Default)]
pub struct RequestIdInterceptor {
    fixed: Option<AsciiMetadataValue>,
}

impl RequestIdInterceptor {
    /// Generate a new id for every call
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the same id for every call
    pub fn with_id(id: impl Into<String>) -> Result<Self, RequestIdError> {
        Ok(Self {
            fixed: Some(to_metadata_value(id.into())?),
        })
    }
}

impl Interceptor for RequestIdInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let value = match &self.fixed {
            Some(value) => value.clone(),
            None => to_metadata_value(generate())
                .map_err(|e| Status::internal(e.to_string()))?,
        };
        request.metadata_mut().insert(METADATA_KEY, value);
        Ok(request)
    }
}
