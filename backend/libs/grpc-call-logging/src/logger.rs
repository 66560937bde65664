//! Call logger: field selection and span construction

use crate::error::{CallLoggingError, Result};
use grpc_remote_addr::RemoteAddrExt;
use serde::Deserialize;
use tracing::field::Empty;
use tracing::{info_span, Span};

/// Call attributes that can be recorded on the call span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ServerName,
    ServerType,
    RemoteAddr,
    Method,
    RequestId,
}

impl Field {
    /// Name of the field on the span
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::ServerName => "server_name",
            Field::ServerType => "server_type",
            Field::RemoteAddr => "remote_addr",
            Field::Method => "method",
            Field::RequestId => "request_id",
        }
    }
}

/// Opens a span per call with the configured fields
///
/// Immutable after construction; clone it into as many layers as needed.
#[derive(Debug, Clone, Default)]
pub struct CallLogger {
    fields: Vec<Field>,
    server_name: Option<String>,
}

/// Builder for [`CallLogger`]
///
/// Options are applied in order and the first invalid one is reported by
/// [`CallLoggerBuilder::build`].
#[derive(Debug, Default)]
pub struct CallLoggerBuilder {
    logger: CallLogger,
    error: Option<CallLoggingError>,
}

impl CallLoggerBuilder {
    /// Add fields to record. Duplicates are ignored.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        for field in fields {
            if !self.logger.fields.contains(&field) {
                self.logger.fields.push(field);
            }
        }
        self
    }

    /// Set the value of the `server_name` field
    pub fn with_server_name(mut self, server_name: impl Into<String>) -> Self {
        let server_name = server_name.into();
        if server_name.is_empty() {
            self.error.get_or_insert(CallLoggingError::InvalidOptionValue(
                "server name cannot be empty".to_string(),
            ));
        } else {
            self.logger.server_name = Some(server_name);
        }
        self
    }

    pub fn build(self) -> Result<CallLogger> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.logger),
        }
    }
}

/// gRPC service name from a method path: `/pkg.Service/Method` -> `pkg.Service`
fn service_name(path: &str) -> Option<&str> {
    let (service, _method) = path.strip_prefix('/')?.split_once('/')?;
    (!service.is_empty()).then_some(service)
}

impl CallLogger {
    pub fn builder() -> CallLoggerBuilder {
        CallLoggerBuilder::default()
    }

    /// Configured fields, in configuration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Values of the configured fields for `request`.
    ///
    /// Fields with nothing to record (no server name configured, no request
    /// id sent, path without a service) are skipped. A missing peer address
    /// is an error when `remote_addr` is configured.
    pub fn field_values<B>(&self, request: &http::Request<B>) -> Result<Vec<(Field, String)>> {
        let mut values = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            let value = match field {
                Field::ServerName => self.server_name.clone(),
                Field::ServerType => service_name(request.uri().path()).map(str::to_string),
                Field::RemoteAddr => {
                    let addr = request.peer_addr().map_err(|e| {
                        CallLoggingError::FieldUnavailable {
                            field: Field::RemoteAddr.as_str(),
                            reason: e.to_string(),
                        }
                    })?;
                    Some(addr.to_string())
                }
                Field::Method => Some(request.uri().path().to_string()),
                Field::RequestId => {
                    Some(grpc_request_id::from_headers(request.headers()))
                        .filter(|id| !id.is_empty())
                }
            };

            if let Some(value) = value {
                values.push((*field, value));
            }
        }

        Ok(values)
    }

    /// Open the span for a call
    pub fn span_for<B>(&self, request: &http::Request<B>) -> Result<Span> {
        let values = self.field_values(request)?;

        let span = info_span!(
            "grpc_call",
            server_name = Empty,
            server_type = Empty,
            remote_addr = Empty,
            method = Empty,
            request_id = Empty,
        );
        for (field, value) in &values {
            span.record(field.as_str(), value.as_str());
        }

        Ok(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::transport::server::TcpConnectInfo;

    fn request(path: &str) -> http::Request<()> {
        http::Request::builder().uri(path).body(()).unwrap()
    }

    #[test]
    fn test_service_name() {
        assert_eq!(
            service_name("/nova.content.v1.ContentService/GetPost"),
            Some("nova.content.v1.ContentService")
        );
        assert_eq!(service_name("/"), None);
        assert_eq!(service_name("no-slash"), None);
    }

    #[test]
    fn test_builder_rejects_empty_server_name() {
        let result = CallLogger::builder().with_server_name("").build();
        assert!(matches!(result, Err(CallLoggingError::InvalidOptionValue(_))));
    }

    #[test]
    fn test_builder_deduplicates_fields() {
        let logger = CallLogger::builder()
            .with_fields([Field::Method, Field::RequestId])
            .with_fields([Field::Method])
            .build()
            .unwrap();

        assert_eq!(logger.fields(), &[Field::Method, Field::RequestId]);
    }

    #[test]
    fn test_field_values_selection() {
        let logger = CallLogger::builder()
            .with_server_name("content-service")
            .with_fields([Field::Method, Field::ServerType])
            .build()
            .unwrap();

        let values = logger.field_values(&request("/pkg.Svc/Call")).unwrap();
        assert_eq!(
            values,
            vec![
                (Field::Method, "/pkg.Svc/Call".to_string()),
                (Field::ServerType, "pkg.Svc".to_string()),
            ]
        );
    }

    #[test]
    fn test_server_name_only_when_requested() {
        let logger = CallLogger::builder()
            .with_server_name("content-service")
            .with_fields([Field::ServerName])
            .build()
            .unwrap();

        let values = logger.field_values(&request("/pkg.Svc/Call")).unwrap();
        assert_eq!(values, vec![(Field::ServerName, "content-service".to_string())]);
    }

    #[test]
    fn test_request_id_skipped_when_absent() {
        let logger = CallLogger::builder()
            .with_fields([Field::RequestId])
            .build()
            .unwrap();

        assert!(logger.field_values(&request("/pkg.Svc/Call")).unwrap().is_empty());

        let mut with_id = request("/pkg.Svc/Call");
        with_id
            .headers_mut()
            .insert(grpc_request_id::METADATA_KEY, "rid-1".parse().unwrap());
        assert_eq!(
            logger.field_values(&with_id).unwrap(),
            vec![(Field::RequestId, "rid-1".to_string())]
        );
    }

    #[test]
    fn test_remote_addr_required() {
        let logger = CallLogger::builder()
            .with_fields([Field::RemoteAddr])
            .build()
            .unwrap();

        let err = logger.field_values(&request("/pkg.Svc/Call")).unwrap_err();
        assert!(matches!(
            err,
            CallLoggingError::FieldUnavailable { field: "remote_addr", .. }
        ));

        let mut connected = request("/pkg.Svc/Call");
        connected.extensions_mut().insert(TcpConnectInfo {
            local_addr: None,
            remote_addr: Some("192.168.0.7:4000".parse().unwrap()),
        });
        assert_eq!(
            logger.field_values(&connected).unwrap(),
            vec![(Field::RemoteAddr, "192.168.0.7:4000".to_string())]
        );
    }
}
