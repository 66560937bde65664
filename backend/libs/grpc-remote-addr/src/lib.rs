//! Peer Address Lookup for gRPC Calls
//!
//! Returns the remote address of the client calling a method, for both unary
//! and streaming calls. The address comes from the connection info tonic's
//! transport attaches to every request, so it is available to handlers
//! (`tonic::Request<T>`) as well as to tower layers (`http::Request<B>`).
//!
//! ```rust
//! use grpc_remote_addr::{RemoteAddrError, RemoteAddrExt};
//! use tonic::{Request, Status};
//!
//! fn caller<T>(request: &Request<T>) -> Result<String, Status> {
//!     match request.peer_ip() {
//!         Ok(ip) => Ok(ip.to_string()),
//!         Err(RemoteAddrError::NotAvailable(_)) => Ok("unknown".to_string()),
//!     }
//! }
//! ```

use std::net::{IpAddr, SocketAddr};
use thiserror::Error;
use tonic::transport::server::{TcpConnectInfo, TlsConnectInfo};

/// Errors returned when looking up the peer address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteAddrError {
    /// The transport did not record a remote address for this call
    #[error("remote address is not available: {0}")]
    NotAvailable(&'static str),
}

pub type Result<T> = std::result::Result<T, RemoteAddrError>;

/// Read the remote address from a request's extensions.
///
/// Looks for plain TCP connection info first, then for TCP info wrapped in
/// TLS connection info.
pub fn from_extensions(extensions: &http::Extensions) -> Result<SocketAddr> {
    let info = extensions
        .get::<TcpConnectInfo>()
        .or_else(|| {
            extensions
                .get::<TlsConnectInfo<TcpConnectInfo>>()
                .map(|tls| tls.get_ref())
        })
        .ok_or(RemoteAddrError::NotAvailable("no peer infos"))?;

    info.remote_addr()
        .ok_or(RemoteAddrError::NotAvailable("no remote address"))
}

/// Extension trait for reading the peer address of a call
pub trait RemoteAddrExt {
    /// Remote socket address of the client
    fn peer_addr(&self) -> Result<SocketAddr>;

    /// Remote IP of the client
    fn peer_ip(&self) -> Result<IpAddr> {
        self.peer_addr().map(|addr| addr.ip())
    }
}

impl<T> RemoteAddrExt for tonic::Request<T> {
    fn peer_addr(&self) -> Result<SocketAddr> {
        self.remote_addr()
            .ok_or(RemoteAddrError::NotAvailable("no peer infos"))
    }
}

impl<B> RemoteAddrExt for http::Request<B> {
    fn peer_addr(&self) -> Result<SocketAddr> {
        from_extensions(self.extensions())
    }
}
