//! Channel setup.
//!
//! Opens the single gRPC channel (HTTP/2, optionally over TLS) every call of
//! a [`GrpcMiddlewareGateway`](super::gateway::GrpcMiddlewareGateway) runs
//! over. One attempt, bounded by the connect timeout; retrying is the
//! caller's business.

use super::error::{MiddlewareError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tracing::{debug, info};

/// Default middleware address.
pub const DEFAULT_ADDRESS: &str = "localhost:5006";

/// How the channel is secured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SecurityMode {
    /// Plain HTTP/2.
    #[default]
    Insecure,
    /// TLS verified against the PEM CA bundle at `ca_path`.
    ///
    /// `server_name` defaults to the host part of the address.
    Tls {
        ca_path: PathBuf,
        server_name: Option<String>,
    },
}

/// Where and how to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub address: String,
    pub security: SecurityMode,
    pub connect_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            security: SecurityMode::Insecure,
            connect_timeout: sb_domain::DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl SessionOptions {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_security(mut self, security: SecurityMode) -> Self {
        self.security = security;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Channel URI. A bare `host:port` gets `http://`, or `https://` under TLS.
    pub fn uri(&self) -> String {
        if self.address.starts_with("http://") || self.address.starts_with("https://") {
            return self.address.clone();
        }
        match self.security {
            SecurityMode::Insecure => format!("http://{}", self.address),
            SecurityMode::Tls { .. } => format!("https://{}", self.address),
        }
    }

    /// Host part of `address` (`host:port`, `[v6]:port` or bare host).
    pub fn host(&self) -> &str {
        let address = self
            .address
            .split_once("://")
            .map_or(self.address.as_str(), |(_, rest)| rest);
        let address = address.trim_end_matches('/');
        if let Some(rest) = address.strip_prefix('[')
            && let Some(end) = rest.find(']')
        {
            return &rest[..end];
        }
        match address.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') && port.parse::<u16>().is_ok() => host,
            _ => address,
        }
    }

    /// Endpoint configured for this session, not yet connected.
    pub fn endpoint(&self) -> Result<Endpoint> {
        let uri = self.uri();
        let mut endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| MiddlewareError::InvalidAddress {
                address: uri,
                message: describe(&e),
            })?
            .connect_timeout(self.connect_timeout)
            .tcp_nodelay(true);

        if let SecurityMode::Tls {
            ca_path,
            server_name,
        } = &self.security
        {
            let domain = server_name
                .clone()
                .unwrap_or_else(|| self.host().to_string());
            endpoint = endpoint
                .tls_config(tls_config(ca_path, domain)?)
                .map_err(|e| MiddlewareError::TlsError(describe(&e)))?;
        }
        Ok(endpoint)
    }
}

/// Connect to the middleware.
pub async fn open(options: &SessionOptions) -> Result<Channel> {
    debug!(
        "Connecting to middleware at {} ({:?})",
        options.uri(),
        options.security
    );
    let endpoint = options.endpoint()?;

    match tokio::time::timeout(options.connect_timeout, endpoint.connect()).await {
        Ok(Ok(channel)) => {
            info!("Connected to middleware at {}", options.uri());
            Ok(channel)
        }
        Ok(Err(e)) => Err(MiddlewareError::ConnectError {
            address: options.address.clone(),
            message: describe(&e),
        }),
        Err(_) => Err(MiddlewareError::ConnectError {
            address: options.address.clone(),
            message: format!(
                "no answer within {}ms",
                options.connect_timeout.as_millis()
            ),
        }),
    }
}

/// TLS settings trusting only the certificates in `ca_path`.
fn tls_config(ca_path: &Path, domain: String) -> Result<ClientTlsConfig> {
    let pem = std::fs::read(ca_path).map_err(|e| {
        MiddlewareError::TlsError(format!("cannot read CA bundle {}: {}", ca_path.display(), e))
    })?;

    let mut reader = pem.as_slice();
    let mut count = 0;
    for cert in rustls_pemfile::certs(&mut reader) {
        cert.map_err(|e| MiddlewareError::TlsError(e.to_string()))?;
        count += 1;
    }
    if count == 0 {
        return Err(MiddlewareError::TlsError(format!(
            "no certificates found in {}",
            ca_path.display()
        )));
    }

    Ok(ClientTlsConfig::new()
        .ca_certificate(Certificate::from_pem(pem))
        .domain_name(domain))
}

/// Error text including its causes; tonic's transport errors say little on their own.
fn describe(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
