use std::net::ToSocketAddrs;

use tiberius::Client;
use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::debug;

use super::config::{MssqlClient, MssqlConfig};
use crate::error::TsqlTemplateError;

/// Open a new SQL Server connection.
///
/// A single-shot operation: it resolves or fails exactly once, and there is
/// no internal retry. Callers that want retry or pooling layer it on top.
///
/// # Errors
/// Returns `TsqlTemplateError::ConnectionError` if address resolution, the
/// TCP connect, or the SQL Server handshake fails.
pub async fn connect(config: &MssqlConfig) -> Result<MssqlClient, TsqlTemplateError> {
    let port = config.resolved_port();

    // Resolve the socket address first so a bad hostname fails with a clear message
    let addr_iter = (config.server.as_str(), port).to_socket_addrs().map_err(|e| {
        TsqlTemplateError::ConnectionError(format!("Failed to resolve server address: {e}"))
    })?;

    let server_addr = addr_iter.into_iter().next().ok_or_else(|| {
        TsqlTemplateError::ConnectionError(format!("No valid address found for {}", config.server))
    })?;

    let tcp = TcpStream::connect(server_addr)
        .await
        .map_err(|e| TsqlTemplateError::ConnectionError(format!("TCP connection error: {e}")))?;

    // Make compatible with tiberius
    let tcp = tcp.compat_write();

    debug!(server = %config.server, port, database = %config.database, "connecting to SQL Server");

    Client::connect(config.to_tiberius(), tcp).await.map_err(|e| {
        TsqlTemplateError::ConnectionError(format!("SQL Server connection error: {e}"))
    })
}
