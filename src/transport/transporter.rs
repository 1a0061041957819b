//! Transport seam consumed by higher-level clients.
//!
//! A command-per-method client only needs `connect`, `send` and the session
//! id. Coding it against [`Transport`] lets it run over [`TcpTransport`] in
//! production and a scripted fake in tests.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Value;
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::SessionId;
use crate::protocol::Response;

use super::connection::Connection;
use super::options::ConnectionOptions;

// ============================================================================
// Transport
// ============================================================================

/// Command transport to a Marionette server.
#[async_trait]
pub trait Transport: Send {
    /// Opens the connection and completes the handshake.
    async fn connect(&mut self, host: &str, port: u16) -> Result<()>;

    /// Sends one command and waits for its reply.
    async fn send(&mut self, name: &str, params: Value) -> Result<Response>;

    /// Returns the session id, or `None` before a session is created.
    fn session_id(&self) -> Option<&SessionId>;

    /// Closes the connection.
    async fn close(&mut self) -> Result<()>;
}

// ============================================================================
// TcpTransport
// ============================================================================

/// [`Transport`] over a TCP [`Connection`].
#[derive(Debug, Default)]
pub struct TcpTransport {
    /// Options applied on connect.
    options: ConnectionOptions,
    /// Live connection, if any.
    connection: Option<Connection<TcpStream>>,
}

impl TcpTransport {
    /// Creates an unconnected transport with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unconnected transport with custom options.
    #[inline]
    #[must_use]
    pub fn with_options(options: ConnectionOptions) -> Self {
        Self {
            options,
            connection: None,
        }
    }

    /// Returns `true` if a connection is open.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Returns the underlying connection, if open.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> Option<&Connection<TcpStream>> {
        self.connection.as_ref()
    }

    /// Returns the underlying connection mutably, if open.
    #[inline]
    pub fn connection_mut(&mut self) -> Option<&mut Connection<TcpStream>> {
        self.connection.as_mut()
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        if self.connection.is_some() {
            return Err(Error::connection(format!(
                "already connected, cannot connect to {host}:{port}"
            )));
        }

        let connection = Connection::connect_with(host, port, self.options.clone()).await?;
        self.connection = Some(connection);
        Ok(())
    }

    async fn send(&mut self, name: &str, params: Value) -> Result<Response> {
        let connection = self.connection.as_mut().ok_or(Error::NotConnected)?;
        connection.send(name, params).await
    }

    fn session_id(&self) -> Option<&SessionId> {
        self.connection.as_ref().and_then(Connection::session_id)
    }

    async fn close(&mut self) -> Result<()> {
        match self.connection.take() {
            Some(connection) => connection.close().await,
            None => {
                debug!("Close requested on unconnected transport");
                Ok(())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
