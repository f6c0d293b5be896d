//! HTTP listener lifecycle.
//!
//! `Lifecycle` owns the running listener. `init` binds and starts serving,
//! `shutdown` stops accepting, drains in-flight connections for the grace
//! period, and waits for the listener to close. Dropping a `Lifecycle` that
//! still owns a listener closes it immediately.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use tokio::task::JoinHandle;

use super::shutdown::ShutdownReason;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("Invalid listen address '{address}': {source}")]
    Address {
        address: String,
        source: std::net::AddrParseError,
    },

    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Server already started")]
    AlreadyStarted,
}

/// Owns the HTTP listener from startup to shutdown.
pub struct Lifecycle {
    handle: Handle,
    grace: Duration,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl Lifecycle {
    pub fn new(grace: Duration) -> Self {
        Self {
            handle: Handle::new(),
            grace,
            task: None,
        }
    }

    /// Bind `address` and start serving `app`.
    ///
    /// Returns once the listener is accepting connections, with the actual
    /// bound address (useful when binding port 0).
    pub async fn init(&mut self, app: Router, address: &str) -> Result<SocketAddr, StartError> {
        if self.task.is_some() {
            return Err(StartError::AlreadyStarted);
        }

        let addr: SocketAddr = address.parse().map_err(|source| StartError::Address {
            address: address.to_string(),
            source,
        })?;

        let handle = self.handle.clone();
        let task = tokio::spawn(async move {
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        });

        match self.handle.listening().await {
            Some(local_addr) => {
                tracing::info!(addr = %local_addr, "startup");
                self.task = Some(task);
                Ok(local_addr)
            }
            None => Err(match task.await {
                Ok(Err(e)) => StartError::Bind(e),
                Ok(Ok(())) => StartError::Server("listener exited before accepting".to_string()),
                Err(e) => StartError::Server(e.to_string()),
            }),
        }
    }

    /// Resolves only if the listener stops on its own.
    ///
    /// Never resolves while the server is healthy, so it is meant to be raced
    /// against [`super::wait_for_signal`].
    pub async fn wait_for_fault(&mut self) -> ShutdownReason {
        let result = match self.task.as_mut() {
            Some(task) => task.await,
            None => std::future::pending().await,
        };
        self.task = None;

        ShutdownReason::Fault(match result {
            Ok(Ok(())) => "server stopped unexpectedly".to_string(),
            Ok(Err(e)) => format!("server error: {}", e),
            Err(e) => format!("server task failed: {}", e),
        })
    }

    /// Handle controlling the running listener.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Number of connections currently open.
    pub fn connection_count(&self) -> usize {
        self.handle.connection_count()
    }

    /// Stop accepting, drain, close. Returns the process exit code.
    pub async fn shutdown(mut self, reason: ShutdownReason) -> u8 {
        tracing::info!(reason = %reason, "shutdown");

        if let Some(task) = self.task.take() {
            self.handle.graceful_shutdown(Some(self.grace));
            tracing::info!(
                grace_secs = self.grace.as_secs(),
                connections = self.handle.connection_count(),
                "Waiting for connections to close"
            );

            match task.await {
                Ok(Ok(())) => tracing::debug!("Listener closed"),
                Ok(Err(e)) => tracing::error!(error = %e, "Listener closed with error"),
                Err(e) => tracing::error!(error = %e, "Listener task failed"),
            }
        }

        reason.exit_code()
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        if self.task.take().is_some() {
            self.handle.shutdown();
        }
    }
}
