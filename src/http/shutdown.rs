//! Shutdown reasons and signal handling.
//!
//! Handles:
//! - SIGTERM/SIGINT: graceful shutdown with exit code 0
//! - Server task failure: shutdown with exit code 1

use std::fmt;

/// Why the process is shutting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// A termination signal was received.
    Signal(&'static str),
    /// The server failed or stopped on its own.
    Fault(String),
}

impl ShutdownReason {
    /// Process exit status for this reason.
    pub fn exit_code(&self) -> u8 {
        match self {
            ShutdownReason::Signal(_) => 0,
            ShutdownReason::Fault(_) => 1,
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Signal(name) => write!(f, "received {}", name),
            ShutdownReason::Fault(detail) => write!(f, "fault: {}", detail),
        }
    }
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
///
/// If a handler cannot be installed the failure is logged and that signal is
/// never reported; the other one still is.
pub async fn wait_for_signal() -> ShutdownReason {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
            ShutdownReason::Signal("SIGINT")
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
            ShutdownReason::Signal("SIGTERM")
        }
    }
}
