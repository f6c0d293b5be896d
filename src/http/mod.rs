//! HTTP server lifecycle and signal handling.
//!
//! The entry point owns a [`Lifecycle`]:
//! - `init` binds the listener and starts serving
//! - `shutdown` stops accepting, drains in-flight connections, and closes
//!
//! Shutdown is triggered by SIGTERM/SIGINT (exit 0) or by the server task
//! failing on its own (exit 1).

mod server;
mod shutdown;

pub use server::{Lifecycle, StartError};
pub use shutdown::{wait_for_signal, ShutdownReason};
