//! Health check endpoints for container orchestration.
//!
//! - `livez`: liveness probe, 200 whenever the process can answer HTTP.
//! - `readyz`: readiness probe, reports uptime and memory usage, or 503 if the
//!   process cannot inspect its own state.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Liveness handler.
pub async fn livez() -> &'static str {
    "ok"
}

/// Body of a successful readiness check.
#[derive(Debug, Serialize)]
pub struct ReadyzResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server state was created
    pub uptime: f64,
    pub memory: MemoryUsage,
}

/// Body of a failed readiness check.
#[derive(Debug, Serialize)]
pub struct UnavailableResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Process memory usage in bytes. Fields are `None` where the platform does
/// not expose them.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct MemoryUsage {
    pub rss: Option<u64>,
    #[serde(rename = "virtual")]
    pub virtual_size: Option<u64>,
}

impl MemoryUsage {
    /// Sample the current process.
    #[cfg(target_os = "linux")]
    pub fn sample() -> std::io::Result<Self> {
        let status = std::fs::read_to_string("/proc/self/status")?;
        Ok(Self::parse_proc_status(&status))
    }

    #[cfg(not(target_os = "linux"))]
    pub fn sample() -> std::io::Result<Self> {
        Ok(Self::default())
    }

    /// Parse `VmRSS` and `VmSize` (reported in kB) out of `/proc/<pid>/status`.
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    fn parse_proc_status(status: &str) -> Self {
        let mut usage = Self::default();
        for line in status.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let kib = value
                .trim()
                .trim_end_matches("kB")
                .trim()
                .parse::<u64>()
                .ok();
            match key {
                "VmRSS" => usage.rss = kib.map(|k| k * 1024),
                "VmSize" => usage.virtual_size = kib.map(|k| k * 1024),
                _ => {}
            }
        }
        usage
    }
}

/// Readiness handler.
pub async fn readyz(State(state): State<AppState>) -> Response {
    match (state.memory_sampler)() {
        Ok(memory) => Json(ReadyzResponse {
            status: "ok",
            timestamp: Utc::now(),
            uptime: state.started_at.elapsed().as_secs_f64(),
            memory,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(UnavailableResponse {
                    status: "error",
                    message: "Service unavailable",
                }),
            )
                .into_response()
        }
    }
}
