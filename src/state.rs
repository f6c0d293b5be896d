//! Shared application state for request handlers.

use std::sync::Arc;
use std::time::Instant;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::AppConfig;
use crate::routes::health::MemoryUsage;

/// Source of process memory figures for the readiness probe.
pub type MemorySampler = fn() -> std::io::Result<MemoryUsage>;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Contains the immutable application configuration, the instant the process
/// started serving (for readiness uptime), the memory sampler used by
/// readiness, and a digest of the pre-shared key.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub started_at: Instant,
    pub memory_sampler: MemorySampler,
    api_key: Arc<ApiKey>,
}

impl AppState {
    /// Creates a new application state from the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let api_key = ApiKey::new(&config.secrets.auth_key);
        Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            memory_sampler: MemoryUsage::sample,
            api_key: Arc::new(api_key),
        }
    }

    /// Replace the readiness memory sampler.
    pub fn with_memory_sampler(mut self, sampler: MemorySampler) -> Self {
        self.memory_sampler = sampler;
        self
    }

    /// Check a presented key against the configured one.
    pub fn verify_api_key(&self, presented: &str) -> bool {
        self.api_key.matches(presented)
    }
}

/// SHA-256 digest of the configured key.
///
/// Presented keys are hashed and compared digest-to-digest in constant time,
/// so comparison cost does not depend on the key's contents or length.
struct ApiKey([u8; 32]);

impl ApiKey {
    fn new(key: &str) -> Self {
        Self(Sha256::digest(key.as_bytes()).into())
    }

    fn matches(&self, presented: &str) -> bool {
        let digest: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
        self.0.ct_eq(&digest).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_matches_exactly() {
        let key = ApiKey::new("s3cret");
        assert!(key.matches("s3cret"));
        assert!(!key.matches("s3cret "));
        assert!(!key.matches("S3CRET"));
        assert!(!key.matches(""));
    }
}
