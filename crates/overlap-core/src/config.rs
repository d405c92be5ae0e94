//! Engine configuration types.

use crate::error::CoreError;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the PSI engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the PSI binary.
    pub binary_path: PathBuf,
    /// Directory where per-request workspace files are created.
    pub work_dir: PathBuf,
    /// Maximum wall-clock time for one PSI run. `None` disables the
    /// timeout entirely.
    pub timeout: Option<Duration>,
    /// Fixed receiver dataset on disk, used when a request carries no
    /// receiver payload of its own.
    pub receiver_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("/usr/local/bin/dpca_psi"),
            work_dir: std::env::temp_dir().join("overlap"),
            timeout: Some(Duration::from_secs(300)),
            receiver_path: None,
        }
    }
}

impl EngineConfig {
    /// Create a new config builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.binary_path.as_os_str().is_empty() {
            return Err(CoreError::InvalidConfig("binary_path is required".into()));
        }
        if self.work_dir.as_os_str().is_empty() {
            return Err(CoreError::InvalidConfig("work_dir is required".into()));
        }
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(CoreError::InvalidConfig("timeout must be > 0".into()));
            }
        }
        Ok(())
    }

    /// Validate that configured paths exist, logging warnings instead of
    /// failing. Useful in development where the binary may not be
    /// installed yet.
    pub fn validate_warn(&self) {
        if !self.binary_path.exists() {
            tracing::warn!("PSI binary not found: {:?}", self.binary_path);
        }
        if let Some(receiver) = &self.receiver_path {
            if !receiver.exists() {
                tracing::warn!("Receiver dataset not found: {:?}", receiver);
            }
        }
    }
}

/// Builder for EngineConfig.
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Set the PSI binary path.
    pub fn binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.binary_path = path.into();
        self
    }

    /// Set the workspace directory.
    pub fn work_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.work_dir = path.into();
        self
    }

    /// Set the computation timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable the computation timeout.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Set a fixed receiver dataset path for requests that carry no
    /// receiver payload.
    pub fn receiver_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.receiver_path = Some(path.into());
        self
    }

    /// Build the configuration, validating all required fields.
    pub fn build(self) -> Result<EngineConfig, CoreError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.timeout, Some(Duration::from_secs(300)));
        assert!(config.receiver_path.is_none());
    }

    #[test]
    fn test_builder_success() {
        let config = EngineConfig::builder()
            .binary("/opt/psi/dpca_psi")
            .work_dir("/tmp/overlap-test")
            .timeout(Duration::from_secs(60))
            .build()
            .expect("should build successfully");

        assert_eq!(config.binary_path, PathBuf::from("/opt/psi/dpca_psi"));
        assert_eq!(config.work_dir, PathBuf::from("/tmp/overlap-test"));
        assert_eq!(config.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_builder_rejects_empty_binary() {
        let result = EngineConfig::builder().binary("").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        let result = EngineConfig::builder()
            .timeout(Duration::from_secs(0))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_no_timeout() {
        let config = EngineConfig::builder().no_timeout().build().unwrap();
        assert!(config.timeout.is_none());
    }
}
