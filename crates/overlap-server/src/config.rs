//! Configuration for the Overlap server.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults.

use overlap_core::EngineConfig;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the Overlap HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server bind address.
    pub http_addr: SocketAddr,

    /// PSI engine configuration.
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 8080),
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `OVERLAP_HTTP_HOST` | `0.0.0.0` |
    /// | `OVERLAP_HTTP_PORT` | `8080` |
    /// | `OVERLAP_PSI_BINARY` | `/usr/local/bin/dpca_psi` |
    /// | `OVERLAP_WORK_DIR` | `<tmp>/overlap` |
    /// | `OVERLAP_TIMEOUT_SECS` | `300` (`0` disables the timeout) |
    /// | `OVERLAP_RECEIVER_FILE` | unset (requests must carry a receiver) |
    pub fn from_env() -> Self {
        let default = Self::default();

        let http_host: IpAddr = std::env::var("OVERLAP_HTTP_HOST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let http_port: u16 = std::env::var("OVERLAP_HTTP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        let timeout = match std::env::var("OVERLAP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => default.engine.timeout,
        };

        let engine = EngineConfig {
            binary_path: std::env::var("OVERLAP_PSI_BINARY")
                .map(PathBuf::from)
                .unwrap_or(default.engine.binary_path),
            work_dir: std::env::var("OVERLAP_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.engine.work_dir),
            timeout,
            receiver_path: std::env::var("OVERLAP_RECEIVER_FILE").ok().map(PathBuf::from),
        };

        Self {
            http_addr: SocketAddr::new(http_host, http_port),
            engine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr.port(), 8080);
        assert_eq!(
            config.engine.binary_path,
            PathBuf::from("/usr/local/bin/dpca_psi")
        );
        assert!(config.engine.receiver_path.is_none());
    }

    #[test]
    fn test_from_env_uses_defaults() {
        std::env::remove_var("OVERLAP_HTTP_HOST");
        std::env::remove_var("OVERLAP_HTTP_PORT");
        std::env::remove_var("OVERLAP_PSI_BINARY");
        std::env::remove_var("OVERLAP_WORK_DIR");
        std::env::remove_var("OVERLAP_TIMEOUT_SECS");
        std::env::remove_var("OVERLAP_RECEIVER_FILE");

        let config = ServerConfig::from_env();
        let default = ServerConfig::default();

        assert_eq!(config.http_addr, default.http_addr);
        assert_eq!(config.engine.binary_path, default.engine.binary_path);
        assert_eq!(config.engine.timeout, default.engine.timeout);
    }
}
