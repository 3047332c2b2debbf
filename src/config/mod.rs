//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `RERANK_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;

use crate::constants::{DEFAULT_PORT, DEFAULT_THREADS};
use crate::model::RerankerConfig;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RERANK_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `0.0.0.0`.
    pub bind_addr: IpAddr,

    /// Compute threads used by the CPU kernels. Default: `4`.
    pub threads: usize,

    /// Which cross-encoder to load and from where.
    pub reranker: RerankerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
            threads: DEFAULT_THREADS,
            reranker: RerankerConfig::default(),
        }
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "RERANK_PORT";
    pub const ENV_BIND_ADDR: &'static str = "RERANK_BIND_ADDR";
    pub const ENV_THREADS: &'static str = "RERANK_THREADS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let threads = Self::parse_threads_from_env(defaults.threads)?;
        let reranker = RerankerConfig::from_env();

        Ok(Self {
            port,
            bind_addr,
            threads,
            reranker,
        })
    }

    /// Checks invariants and that a local model directory, if any, exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::InvalidThreads {
                value: self.threads.to_string(),
            });
        }

        self.reranker
            .validate()
            .map_err(|reason| ConfigError::InvalidModel { reason })?;

        if let Some(ref path) = self.reranker.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        match self.bind_addr {
            IpAddr::V6(addr) => format!("[{}]:{}", addr, self.port),
            IpAddr::V4(addr) => format!("{}:{}", addr, self.port),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.trim().parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_threads_from_env(default: usize) -> Result<usize, ConfigError> {
        match env::var(Self::ENV_THREADS) {
            Ok(value) => match value.trim().parse::<usize>() {
                Ok(threads) if threads > 0 => Ok(threads),
                _ => Err(ConfigError::InvalidThreads { value }),
            },
            Err(_) => Ok(default),
        }
    }
}
