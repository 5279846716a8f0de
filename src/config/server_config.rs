//! HTTP server configuration parsing from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct ServerEnvConfig {
    pub host: String,
    pub port: u16,
    pub metrics_enabled: bool,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            metrics_enabled: true,
        }
    }
}

impl ServerEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("Failed to parse SERVER_PORT")?,
            metrics_enabled: parse_metrics_enabled(env::var("METRICS_ENABLED").ok().as_deref())?,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid SERVER_HOST/SERVER_PORT: {}:{}", self.host, self.port))
    }
}

fn parse_metrics_enabled(raw: Option<&str>) -> Result<bool> {
    match raw {
        None => Ok(true),
        Some(value) => value
            .trim()
            .parse::<bool>()
            .with_context(|| format!("Failed to parse METRICS_ENABLED: {}", value)),
    }
}
