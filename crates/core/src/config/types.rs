use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::bulk::BulkConfig;
use crate::lesson::LessonConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub lesson: LessonConfig,
    #[serde(default)]
    pub bulk: BulkConfig,
}

/// Course service (upstream API) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Base URL of the course service (e.g., "http://localhost:8000/api/v1")
    pub base_url: String,
    /// Bearer token for authenticated deployments
    #[serde(default)]
    pub api_token: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub service: SanitizedServiceConfig,
    pub server: ServerConfig,
    pub lesson: LessonConfig,
    pub bulk: BulkConfig,
}

/// Sanitized service config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedServiceConfig {
    pub base_url: String,
    pub api_token_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            service: SanitizedServiceConfig {
                base_url: config.service.base_url.clone(),
                api_token_configured: config
                    .service
                    .api_token
                    .as_ref()
                    .is_some_and(|t| !t.is_empty()),
                timeout_secs: config.service.timeout_secs,
            },
            server: config.server.clone(),
            lesson: config.lesson.clone(),
            bulk: config.bulk.clone(),
        }
    }
}
