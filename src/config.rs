use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,

    // Outbound calls to the automation engine and fixture targets
    pub upstream_timeout_secs: u64,

    pub cors_allow_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_url: "sqlite://n8n-monitor.db".to_string(),
            upstream_timeout_secs: 30,
            cors_allow_origin: "*".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let mut config = Config::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("PORT") {
            config.port = port.parse().map_err(|e| format!("Invalid port: {}", e))?;
        }

        if let Ok(database_url) = env::var("DATABASE_URL") {
            config.database_url = database_url;
        }

        if let Ok(timeout) = env::var("UPSTREAM_TIMEOUT_SECS") {
            config.upstream_timeout_secs = timeout
                .parse()
                .map_err(|e| format!("Invalid upstream_timeout_secs: {}", e))?;
            if config.upstream_timeout_secs == 0 {
                return Err("Invalid upstream_timeout_secs: must be greater than 0".to_string());
            }
        }

        if let Ok(origin) = env::var("CORS_ALLOW_ORIGIN") {
            config.cors_allow_origin = origin;
        }

        Ok(config)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.upstream_timeout(), Duration::from_secs(30));
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
    }
}
