use std::time::Duration;

use thumbforge_core::credits::DEFAULT_GENERATION_COST;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `180` — a synthesis
    /// call with retries can legitimately take minutes).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Base URL of the image-generation service.
    pub synthesis_api_url: String,
    /// Base URL of the vision/LLM analysis service.
    pub vision_api_url: String,
    /// Base URL of the post-production renderer.
    pub render_api_url: String,
    /// Fixed credits charged per generation.
    pub generation_credit_cost: i64,
    /// Staleness bound for the reference catalog cache.
    pub catalog_refresh: Duration,
    /// Attempt budget for the synthesis retry loop.
    pub synthesis_max_attempts: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `180`                      |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                       |
    /// | `SYNTHESIS_API_URL`      | `http://localhost:8801`    |
    /// | `VISION_API_URL`         | `http://localhost:8802`    |
    /// | `RENDER_API_URL`         | `http://localhost:8803`    |
    /// | `GENERATION_CREDIT_COST` | `2`                        |
    /// | `CATALOG_REFRESH_SECS`   | `60`                       |
    /// | `SYNTHESIS_MAX_ATTEMPTS` | `3`                        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "180".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let synthesis_api_url =
            std::env::var("SYNTHESIS_API_URL").unwrap_or_else(|_| "http://localhost:8801".into());
        let vision_api_url =
            std::env::var("VISION_API_URL").unwrap_or_else(|_| "http://localhost:8802".into());
        let render_api_url =
            std::env::var("RENDER_API_URL").unwrap_or_else(|_| "http://localhost:8803".into());

        let generation_credit_cost: i64 = std::env::var("GENERATION_CREDIT_COST")
            .unwrap_or_else(|_| DEFAULT_GENERATION_COST.to_string())
            .parse()
            .expect("GENERATION_CREDIT_COST must be a valid i64");

        let catalog_refresh_secs: u64 = std::env::var("CATALOG_REFRESH_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("CATALOG_REFRESH_SECS must be a valid u64");

        let synthesis_max_attempts: u32 = std::env::var("SYNTHESIS_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("SYNTHESIS_MAX_ATTEMPTS must be a valid u32");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            synthesis_api_url,
            vision_api_url,
            render_api_url,
            generation_credit_cost,
            catalog_refresh: Duration::from_secs(catalog_refresh_secs),
            synthesis_max_attempts,
        }
    }
}
