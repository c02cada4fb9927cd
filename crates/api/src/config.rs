use stocktake_core::status::DEFAULT_EXPIRING_SOON_DAYS;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except `JWT_SECRET` have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Per-request cap for PDF composition in seconds (default: `20`).
    pub export_timeout_secs: u64,
    /// Directory uploaded documents are stored under.
    pub upload_dir: String,
    /// Maximum accepted upload size in bytes, enforced before buffering.
    pub max_upload_bytes: usize,
    /// Days before expiry at which a license counts as "expiring soon".
    pub expiring_soon_days: i64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default       |
    /// |--------------------------|---------------|
    /// | `HOST`                   | `0.0.0.0`     |
    /// | `PORT`                   | `3000`        |
    /// | `CORS_ORIGINS`           | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`          |
    /// | `EXPORT_TIMEOUT_SECS`    | `20`          |
    /// | `UPLOAD_DIR`             | `./uploads`   |
    /// | `MAX_UPLOAD_BYTES`       | `10485760`    |
    /// | `EXPIRING_SOON_DAYS`     | `30`          |
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
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let export_timeout_secs: u64 = std::env::var("EXPORT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("EXPORT_TIMEOUT_SECS must be a valid u64");

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".into());

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let expiring_soon_days: i64 = std::env::var("EXPIRING_SOON_DAYS")
            .unwrap_or_else(|_| DEFAULT_EXPIRING_SOON_DAYS.to_string())
            .parse()
            .expect("EXPIRING_SOON_DAYS must be a valid i64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            export_timeout_secs,
            upload_dir,
            max_upload_bytes,
            expiring_soon_days,
            jwt,
        }
    }
}
