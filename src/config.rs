use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Base64-encoded HMAC-SHA256 signing secret, shared by issuance and
    /// verification for the process lifetime.
    pub secret_base64: String,
    /// Token time-to-live in milliseconds.
    pub ttl_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub bootstrap_email: Option<String>,
    pub bootstrap_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret_base64: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            ttl_ms: std::env::var("JWT_TTL_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(3_600_000),
        };
        Ok(Self {
            database_url,
            jwt,
            bootstrap_email: std::env::var("BOOTSTRAP_EMAIL").ok(),
            bootstrap_password: std::env::var("BOOTSTRAP_PASSWORD").ok(),
        })
    }
}
