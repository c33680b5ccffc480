//! Environment-driven configuration.

/// Runtime configuration for the API process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address, `BIND_ADDR` (default `0.0.0.0:8080`).
    pub bind_addr: String,

    /// HMAC secret for access tokens, `TOKEN_SECRET`.
    pub token_secret: String,

    /// Token lifetime in minutes, `TOKEN_TTL_MINUTES` (default 30).
    pub token_ttl_minutes: i64,

    /// Postgres connection string, `DATABASE_URL`. Absent means the
    /// in-memory store (dev).
    pub database_url: Option<String>,

    /// Bootstrap operator credentials, `SEED_USERNAME` / `SEED_PASSWORD`.
    pub seed_username: String,
    pub seed_password: String,
}

impl Config {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let token_secret = std::env::var("TOKEN_SECRET").unwrap_or_else(|_| {
            tracing::warn!("TOKEN_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let token_ttl_minutes = std::env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let database_url = std::env::var("DATABASE_URL").ok();
        if database_url.is_none() {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
        }

        let seed_username =
            std::env::var("SEED_USERNAME").unwrap_or_else(|_| "user@example.com".to_string());
        let seed_password = std::env::var("SEED_PASSWORD").unwrap_or_else(|_| {
            tracing::warn!("SEED_PASSWORD not set; using insecure dev default");
            "password".to_string()
        });

        Self {
            bind_addr,
            token_secret,
            token_ttl_minutes,
            database_url,
            seed_username,
            seed_password,
        }
    }
}
