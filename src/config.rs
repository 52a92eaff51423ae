use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// When unset, the service runs without a cache and every public read
    /// goes straight to the database.
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiry_seconds: u64,
    /// bcrypt hash of the shared admin password.
    pub admin_password_hash: String,
    pub cache_ttl_seconds: u64,
    // Image relay (optional — uploads are rejected when unset)
    pub image_relay_url: Option<String>,
    pub image_relay_key: Option<String>,
    pub host: String,
    pub port: u16,
    pub app_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL").ok().filter(|s| !s.is_empty()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiry_seconds: env::var("JWT_EXPIRY_SECONDS")
                .unwrap_or_else(|_| "3600".into())
                .parse()?,
            admin_password_hash: required("ADMIN_PASSWORD_HASH")?,
            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| "300".into())
                .parse()?,
            image_relay_url: env::var("IMAGE_RELAY_URL").ok().filter(|s| !s.is_empty()),
            image_relay_key: env::var("IMAGE_RELAY_KEY").ok().filter(|s| !s.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost".into()),
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}
