use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    /// Falls back to the URI's default database, then to `inventory`.
    pub mongodb_database: Option<String>,
    pub mongodb_max_pool_size: u32,
    pub mongodb_connect_timeout_secs: u64,
    pub host: String,
    pub port: u16,
    pub base_path: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            mongodb_uri: std::env::var("MONGODB_URI").context("MONGODB_URI must be set")?,
            mongodb_database: std::env::var("MONGODB_DATABASE")
                .ok()
                .filter(|name| !name.is_empty()),
            mongodb_max_pool_size: std::env::var("MONGODB_MAX_POOL_SIZE")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("MONGODB_MAX_POOL_SIZE must be a valid number")?,
            mongodb_connect_timeout_secs: std::env::var("MONGODB_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("MONGODB_CONNECT_TIMEOUT_SECS must be a valid number")?,
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            base_path: normalize_base_path(
                &std::env::var("INVENTORY_BASE_PATH")
                    .unwrap_or_else(|_| "/api/inventory".to_string()),
            ),
        })
    }
}

/// Leading slash, no trailing slash; an empty path mounts at `/`.
fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    format!("/{trimmed}")
}
