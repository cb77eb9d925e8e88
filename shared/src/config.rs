use tracing::warn;

/// Which `CacheStore` implementation backs the response cache
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Moka { max_entries: Option<u64> },
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: String,
    pub allowed_origins: Vec<String>,
    pub cache_backend: CacheBackend,
    pub products_per_page: usize,
    pub session_ttl_secs: u64,
    pub payment_currency: String,
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 5005;
    const DEFAULT_DATA_DIR: &'static str = "./data";
    const DEFAULT_PRODUCTS_PER_PAGE: usize = 20;
    const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
    const DEFAULT_PAYMENT_CURRENCY: &'static str = "inr";
    const DEFAULT_ADMIN_NAME: &'static str = "Administrator";
    const DEFAULT_ADMIN_EMAIL: &'static str = "admin@bazaar.local";
    const DEFAULT_ADMIN_PASSWORD: &'static str = "admin12345";

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let cache_backend = match lookup("BAZAAR_CACHE_BACKEND")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("moka") => CacheBackend::Moka {
                max_entries: lookup("BAZAAR_CACHE_MAX_ENTRIES").and_then(|s| s.parse().ok()),
            },
            Some("memory") | None => CacheBackend::Memory,
            Some(other) => {
                warn!("Unknown BAZAAR_CACHE_BACKEND '{}', using in-memory store", other);
                CacheBackend::Memory
            }
        };

        Self {
            host: lookup("BAZAAR_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            port: lookup("BAZAAR_PORT")
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(Self::DEFAULT_PORT),
            data_dir: lookup("BAZAAR_DATA_DIR")
                .unwrap_or_else(|| Self::DEFAULT_DATA_DIR.to_string()),
            allowed_origins: lookup("BAZAAR_ALLOWED_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            cache_backend,
            products_per_page: lookup("BAZAAR_PRODUCTS_PER_PAGE")
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(Self::DEFAULT_PRODUCTS_PER_PAGE),
            session_ttl_secs: lookup("BAZAAR_SESSION_TTL_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(Self::DEFAULT_SESSION_TTL_SECS),
            payment_currency: lookup("BAZAAR_PAYMENT_CURRENCY")
                .map(|s| s.to_ascii_lowercase())
                .unwrap_or_else(|| Self::DEFAULT_PAYMENT_CURRENCY.to_string()),
            admin_name: lookup("BAZAAR_ADMIN_NAME")
                .unwrap_or_else(|| Self::DEFAULT_ADMIN_NAME.to_string()),
            admin_email: lookup("BAZAAR_ADMIN_EMAIL")
                .unwrap_or_else(|| Self::DEFAULT_ADMIN_EMAIL.to_string()),
            admin_password: lookup("BAZAAR_ADMIN_PASSWORD").unwrap_or_else(|| {
                warn!(
                    "BAZAAR_ADMIN_PASSWORD not set, using default password '{}'",
                    Self::DEFAULT_ADMIN_PASSWORD
                );
                warn!("Please change the default admin password immediately!");
                Self::DEFAULT_ADMIN_PASSWORD.to_string()
            }),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}
