use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub razorpay: RazorpayConfig,
    pub admin_email: String,
}

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub api_base: String,
    pub currency: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 5002);
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let razorpay = RazorpayConfig {
            key_id: env::var("RAZORPAY_KEY_ID")
                .map_err(|_| anyhow::anyhow!("RAZORPAY_KEY_ID is not set"))?,
            key_secret: env::var("RAZORPAY_KEY_SECRET")
                .map_err(|_| anyhow::anyhow!("RAZORPAY_KEY_SECRET is not set"))?,
            api_base: env::var("RAZORPAY_API_BASE")
                .unwrap_or_else(|_| "https://api.razorpay.com".to_string()),
            currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "INR".to_string()),
        };

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            db_acquire_timeout_secs: parse_or("DB_ACQUIRE_TIMEOUT_SECS", 30),
            jwt_secret,
            jwt_ttl_hours: parse_or("JWT_TTL_HOURS", 24),
            razorpay,
            admin_email: env::var("ADMIN_EMAIL")
                .map(|e| e.trim().to_lowercase())
                .unwrap_or_else(|_| "admin@intercorp.in".to_string()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
