use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    /// Externally reachable origin used in mailed action links.
    pub public_base_url: String,
    pub engine_base_url: String,
    pub directory_base_url: String,
    pub directory_cache_ttl_secs: u64,
    pub admin_role: String,
    pub mail_base_url: String,
    pub mail_api_key: Option<String>,
    pub mail_sender: String,

    // Rate limiting
    pub rate_submit_per_min: u32,
    pub rate_decision_per_min: u32,
    pub rate_callback_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            public_base_url: env::var("PUBLIC_BASE_URL").expect("PUBLIC_BASE_URL must be set"),
            engine_base_url: env::var("ENGINE_BASE_URL").expect("ENGINE_BASE_URL must be set"),
            directory_base_url: env::var("DIRECTORY_BASE_URL")
                .expect("DIRECTORY_BASE_URL must be set"),
            directory_cache_ttl_secs: env::var("DIRECTORY_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string()) // default 5 min
                .parse()
                .unwrap(),
            admin_role: env::var("ADMIN_ROLE").unwrap_or_else(|_| "admin".to_string()),
            mail_base_url: env::var("MAIL_BASE_URL").expect("MAIL_BASE_URL must be set"),
            mail_api_key: env::var("MAIL_API_KEY").ok(),
            mail_sender: env::var("MAIL_SENDER").expect("MAIL_SENDER must be set"),

            rate_submit_per_min: env::var("RATE_SUBMIT_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_decision_per_min: env::var("RATE_DECISION_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_callback_per_min: env::var("RATE_CALLBACK_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
        }
    }
}
