use std::env;

use crate::constants::DEFAULT_BCRYPT_COST;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub admin_secret_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: Option<String>,
    pub openrouter_base_url: String,
    pub public_origin: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/booksandreviews.db".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3001".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set for session tokens")?;

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(v) => v.parse().map_err(|_| "Invalid BCRYPT_COST")?,
            Err(_) => DEFAULT_BCRYPT_COST,
        };

        let admin_secret_key = env::var("ADMIN_SECRET_KEY").ok();

        // Chat gateway settings; the chat endpoint answers 503 when no key is set
        let openrouter_api_key = env::var("OPENROUTER_API_KEY").ok();
        let openrouter_model = env::var("OPENROUTER_MODEL").ok();
        let openrouter_base_url = env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string());

        let public_origin =
            env::var("PUBLIC_ORIGIN").unwrap_or_else(|_| "http://localhost:3001".to_string());

        Ok(Config {
            server_host,
            server_port,
            database_path,
            allowed_origins,
            environment,
            jwt_secret,
            bcrypt_cost,
            admin_secret_key,
            openrouter_api_key,
            openrouter_model,
            openrouter_base_url,
            public_origin,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Whether the server runs in production (controls the Secure cookie flag)
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
