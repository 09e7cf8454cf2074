use std::env;

use dotenvy::dotenv;

use crate::error::AppError;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Secret key the session token signer is keyed with.
    pub token_secret: String,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL missing".into()))?;
        let token_secret = env::var("TOKEN_SECRET")
            .map_err(|_| AppError::Config("TOKEN_SECRET missing".into()))?;

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            database_url,
            token_secret,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: String::new(),
            token_secret: "test-secret".to_string(),
            environment: "test".to_string(),
        }
    }
}
