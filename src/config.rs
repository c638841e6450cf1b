use std::{env, net::SocketAddr, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
}

/// Which `DataStore` implementation backs the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local store; data is lost on shutdown. Dev and test default.
    Memory,
    /// One DynamoDB table per collection.
    DynamoDb,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(StoreBackend::Memory),
            "dynamodb" => Ok(StoreBackend::DynamoDb),
            other => Err(format!("expected 'memory' or 'dynamodb', got '{other}'")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub store_backend: StoreBackend,
    // Store region as string for simplicity; the SDK setup converts it.
    pub aws_region: String,
    // Optional endpoint override for LocalStack
    pub aws_endpoint: Option<String>,
    /// Prepended to every collection's table name ("gifverse_" -> "gifverse_gifs").
    pub table_prefix: String,
    /// When set, the memory auth client accepts this bearer token for a
    /// seeded development user.
    pub dev_auth_token: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();

        let bind_address_str =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let store_backend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse()
            .map_err(|e: String| ConfigError::InvalidVar("STORE_BACKEND".into(), e))?;

        let aws_region =
            env::var("AWS_DEFAULT_REGION").unwrap_or_else(|_| "ca-central-1".to_string());

        // Allow overriding endpoint for localstack/testing
        let aws_endpoint = env::var("AWS_ENDPOINT_URL").ok();

        let table_prefix = env::var("TABLE_PREFIX").unwrap_or_else(|_| "gifverse_".to_string());

        let dev_auth_token = env::var("DEV_AUTH_TOKEN").ok();

        Ok(Config {
            bind_address,
            store_backend,
            aws_region,
            aws_endpoint,
            table_prefix,
            dev_auth_token,
        })
    }
}
