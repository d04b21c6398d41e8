//! Tabloid API configuration.

use anyhow::{Context, Result};
use std::env;

use storage::ObjectStorageConfig;

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Object storage configuration
    pub storage: ObjectStorageConfig,

    /// Database connection URL
    pub database_url: String,

    /// Key namespace for uploaded images
    pub namespace: String,

    /// Optional CDN base prepended to persisted image references
    pub cdn_url: Option<String>,

    /// HTTP listen port
    pub port: u16,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns an error instead of panicking when required settings are
    /// missing, so startup either has fully initialized dependencies or
    /// exits cleanly.
    pub fn from_env() -> Result<Self> {
        let storage = ObjectStorageConfig {
            endpoint: env::var("S3_ENDPOINT").unwrap_or_else(|_| "http://minio:9000".to_string()),
            bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "tabloid-media".to_string()),
            access_key_id: env::var("S3_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            secret_access_key: env::var("S3_SECRET_KEY")
                .unwrap_or_else(|_| "minioadmin".to_string()),
            region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            allow_http: env::var("S3_ALLOW_HTTP")
                .map(|v| v == "true")
                .unwrap_or(true),
        };

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let namespace = env::var("OBJECT_NAMESPACE")
            .unwrap_or_else(|_| storage::image_store::DEFAULT_NAMESPACE.to_string());

        let cdn_url = env::var("CDN_URL").ok().filter(|v| !v.is_empty());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        Ok(Self {
            storage,
            database_url,
            namespace,
            cdn_url,
            port,
        })
    }
}
