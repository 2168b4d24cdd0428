//! Environment-sourced configuration (spec §6, expanded in SPEC_FULL §10.1).
//!
//! Loaded once at boot via [`Config::from_env`] in the teacher's style:
//! `anyhow::Context` on missing required vars, `unwrap_or_else` defaults for
//! optional ones. Missing optional credentials degrade the corresponding
//! feature gracefully rather than failing boot — see each group's doc
//! comment for its specific fallback.

use anyhow::{bail, Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: db_pool::DbConfig,
    pub redis: RedisConfig,
    pub object_storage: ObjectStorageConfig,
    pub email: EmailConfig,
    pub push: PushConfig,
    pub payment: PaymentConfig,
    pub moderation: ModerationConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenv::dotenv().ok();
        }

        Ok(Self {
            app: AppConfig::from_env()?,
            database: db_pool::DbConfig::from_env("core-service")
                .map_err(|e| anyhow::anyhow!(e))
                .context("loading database configuration")?,
            redis: RedisConfig::from_env(),
            object_storage: ObjectStorageConfig::from_env(),
            email: EmailConfig::from_env(),
            push: PushConfig::from_env(),
            payment: PaymentConfig::from_env(),
            moderation: ModerationConfig::from_env(),
            auth: AuthConfig::from_env()?,
            cors: CorsConfig::from_env(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("invalid PORT")?,
        })
    }
}

/// Cache URL is required for rate limiting and JWT-revocation caching; its
/// absence degrades rate limiting to the in-process fallback counter rather
/// than a hard failure (`actix_middleware::rate_limit::FailureMode`).
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: Option<String>,
}

impl RedisConfig {
    fn from_env() -> Self {
        Self {
            url: env::var("REDIS_URL").ok(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

/// Consumed only as a config struct (§6): actual photo storage is an
/// out-of-core collaborator; the core only persists and returns
/// `Photo.url` strings.
#[derive(Debug, Clone)]
pub struct ObjectStorageConfig {
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub bucket: Option<String>,
    pub use_ssl: bool,
}

impl ObjectStorageConfig {
    fn from_env() -> Self {
        Self {
            endpoint: env::var("OBJECT_STORAGE_ENDPOINT").ok(),
            access_key: env::var("OBJECT_STORAGE_ACCESS_KEY").ok(),
            secret_key: env::var("OBJECT_STORAGE_SECRET_KEY").ok(),
            bucket: env::var("OBJECT_STORAGE_BUCKET").ok(),
            use_ssl: env::var("OBJECT_STORAGE_USE_SSL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

/// Missing credentials make the email transport log-and-succeed (§6, §10.1).
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: String,
}

impl EmailConfig {
    fn from_env() -> Self {
        Self {
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            from_address: env::var("EMAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "noreply@example.com".to_string()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.smtp_host.is_some()
    }
}

/// Missing credentials make the push transport a silent no-op (§6, §10.1).
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub vendor_key: Option<String>,
    pub vendor_endpoint: Option<String>,
}

impl PushConfig {
    fn from_env() -> Self {
        Self {
            vendor_key: env::var("PUSH_VENDOR_KEY").ok(),
            vendor_endpoint: env::var("PUSH_VENDOR_ENDPOINT").ok(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.vendor_key.is_some()
    }
}

/// Config-only; consumed by the out-of-core billing collaborator. The core
/// exposes only the `is_premium` check it needs for credit rules (§1 scope).
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub processor_key: Option<String>,
    pub price_id_monthly: Option<String>,
    pub webhook_signing_secret: Option<String>,
}

impl PaymentConfig {
    fn from_env() -> Self {
        Self {
            processor_key: env::var("PAYMENT_PROCESSOR_KEY").ok(),
            price_id_monthly: env::var("PAYMENT_PRICE_ID_MONTHLY").ok(),
            webhook_signing_secret: env::var("PAYMENT_WEBHOOK_SECRET").ok(),
        }
    }
}

/// Missing key disables moderation entirely (all messages pass) (§4.3, §6).
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    pub vendor_key: Option<String>,
    pub vendor_endpoint: Option<String>,
    pub block_threshold: f32,
    pub review_threshold: f32,
}

impl ModerationConfig {
    fn from_env() -> Self {
        Self {
            vendor_key: env::var("MODERATION_VENDOR_KEY").ok(),
            vendor_endpoint: env::var("MODERATION_VENDOR_ENDPOINT").ok(),
            block_threshold: env::var("MODERATION_BLOCK_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.9),
            review_threshold: env::var("MODERATION_REVIEW_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.7),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.vendor_key.is_some()
    }
}

/// Bearer-token signing secret must be >= 32 bytes (§6): refuse to start
/// rather than run unauthenticated.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_hmac_secret: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
}

impl AuthConfig {
    fn from_env() -> Result<Self> {
        let jwt_hmac_secret =
            env::var("JWT_HMAC_SECRET").context("JWT_HMAC_SECRET must be set")?;
        if jwt_hmac_secret.len() < 32 {
            bail!("JWT_HMAC_SECRET must be at least 32 bytes");
        }

        Ok(Self {
            jwt_hmac_secret,
            access_ttl_seconds: env::var("ACCESS_TOKEN_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            refresh_ttl_seconds: env::var("REFRESH_TOKEN_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60 * 60 * 24 * 30),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    fn from_env() -> Self {
        let raw = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();
        Self {
            allowed_origins: raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn rejects_short_jwt_secret() {
        env::set_var("JWT_HMAC_SECRET", "too-short");
        let result = AuthConfig::from_env();
        env::remove_var("JWT_HMAC_SECRET");
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn accepts_32_byte_jwt_secret() {
        env::set_var("JWT_HMAC_SECRET", "a".repeat(32));
        let result = AuthConfig::from_env();
        env::remove_var("JWT_HMAC_SECRET");
        assert!(result.is_ok());
    }

    #[test]
    fn missing_moderation_key_disables_moderation() {
        env::remove_var("MODERATION_VENDOR_KEY");
        let config = ModerationConfig::from_env();
        assert!(!config.is_configured());
    }
}
