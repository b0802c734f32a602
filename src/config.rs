use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::RngCore;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub permanent_ttl_days: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub cooldown_secs: u64,
    pub retention_secs: u64,
}

impl RateLimitConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 30,
            retention_secs: 5 * 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    pub session: SessionConfig,
    pub model: ModelConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = match std::env::var("SESSION_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!("SESSION_SECRET not set; sessions will not survive a restart");
                random_secret()
            }
        };

        let session = SessionConfig {
            secret,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "nutriscan".into()),
            audience: std::env::var("SESSION_AUDIENCE").unwrap_or_else(|_| "nutriscan-web".into()),
            ttl_minutes: env_or("SESSION_TTL_MINUTES", 12 * 60)?,
            permanent_ttl_days: env_or("SESSION_PERMANENT_TTL_DAYS", 31)?,
            cookie_secure: env_or("SESSION_COOKIE_SECURE", false)?,
        };

        let model = ModelConfig {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".into()),
            max_tokens: env_or("OPENAI_MAX_TOKENS", 1000)?,
            temperature: env_or("OPENAI_TEMPERATURE", 0.7)?,
            timeout_secs: env_or("OPENAI_TIMEOUT_SECS", 60)?,
        };

        let rate_limit = RateLimitConfig {
            cooldown_secs: env_or("RATE_LIMIT_SECONDS", 30)?,
            retention_secs: env_or("RATE_LIMIT_RETENTION_SECONDS", 5 * 60)?,
        };
        if rate_limit.retention_secs < rate_limit.cooldown_secs {
            tracing::warn!(
                cooldown = rate_limit.cooldown_secs,
                retention = rate_limit.retention_secs,
                "rate-limit retention shorter than cooldown; using cooldown"
            );
        }

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8085)?,
            max_body_bytes: env_or("MAX_BODY_BYTES", 16 * 1024 * 1024)?,
            session,
            model,
            rate_limit,
        })
    }
}

/// Reads an optional variable, falling back to `default` when unset.
/// A set but unparsable value is a startup error.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}")),
        Err(_) => Ok(default),
    }
}

fn random_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}
