use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

use crate::domains::verification::OtpOptions;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// When unset the scoped store is kept in process memory.
    pub database_url: Option<String>,
    pub registration_api_url: String,
    pub otp: OtpOptions,
    pub allowed_origins: Vec<String>,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    /// Mounted flows untouched for this long are dropped from memory
    pub flow_idle_ttl: chrono::Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = OtpOptions::default();
        let otp = OtpOptions {
            ttl: chrono::Duration::seconds(parse_or("OTP_TTL_SECONDS", defaults.ttl.num_seconds())?),
            cooldown: chrono::Duration::seconds(parse_or(
                "OTP_COOLDOWN_SECONDS",
                defaults.cooldown.num_seconds(),
            )?),
            length: parse_or("OTP_CODE_LENGTH", defaults.length)?,
        };
        otp.validate().context("Invalid OTP configuration")?;

        Ok(Self {
            port: parse_or("PORT", 8080)?,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            registration_api_url: env::var("REGISTRATION_API_URL")
                .context("REGISTRATION_API_URL must be set")?,
            otp,
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| parse_list(&origins))
                .unwrap_or_default(),
            rate_limit_per_second: parse_or("RATE_LIMIT_PER_SECOND", 10)?,
            rate_limit_burst: parse_or("RATE_LIMIT_BURST", 20)?,
            flow_idle_ttl: chrono::Duration::seconds(parse_or("FLOW_IDLE_TTL_SECONDS", 3600)?),
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_skips_blank_entries() {
        assert_eq!(
            parse_list("https://a.example, ,https://b.example,"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn parse_or_falls_back_when_unset() {
        let value: u16 = parse_or("SIGNUP_TEST_UNSET_VARIABLE", 4242).unwrap();
        assert_eq!(value, 4242);
    }
}
