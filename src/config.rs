//! Process configuration read from the environment

use std::time::Duration;

use chrono::FixedOffset;

/// Default rate source: the Central Bank of Armenia SOAP service
pub const DEFAULT_RATES_URL: &str = "https://api.cba.am/exchangerates.asmx";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_INTERVAL_MINUTES: u32 = 5;

/// Runtime configuration
#[derive(Clone)]
pub struct Config {
    /// Telegram bot token (required)
    pub bot_token: String,
    /// Telegram Bot API base URL
    pub telegram_api_url: String,
    /// Rate source endpoint
    pub rates_url: String,
    /// Currency code looked up in the rate listing
    pub currency: String,
    /// Currency the rate is quoted in, used only in message text
    pub quote_currency: String,
    /// Offset used to derive the local hour for active windows
    pub utc_offset: FixedOffset,
    /// Initial polling interval in minutes
    pub interval_minutes: u32,
    /// Timeout for outbound rate requests
    pub http_timeout: Duration,
    /// Bind address for the status endpoint; disabled when unset
    pub http_addr: Option<String>,
}

impl Config {
    /// Build configuration from environment variables
    ///
    /// TELEGRAM_BOT_TOKEN=123:abc (required)
    /// TELEGRAM_API_URL=https://api.telegram.org
    /// FXWATCH_RATES_URL=https://api.cba.am/exchangerates.asmx
    /// FXWATCH_CURRENCY=EUR
    /// FXWATCH_QUOTE_CURRENCY=AMD
    /// FXWATCH_UTC_OFFSET_HOURS=4
    /// FXWATCH_INTERVAL_MINUTES=5
    /// FXWATCH_HTTP_TIMEOUT_SECS=10
    /// FXWATCH_HTTP_ADDR=0.0.0.0:8080
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let offset_hours: i32 = parse_var(&lookup, "FXWATCH_UTC_OFFSET_HOURS", 4)?;
        let utc_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::Invalid {
                key: "FXWATCH_UTC_OFFSET_HOURS",
                value: offset_hours.to_string(),
            })?;

        let interval_minutes: u32 =
            parse_var(&lookup, "FXWATCH_INTERVAL_MINUTES", DEFAULT_INTERVAL_MINUTES)?;
        if interval_minutes == 0 {
            return Err(ConfigError::Invalid {
                key: "FXWATCH_INTERVAL_MINUTES",
                value: "0".to_string(),
            });
        }

        let timeout_secs: u64 = parse_var(&lookup, "FXWATCH_HTTP_TIMEOUT_SECS", 10)?;

        Ok(Self {
            bot_token,
            telegram_api_url: lookup("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            rates_url: lookup("FXWATCH_RATES_URL").unwrap_or_else(|| DEFAULT_RATES_URL.to_string()),
            currency: lookup("FXWATCH_CURRENCY").unwrap_or_else(|| "EUR".to_string()),
            quote_currency: lookup("FXWATCH_QUOTE_CURRENCY").unwrap_or_else(|| "AMD".to_string()),
            utc_offset,
            interval_minutes,
            http_timeout: Duration::from_secs(timeout_secs),
            http_addr: lookup("FXWATCH_HTTP_ADDR").filter(|a| !a.trim().is_empty()),
        })
    }
}

// Keep the token out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("telegram_api_url", &self.telegram_api_url)
            .field("rates_url", &self.rates_url)
            .field("currency", &self.currency)
            .field("quote_currency", &self.quote_currency)
            .field("utc_offset", &self.utc_offset)
            .field("interval_minutes", &self.interval_minutes)
            .field("http_timeout", &self.http_timeout)
            .field("http_addr", &self.http_addr)
            .finish()
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TELEGRAM_BOT_TOKEN environment variable is not set")]
    MissingToken,

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingToken)));

        let result = Config::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKEN", "  ")]));
        assert!(matches!(result, Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKEN", "t")])).unwrap();
        assert_eq!(config.rates_url, DEFAULT_RATES_URL);
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.quote_currency, "AMD");
        assert_eq!(config.utc_offset.local_minus_utc(), 4 * 3600);
        assert_eq!(config.interval_minutes, 5);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert!(config.http_addr.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let result = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("FXWATCH_INTERVAL_MINUTES", "0"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));

        let result = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("FXWATCH_UTC_OFFSET_HOURS", "abc"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));

        let result = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("FXWATCH_UTC_OFFSET_HOURS", "30"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config =
            Config::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKEN", "secret-token")])).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-token"));
    }
}
