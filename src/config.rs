use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// 64 hex characters (AES-256 key) used for calendar tokens at rest.
    pub token_encryption_key: String,
    pub tool_webhook_base_url: String,
    pub analytics_scheduler: String,
    pub log_format: String,
    pub cache_ttl: Duration,
    pub port: u16,
}

#[derive(Debug)]
pub struct ConfigError {
    pub missing_vars: Vec<String>,
    pub invalid_vars: Vec<(String, String)>,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.missing_vars.is_empty() {
            writeln!(f, "Missing required environment variables:")?;
            for var in &self.missing_vars {
                writeln!(f, "  - {}", var)?;
            }
        }
        if !self.invalid_vars.is_empty() {
            writeln!(f, "Invalid environment variables:")?;
            for (var, err) in &self.invalid_vars {
                writeln!(f, "  - {}: {}", var, err)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ConfigError {}

fn get_required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    missing: &mut Vec<String>,
) -> String {
    match lookup(name) {
        Some(v) if !v.is_empty() => v,
        _ => {
            missing.push(name.to_string());
            String::new()
        }
    }
}

fn get_parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
    invalid: &mut Vec<(String, String)>,
) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) if !raw.is_empty() => raw.parse::<T>().unwrap_or_else(|e| {
            invalid.push((name.to_string(), e.to_string()));
            default
        }),
        _ => default,
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads every variable before failing so one error lists all problems.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut invalid = Vec::new();

        let database_url = get_required(&lookup, "DATABASE_URL", &mut missing);
        let token_encryption_key = get_required(&lookup, "TOKEN_ENCRYPTION_KEY", &mut missing);
        let tool_webhook_base_url = get_required(&lookup, "TOOL_WEBHOOK_BASE_URL", &mut missing);

        if !token_encryption_key.is_empty()
            && (token_encryption_key.len() != 64
                || !token_encryption_key.chars().all(|c| c.is_ascii_hexdigit()))
        {
            invalid.push((
                "TOKEN_ENCRYPTION_KEY".into(),
                "must be 64 hex characters".into(),
            ));
        }

        if !tool_webhook_base_url.is_empty() {
            if let Err(e) = url::Url::parse(&tool_webhook_base_url) {
                invalid.push(("TOOL_WEBHOOK_BASE_URL".into(), e.to_string()));
            }
        }

        let port = get_parsed(&lookup, "PORT", 8080u16, &mut invalid);
        let cache_ttl_secs = get_parsed(&lookup, "CACHE_TTL_SECS", 60u64, &mut invalid);

        let analytics_scheduler = lookup("ANALYTICS_SCHEDULER").unwrap_or_default();
        let log_format = lookup("LOG_FORMAT").unwrap_or_else(|| "text".into());

        if !missing.is_empty() || !invalid.is_empty() {
            return Err(ConfigError {
                missing_vars: missing,
                invalid_vars: invalid,
            });
        }

        Ok(Self {
            database_url,
            token_encryption_key,
            tool_webhook_base_url: tool_webhook_base_url.trim_end_matches('/').to_string(),
            analytics_scheduler,
            log_format,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            port,
        })
    }

    pub fn is_analytics_scheduler_active(&self) -> bool {
        self.analytics_scheduler == "ACTIVE"
    }

    pub fn is_json_logging(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/voicebuilder"),
            ("TOKEN_ENCRYPTION_KEY", KEY),
            ("TOOL_WEBHOOK_BASE_URL", "https://hooks.example.com/"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.tool_webhook_base_url, "https://hooks.example.com");
        assert!(!config.is_analytics_scheduler_active());
        assert!(!config.is_json_logging());
    }

    #[test]
    fn test_reports_every_problem_at_once() {
        let err = load(&[("TOKEN_ENCRYPTION_KEY", "short"), ("PORT", "eighty")]).unwrap_err();

        assert_eq!(err.missing_vars, vec!["DATABASE_URL", "TOOL_WEBHOOK_BASE_URL"]);
        let invalid: Vec<&str> = err.invalid_vars.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(invalid, vec!["TOKEN_ENCRYPTION_KEY", "PORT"]);

        let message = err.to_string();
        assert!(message.contains("DATABASE_URL"));
        assert!(message.contains("PORT"));
    }

    #[test]
    fn test_flags() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/voicebuilder"),
            ("TOKEN_ENCRYPTION_KEY", KEY),
            ("TOOL_WEBHOOK_BASE_URL", "https://hooks.example.com"),
            ("ANALYTICS_SCHEDULER", "ACTIVE"),
            ("LOG_FORMAT", "JSON"),
            ("CACHE_TTL_SECS", "0"),
        ])
        .unwrap();

        assert!(config.is_analytics_scheduler_active());
        assert!(config.is_json_logging());
        assert!(config.cache_ttl.is_zero());
    }
}
