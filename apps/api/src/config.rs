use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub enable_auto_placement: bool,
    pub placement_service_url: Option<String>,
    pub placement_service_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            enable_auto_placement: parse_flag(
                std::env::var("ENABLE_AUTO_PLACEMENT").ok().as_deref(),
            )
            .context("ENABLE_AUTO_PLACEMENT must be true/false")?,
            placement_service_url: optional_env("PLACEMENT_SERVICE_URL"),
            placement_service_token: optional_env("PLACEMENT_SERVICE_TOKEN"),
        })
    }

    /// Escalation needs both the flag and somewhere to send placements.
    pub fn placement_endpoint(&self) -> Option<&str> {
        if self.enable_auto_placement {
            self.placement_service_url.as_deref()
        } else {
            None
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => anyhow::bail!("unrecognised flag value '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool, url: Option<&str>) -> Config {
        Config {
            database_url: "postgres://localhost/linkmatch".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            enable_auto_placement: enabled,
            placement_service_url: url.map(str::to_string),
            placement_service_token: None,
        }
    }

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag(None).unwrap());
        assert!(parse_flag(Some("TRUE")).unwrap());
        assert!(parse_flag(Some(" on ")).unwrap());
        assert!(!parse_flag(Some("0")).unwrap());
        assert!(parse_flag(Some("maybe")).is_err());
    }

    #[test]
    fn test_placement_requires_flag_and_url() {
        assert_eq!(config(false, Some("https://p.io")).placement_endpoint(), None);
        assert_eq!(config(true, None).placement_endpoint(), None);
        assert_eq!(
            config(true, Some("https://p.io")).placement_endpoint(),
            Some("https://p.io")
        );
    }
}
