use std::path::PathBuf;

use anyhow::Result;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    /// Plain-text candidate profile consumed verbatim by the scoring prompts.
    pub profile_path: PathBuf,
    /// SMTP settings for the digest. Optional — scrape/match runs don't need them.
    pub smtp: Option<SmtpConfig>,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub sender: String,
    pub app_password: String,
    pub recipients: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            profile_path: std::env::var("PROFILE_PATH")
                .unwrap_or_else(|_| "data/profile.txt".to_string())
                .into(),
            smtp: SmtpConfig::from_env(),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl SmtpConfig {
    /// Returns `None` unless all three email variables are set.
    fn from_env() -> Option<Self> {
        let sender = std::env::var("GMAIL_ADDRESS").ok()?;
        let app_password = std::env::var("GMAIL_APP_PASSWORD").ok()?;
        let recipients = parse_recipients(&std::env::var("NOTIFY_EMAIL").ok()?);
        if recipients.is_empty() {
            return None;
        }
        Some(SmtpConfig {
            sender,
            app_password,
            recipients,
        })
    }
}

fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn require_env(key: &str) -> Result<String> {
    use anyhow::Context;
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipients_splits_and_trims() {
        let recipients = parse_recipients("a@example.com, b@example.com ,");
        assert_eq!(recipients, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn test_parse_recipients_empty_input() {
        assert!(parse_recipients("  ").is_empty());
    }
}
