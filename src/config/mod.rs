use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_inline_default::serde_inline_default;

#[serde_inline_default]
#[derive(Deserialize, Clone)]
pub struct Config {
    #[serde_inline_default("0.0.0.0".to_string())]
    pub app_host: String,
    #[serde_inline_default(8080)]
    pub port: u16,
    #[serde_inline_default("info".to_string())]
    pub rust_log: String,
    pub slack_channel: Option<String>,
    pub slack_token: Option<String>,
    #[serde_inline_default("https://slack.com/api".to_string())]
    pub slack_api_url: String,
    #[serde_inline_default(10)]
    pub fetch_timeout_secs: u64,
}

impl Config {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn notifier(&self) -> NotifierConfig {
        NotifierConfig {
            channel: self.slack_channel.clone(),
            token: self.slack_token.clone(),
            api_url: self.slack_api_url.clone(),
            timeout: self.fetch_timeout(),
        }
    }
}

// the token stays out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_host", &self.app_host)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .field("slack_channel", &self.slack_channel)
            .field("slack_token", &self.slack_token.as_ref().map(|_| "***"))
            .field("slack_api_url", &self.slack_api_url)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .finish()
    }
}

/// Notification settings handed to the Slack notifier at startup.
#[derive(Clone)]
pub struct NotifierConfig {
    pub channel: Option<String>,
    pub token: Option<String>,
    pub api_url: String,
    pub timeout: Duration,
}

impl NotifierConfig {
    /// Channel and token, only when both are set to something non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.channel.as_deref(), self.token.as_deref()) {
            (Some(channel), Some(token)) if !channel.is_empty() && !token.is_empty() => {
                Some((channel, token))
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("channel", &self.channel)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

static CONFIG: OnceCell<Config> = OnceCell::new();

fn load_config() -> Result<Config> {
    // a missing .env file is fine, the process environment is authoritative
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("failed to read .env file");
        }
    }
    envy::from_env::<Config>()
        .map_err(|e| anyhow!(e))
        .context(format!(
            "at {} line {} column {}",
            file!(),
            line!(),
            column!(),
        ))
}

/// Reads the configuration once; later calls return the same instance.
pub fn init() -> Result<&'static Config> {
    CONFIG.get_or_try_init(load_config)
}
