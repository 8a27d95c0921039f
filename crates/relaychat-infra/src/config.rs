//! Relay configuration loader.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults ([`RelaySettings::default()`])
//! 2. `relaychat.toml` (explicit `--config` path, or the working directory)
//! 3. `.env` in the working directory (never overrides real env vars)
//! 4. Process environment
//!
//! Unlike most settings files, a broken or incomplete relay config is fatal:
//! the relay must not start sending unauthenticated or misdirected requests.

use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use secrecy::SecretString;

use relaychat_types::config::{FallbackMessages, MessageLimit, RelaySettings, TURN_MESSAGES};
use relaychat_types::error::ConfigError;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "relaychat.toml";

pub const ENV_WEBHOOK_URL: &str = "WEBHOOK_URL";
pub const ENV_BEARER_TOKEN: &str = "BEARER_TOKEN";
pub const ENV_MAX_MESSAGES: &str = "MAX_MESSAGES";
pub const ENV_CAP_UNIT: &str = "MESSAGE_CAP_UNIT";
pub const ENV_CONNECT_TIMEOUT: &str = "CONNECT_TIMEOUT_SECONDS";
pub const ENV_READ_TIMEOUT: &str = "TIMEOUT_SECONDS";
pub const ENV_IDLE_TTL: &str = "CONVERSATION_IDLE_TTL_SECONDS";

/// Validated configuration, read-only for the life of the process.
#[derive(Debug)]
pub struct RelayConfig {
    pub webhook_url: Url,
    pub bearer_token: SecretString,
    pub limit: MessageLimit,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Idle time after which the HTTP server forgets a conversation.
    pub idle_ttl: Duration,
    pub fallback: FallbackMessages,
}

/// Load `.env` from the working directory into the process environment.
///
/// Existing variables win. A missing file is not an error. Call this before
/// parsing CLI arguments so env-backed flags (`RELAYCHAT_CONFIG`) see it.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => tracing::debug!("No .env file found"),
        Err(err) => tracing::warn!("Failed to load .env: {err}"),
    }
}

/// Read a settings file.
///
/// When `required` is false a missing file yields the defaults; when true
/// (the user named the file explicitly) it is an error.
pub async fn load_settings_file(path: &Path, required: bool) -> Result<RelaySettings, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(RelaySettings::default());
        }
        Err(err) => {
            return Err(ConfigError::Io {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    toml::from_str::<RelaySettings>(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Merge file settings with environment values and validate the result.
///
/// `env` looks up a variable by name; pass `|k| std::env::var(k).ok()` in
/// production. Blank values count as unset.
pub fn resolve_config<F>(settings: RelaySettings, env: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let webhook_url = lookup(ENV_WEBHOOK_URL)
        .or(settings.webhook_url)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(ENV_WEBHOOK_URL))?;
    let webhook_url = parse_webhook_url(webhook_url.trim())?;

    let bearer_token = lookup(ENV_BEARER_TOKEN)
        .or(settings.bearer_token)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(ENV_BEARER_TOKEN))?;

    let max_messages = match lookup(ENV_MAX_MESSAGES) {
        Some(raw) => parse_number::<u32>(ENV_MAX_MESSAGES, &raw)?,
        None => settings.max_messages,
    };

    let cap_unit = match lookup(ENV_CAP_UNIT) {
        Some(raw) => raw.parse().map_err(|message| ConfigError::Invalid {
            key: ENV_CAP_UNIT,
            message,
        })?,
        None => settings.cap_unit,
    };

    let limit = MessageLimit::new(max_messages, cap_unit);
    if limit.message_cap() < TURN_MESSAGES {
        return Err(ConfigError::Invalid {
            key: ENV_MAX_MESSAGES,
            message: format!(
                "a cap of {max_messages} {cap_unit} leaves no room for a single turn"
            ),
        });
    }

    let connect_timeout_secs = match lookup(ENV_CONNECT_TIMEOUT) {
        Some(raw) => parse_number::<u64>(ENV_CONNECT_TIMEOUT, &raw)?,
        None => settings.connect_timeout_secs,
    };
    let read_timeout_secs = match lookup(ENV_READ_TIMEOUT) {
        Some(raw) => parse_number::<u64>(ENV_READ_TIMEOUT, &raw)?,
        None => settings.read_timeout_secs,
    };
    let idle_ttl_secs = match lookup(ENV_IDLE_TTL) {
        Some(raw) => parse_number::<u64>(ENV_IDLE_TTL, &raw)?,
        None => settings.idle_ttl_secs,
    };
    for (key, secs) in [
        (ENV_CONNECT_TIMEOUT, connect_timeout_secs),
        (ENV_READ_TIMEOUT, read_timeout_secs),
        (ENV_IDLE_TTL, idle_ttl_secs),
    ] {
        if secs == 0 {
            return Err(ConfigError::Invalid {
                key,
                message: "must be at least 1 second".to_string(),
            });
        }
    }

    Ok(RelayConfig {
        webhook_url,
        bearer_token: SecretString::from(bearer_token),
        limit,
        connect_timeout: Duration::from_secs(connect_timeout_secs),
        read_timeout: Duration::from_secs(read_timeout_secs),
        idle_ttl: Duration::from_secs(idle_ttl_secs),
        fallback: settings.fallback,
    })
}

/// Full startup load: settings file, then the process environment.
///
/// Expects [`load_dotenv`] to have run already.
pub async fn load_relay_config(config_path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let settings = match config_path {
        Some(path) => load_settings_file(path, true).await?,
        None => load_settings_file(Path::new(DEFAULT_CONFIG_FILE), false).await?,
    };

    let config = resolve_config(settings, |key| std::env::var(key).ok())?;
    tracing::info!(
        endpoint = %redacted_endpoint(&config.webhook_url),
        max_messages = config.limit.max_messages,
        cap_unit = %config.limit.unit,
        "Relay configuration loaded"
    );
    Ok(config)
}

/// Scheme, host, port, and path of a URL; drops credentials and query.
pub fn redacted_endpoint(url: &Url) -> String {
    let mut label = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        label.push_str(&format!(":{port}"));
    }
    label.push_str(url.path());
    label
}

fn parse_webhook_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key: ENV_WEBHOOK_URL,
        message: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            key: ENV_WEBHOOK_URL,
            message: format!("unsupported scheme '{other}' (expected http or https)"),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        message: format!("'{raw}' is not a valid number: {e}"),
    })
}
