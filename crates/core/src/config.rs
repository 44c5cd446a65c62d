use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::role::Role;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub assistant: AssistantConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
    /// Key under which the whole quotation list is stored.
    pub quotations_key: String,
}

#[derive(Clone, Debug)]
pub struct AssistantConfig {
    pub mode: AssistantMode,
    pub endpoint_url: Option<String>,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
    pub reply_delay_ms: u64,
    pub interrupt_delay_ms: u64,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub default_role: Role,
    pub chat_visibility: ChatVisibility,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantMode {
    Remote,
    Simulated,
}

/// Which canvas actions are allowed to surface in the chat transcript.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatVisibility {
    /// Visualization, date and location changes stay UI-only unless confirmed.
    #[default]
    Strict,
    Lenient,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub storage_url: Option<String>,
    pub log_level: Option<String>,
    pub assistant_mode: Option<AssistantMode>,
    pub assistant_endpoint_url: Option<String>,
    pub default_role: Option<Role>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                url: "sqlite://quotecanvas.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
                quotations_key: "savedQuotations".to_string(),
            },
            assistant: AssistantConfig {
                mode: AssistantMode::Simulated,
                endpoint_url: None,
                api_key: None,
                timeout_secs: 30,
                reply_delay_ms: 1_500,
                interrupt_delay_ms: 2_000,
            },
            session: SessionConfig {
                default_role: Role::Requestor,
                chat_visibility: ChatVisibility::Strict,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for AssistantMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "simulated" => Ok(Self::Simulated),
            other => Err(ConfigError::Validation(format!(
                "unsupported assistant mode `{other}` (expected remote|simulated)"
            ))),
        }
    }
}

impl std::str::FromStr for ChatVisibility {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(ConfigError::Validation(format!(
                "unsupported chat visibility `{other}` (expected strict|lenient)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("quotecanvas.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(storage) = patch.storage {
            if let Some(url) = storage.url {
                self.storage.url = url;
            }
            if let Some(max_connections) = storage.max_connections {
                self.storage.max_connections = max_connections;
            }
            if let Some(timeout_secs) = storage.timeout_secs {
                self.storage.timeout_secs = timeout_secs;
            }
            if let Some(quotations_key) = storage.quotations_key {
                self.storage.quotations_key = quotations_key;
            }
        }

        if let Some(assistant) = patch.assistant {
            if let Some(mode) = assistant.mode {
                self.assistant.mode = mode;
            }
            if let Some(endpoint_url) = assistant.endpoint_url {
                self.assistant.endpoint_url = Some(endpoint_url);
            }
            if let Some(api_key) = assistant.api_key {
                self.assistant.api_key = Some(api_key.into());
            }
            if let Some(timeout_secs) = assistant.timeout_secs {
                self.assistant.timeout_secs = timeout_secs;
            }
            if let Some(reply_delay_ms) = assistant.reply_delay_ms {
                self.assistant.reply_delay_ms = reply_delay_ms;
            }
            if let Some(interrupt_delay_ms) = assistant.interrupt_delay_ms {
                self.assistant.interrupt_delay_ms = interrupt_delay_ms;
            }
        }

        if let Some(session) = patch.session {
            if let Some(default_role) = session.default_role {
                self.session.default_role = parse_role("session.default_role", &default_role)?;
            }
            if let Some(chat_visibility) = session.chat_visibility {
                self.session.chat_visibility = chat_visibility;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("QUOTECANVAS_STORAGE_URL") {
            self.storage.url = value;
        }
        if let Some(value) = read_env("QUOTECANVAS_STORAGE_MAX_CONNECTIONS") {
            self.storage.max_connections =
                parse_u32("QUOTECANVAS_STORAGE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("QUOTECANVAS_STORAGE_TIMEOUT_SECS") {
            self.storage.timeout_secs = parse_u64("QUOTECANVAS_STORAGE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("QUOTECANVAS_STORAGE_QUOTATIONS_KEY") {
            self.storage.quotations_key = value;
        }

        if let Some(value) = read_env("QUOTECANVAS_ASSISTANT_MODE") {
            self.assistant.mode = value.parse()?;
        }
        if let Some(value) = read_env("QUOTECANVAS_ASSISTANT_ENDPOINT_URL") {
            self.assistant.endpoint_url = Some(value);
        }
        if let Some(value) = read_env("QUOTECANVAS_ASSISTANT_API_KEY") {
            self.assistant.api_key = Some(value.into());
        }
        if let Some(value) = read_env("QUOTECANVAS_ASSISTANT_TIMEOUT_SECS") {
            self.assistant.timeout_secs = parse_u64("QUOTECANVAS_ASSISTANT_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("QUOTECANVAS_SESSION_DEFAULT_ROLE") {
            self.session.default_role = parse_role("QUOTECANVAS_SESSION_DEFAULT_ROLE", &value)?;
        }
        if let Some(value) = read_env("QUOTECANVAS_SESSION_CHAT_VISIBILITY") {
            self.session.chat_visibility = value.parse()?;
        }

        let log_level = read_env("QUOTECANVAS_LOGGING_LEVEL")
            .or_else(|| read_env("QUOTECANVAS_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("QUOTECANVAS_LOGGING_FORMAT")
            .or_else(|| read_env("QUOTECANVAS_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(storage_url) = overrides.storage_url {
            self.storage.url = storage_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(mode) = overrides.assistant_mode {
            self.assistant.mode = mode;
        }
        if let Some(endpoint_url) = overrides.assistant_endpoint_url {
            self.assistant.endpoint_url = Some(endpoint_url);
        }
        if let Some(default_role) = overrides.default_role {
            self.session.default_role = default_role;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_storage(&self.storage)?;
        validate_assistant(&self.assistant)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("quotecanvas.toml"), PathBuf::from("config/quotecanvas.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Expands `${VAR}` references; a missing variable is an error, not an empty string.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_storage(storage: &StorageConfig) -> Result<(), ConfigError> {
    let url = storage.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "storage.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if storage.max_connections == 0 {
        return Err(ConfigError::Validation(
            "storage.max_connections must be greater than zero".to_string(),
        ));
    }

    if storage.timeout_secs == 0 || storage.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "storage.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if storage.quotations_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "storage.quotations_key must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_assistant(assistant: &AssistantConfig) -> Result<(), ConfigError> {
    if assistant.timeout_secs == 0 || assistant.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "assistant.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if assistant.mode == AssistantMode::Remote {
        let endpoint = assistant.endpoint_url.as_deref().map(str::trim).unwrap_or_default();
        if endpoint.is_empty() {
            return Err(ConfigError::Validation(
                "assistant.endpoint_url is required when assistant.mode is `remote`".to_string(),
            ));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::Validation(
                "assistant.endpoint_url must start with http:// or https://".to_string(),
            ));
        }
    }

    if let Some(api_key) = &assistant.api_key {
        if api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "assistant.api_key must not be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_role(key: &str, value: &str) -> Result<Role, ConfigError> {
    value.parse::<Role>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    storage: Option<StoragePatch>,
    assistant: Option<AssistantPatch>,
    session: Option<SessionPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StoragePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
    quotations_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AssistantPatch {
    mode: Option<AssistantMode>,
    endpoint_url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
    reply_delay_ms: Option<u64>,
    interrupt_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    default_role: Option<String>,
    chat_visibility: Option<ChatVisibility>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
