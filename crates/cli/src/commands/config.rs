use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use quotecanvas_core::config::{AppConfig, LoadOptions};
use toml::Value;

struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in effective_fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    lines.join("\n")
}

fn effective_fields(config: &AppConfig) -> Vec<Field> {
    let field = |key_path: &'static str, env_keys: &'static [&'static str], value: String| Field {
        key_path,
        env_keys,
        value,
    };

    vec![
        field("storage.url", &["QUOTECANVAS_STORAGE_URL"], config.storage.url.clone()),
        field(
            "storage.max_connections",
            &["QUOTECANVAS_STORAGE_MAX_CONNECTIONS"],
            config.storage.max_connections.to_string(),
        ),
        field(
            "storage.timeout_secs",
            &["QUOTECANVAS_STORAGE_TIMEOUT_SECS"],
            config.storage.timeout_secs.to_string(),
        ),
        field(
            "storage.quotations_key",
            &["QUOTECANVAS_STORAGE_QUOTATIONS_KEY"],
            config.storage.quotations_key.clone(),
        ),
        field(
            "assistant.mode",
            &["QUOTECANVAS_ASSISTANT_MODE"],
            format!("{:?}", config.assistant.mode),
        ),
        field(
            "assistant.endpoint_url",
            &["QUOTECANVAS_ASSISTANT_ENDPOINT_URL"],
            config.assistant.endpoint_url.clone().unwrap_or_else(|| "<unset>".to_string()),
        ),
        field(
            "assistant.api_key",
            &["QUOTECANVAS_ASSISTANT_API_KEY"],
            if config.assistant.api_key.is_some() { "<redacted>" } else { "<unset>" }.to_string(),
        ),
        field(
            "assistant.timeout_secs",
            &["QUOTECANVAS_ASSISTANT_TIMEOUT_SECS"],
            config.assistant.timeout_secs.to_string(),
        ),
        field("assistant.reply_delay_ms", &[], config.assistant.reply_delay_ms.to_string()),
        field("assistant.interrupt_delay_ms", &[], config.assistant.interrupt_delay_ms.to_string()),
        field(
            "session.default_role",
            &["QUOTECANVAS_SESSION_DEFAULT_ROLE"],
            config.session.default_role.to_string(),
        ),
        field(
            "session.chat_visibility",
            &["QUOTECANVAS_SESSION_CHAT_VISIBILITY"],
            format!("{:?}", config.session.chat_visibility),
        ),
        field(
            "logging.level",
            &["QUOTECANVAS_LOGGING_LEVEL", "QUOTECANVAS_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        field(
            "logging.format",
            &["QUOTECANVAS_LOGGING_FORMAT", "QUOTECANVAS_LOG_FORMAT"],
            format!("{:?}", config.logging.format),
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    ["quotecanvas.toml", "config/quotecanvas.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
