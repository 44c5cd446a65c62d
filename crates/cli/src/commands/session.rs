//! Shared plumbing for commands that need config, an async runtime, or the quotation store.

use std::future::Future;
use std::sync::Arc;

use quotecanvas_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use quotecanvas_core::errors::{ApplicationError, InterfaceError};
use quotecanvas_db::{
    connect_with_settings, migrations, QuotationRepository, QuotationStorage, SqliteKeyValueStore,
};
use tracing::info;

use crate::commands::CommandResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    pub error_class: &'static str,
    pub message: String,
    pub exit_code: u8,
}

impl CommandError {
    pub fn new(error_class: &'static str, message: impl Into<String>, exit_code: u8) -> Self {
        Self { error_class, message: message.into(), exit_code }
    }

    pub fn into_result(self, command: &str) -> CommandResult {
        CommandResult::failure(command, self.error_class, self.message, self.exit_code)
    }
}

impl From<ApplicationError> for CommandError {
    fn from(error: ApplicationError) -> Self {
        let interface = error.into_interface("cli");
        let exit_code = match &interface {
            InterfaceError::BadRequest { .. } => 6,
            InterfaceError::NotFound { .. } => 7,
            InterfaceError::ServiceUnavailable { .. } => 8,
            InterfaceError::Internal { .. } => 9,
        };
        let message = match &interface {
            InterfaceError::BadRequest { message, .. }
            | InterfaceError::NotFound { message, .. }
            | InterfaceError::ServiceUnavailable { message, .. }
            | InterfaceError::Internal { message, .. } => message.clone(),
        };
        Self { error_class: interface.error_class(), message, exit_code }
    }
}

pub fn load_config(overrides: ConfigOverrides) -> Result<AppConfig, CommandError> {
    AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }).map_err(|error| {
        CommandError::new("config_validation", format!("configuration issue: {error}"), 2)
    })
}

/// Runs one command future on a current-thread runtime.
pub fn block_on<F>(command: &str, future: F) -> CommandResult
where
    F: Future<Output = Result<CommandResult, CommandError>>,
{
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    runtime.block_on(future).unwrap_or_else(|error| error.into_result(command))
}

/// Connects, applies migrations and wires the quotation store onto the configured key.
pub async fn open_repository(config: &AppConfig) -> Result<QuotationRepository, CommandError> {
    let pool = connect_with_settings(
        &config.storage.url,
        config.storage.max_connections,
        config.storage.timeout_secs,
    )
    .await
    .map_err(|error| CommandError::new("db_connectivity", error.to_string(), 4))?;

    migrations::run_pending(&pool)
        .await
        .map_err(|error| CommandError::new("migration", error.to_string(), 5))?;

    info!(
        event_name = "system.storage.ready",
        storage_url = %config.storage.url,
        quotations_key = %config.storage.quotations_key,
        "quotation storage ready"
    );

    let store = Arc::new(SqliteKeyValueStore::new(pool));
    Ok(QuotationRepository::new(QuotationStorage::new(store, config.storage.quotations_key.clone())))
}
