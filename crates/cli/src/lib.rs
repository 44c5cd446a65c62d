pub mod commands;

use clap::{Parser, Subcommand};
use quotecanvas_core::config::{AppConfig, LoadOptions, LogFormat};
use quotecanvas_core::domain::role::Role;
use std::process::ExitCode;

use commands::quotes::QuotesCommand;

#[derive(Debug, Parser)]
#[command(
    name = "quotecanvas",
    about = "QuoteCanvas operator CLI",
    long_about = "Inspect configuration, manage stored quotations, and drive the chat assistant from the terminal.",
    after_help = "Examples:\n  quotecanvas doctor --json\n  quotecanvas quotes generate --requirements \"Quarterly fire safety checks\" --category \"Fire Safety Checks\"\n  quotecanvas chat \"show me a bar chart of sales\" --instant"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, assistant readiness, and storage connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(subcommand, about = "Quotation lifecycle and export")]
    Quotes(QuotesCommand),
    #[command(about = "Send one chat message and print the resulting session")]
    Chat {
        text: String,
        #[arg(long, help = "Role to chat as (requestor, approver, itAdmin, erpAdmin, seniorManagement)")]
        role: Option<String>,
        #[arg(long, help = "Skip simulated reply and interrupt delays")]
        instant: bool,
    },
    #[command(about = "Show the canvas action a chat message would trigger")]
    Intent { text: String },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        if let Err(error) = init_logging(&config) {
            eprintln!("logging disabled: {error:#}");
        }
    }

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Quotes(command) => commands::quotes::run(command),
        Command::Chat { text, role, instant } => {
            match role.map(|role| role.parse::<Role>()).transpose() {
                Ok(role) => commands::chat::run(&text, role, instant),
                Err(error) => {
                    commands::CommandResult::failure("chat", "bad_request", error.to_string(), 6)
                }
            }
        }
        Command::Intent { text } => commands::intent::run(&text),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout stays a single JSON payload.
pub fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    use anyhow::Context;
    use tracing::Level;

    let log_level = config
        .logging
        .level
        .parse::<Level>()
        .with_context(|| format!("unknown log level `{}`", config.logging.level))?;
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow::anyhow!("{error}")).context("failed to install tracing subscriber")
}
