use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use quotecanvas_agent::QuotationWorkspace;
use quotecanvas_core::config::{AppConfig, ConfigOverrides};
use quotecanvas_core::domain::quotation::QuotationRecord;
use quotecanvas_core::domain::role::Role;
use quotecanvas_core::errors::{ApplicationError, DomainError};
use quotecanvas_core::export::PrintView;
use quotecanvas_core::generator::QuotationGenerator;
use quotecanvas_db::{DraftFilter, ListFilter, QuotationRepository};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use crate::commands::session::{block_on, load_config, open_repository, CommandError};
use crate::commands::CommandResult;

#[derive(Debug, Subcommand)]
pub enum QuotesCommand {
    #[command(about = "List quotations for a role (all|pending|archived|active|drafts)")]
    List {
        #[arg(long)]
        scope: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    #[command(about = "Show one quotation")]
    Show { id: String },
    #[command(about = "Generate a draft quotation from requirements and service categories")]
    Generate {
        #[arg(long)]
        requirements: String,
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long, help = "Seed for reproducible quantities, client and id")]
        seed: Option<u64>,
    },
    #[command(about = "Submit a draft for approval")]
    Submit { id: String },
    #[command(about = "Approve a pending quotation")]
    Approve {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    #[command(about = "Reject a pending quotation")]
    Reject {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    #[command(about = "Archive an approved or rejected quotation")]
    Archive { id: String },
    #[command(about = "Delete one of the role's own drafts")]
    Delete {
        id: String,
        #[arg(long)]
        role: Option<String>,
    },
    #[command(about = "Write the printable HTML view of a quotation")]
    Export {
        id: String,
        #[arg(long)]
        out: PathBuf,
    },
    #[command(about = "Remove every stored quotation")]
    Clear,
}

impl QuotesCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "quotes.list",
            Self::Show { .. } => "quotes.show",
            Self::Generate { .. } => "quotes.generate",
            Self::Submit { .. } => "quotes.submit",
            Self::Approve { .. } => "quotes.approve",
            Self::Reject { .. } => "quotes.reject",
            Self::Archive { .. } => "quotes.archive",
            Self::Delete { .. } => "quotes.delete",
            Self::Export { .. } => "quotes.export",
            Self::Clear => "quotes.clear",
        }
    }
}

pub fn run(command: QuotesCommand) -> CommandResult {
    let name = command.name();
    let config = match load_config(ConfigOverrides::default()) {
        Ok(config) => config,
        Err(error) => return error.into_result(name),
    };

    block_on(name, execute(name, command, config))
}

async fn execute(
    name: &'static str,
    command: QuotesCommand,
    config: AppConfig,
) -> Result<CommandResult, CommandError> {
    let repository = open_repository(&config).await?;
    let default_role = config.session.default_role;

    match command {
        QuotesCommand::List { scope, role } => {
            let role = parse_role(role.as_deref(), default_role)?;
            let filter = match scope {
                Some(scope) => scope.parse::<ListFilter>().map_err(domain_error)?,
                None => ListFilter::from(role.list_scope()),
            };
            let records = repository.list(filter, &DraftFilter::for_role(role)).await;
            Ok(CommandResult::success_with_data(
                name,
                format!("{} quotation(s) in scope `{}`", records.len(), filter.as_str()),
                json!({ "role": role, "scope": filter.as_str(), "quotations": records }),
            ))
        }
        QuotesCommand::Show { id } => {
            let record = find(&repository, &id).await?;
            Ok(record_result(name, format!("quotation {id}"), &record))
        }
        QuotesCommand::Generate { requirements, categories, role, seed } => {
            let role = parse_role(role.as_deref(), default_role)?;
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let mut workspace = QuotationWorkspace::new(repository, QuotationGenerator::new(rng), role);
            workspace.create_new();
            workspace.set_requirements(requirements);
            workspace.set_categories(categories);
            let record = workspace.generate(Utc::now()).await?;

            Ok(record_result(
                name,
                format!("generated draft {}", record.id_str().unwrap_or_default()),
                &record,
            ))
        }
        QuotesCommand::Submit { id } => {
            let outcome = repository.submit_for_approval(&id).await;
            transitioned(name, &id, "submitted for approval", outcome)
        }
        QuotesCommand::Approve { id, notes } => {
            let outcome = repository.approve(&id, notes).await;
            transitioned(name, &id, "approved", outcome)
        }
        QuotesCommand::Reject { id, notes } => {
            let outcome = repository.reject(&id, notes).await;
            transitioned(name, &id, "rejected", outcome)
        }
        QuotesCommand::Archive { id } => {
            let outcome = repository.archive(&id).await;
            transitioned(name, &id, "archived", outcome)
        }
        QuotesCommand::Delete { id, role } => {
            let role = parse_role(role.as_deref(), default_role)?;
            let outcome = repository.delete(&id, &DraftFilter::for_role(role)).await;
            transitioned(name, &id, "deleted", outcome)
        }
        QuotesCommand::Export { id, out } => {
            let record = find(&repository, &id).await?;
            let html = PrintView::new()
                .and_then(|view| view.render(&record))
                .map_err(|error| CommandError::new("export", error.to_string(), 10))?;
            tokio::fs::write(&out, html)
                .await
                .map_err(|error| CommandError::new("io", error.to_string(), 11))?;

            Ok(CommandResult::success_with_data(
                name,
                format!("quotation {id} written to {}", out.display()),
                json!({ "id": id, "path": out }),
            ))
        }
        QuotesCommand::Clear => {
            if repository.clear().await {
                Ok(CommandResult::success(name, "all quotations removed"))
            } else {
                Err(CommandError::new("storage", "quotation store could not be cleared", 8))
            }
        }
    }
}

fn parse_role(raw: Option<&str>, default: Role) -> Result<Role, CommandError> {
    match raw {
        Some(raw) => raw.parse().map_err(domain_error),
        None => Ok(default),
    }
}

fn domain_error(error: DomainError) -> CommandError {
    CommandError::from(ApplicationError::from(error))
}

async fn find(repository: &QuotationRepository, id: &str) -> Result<QuotationRecord, CommandError> {
    repository
        .by_id(id)
        .await
        .ok_or_else(|| CommandError::from(ApplicationError::NotFound(id.to_string())))
}

fn transitioned(
    name: &str,
    id: &str,
    verb: &str,
    outcome: Result<Option<QuotationRecord>, DomainError>,
) -> Result<CommandResult, CommandError> {
    match outcome {
        Ok(Some(record)) => Ok(record_result(name, format!("quotation {id} {verb}"), &record)),
        Ok(None) => Err(ApplicationError::NotFound(id.to_string()).into()),
        Err(error) => Err(domain_error(error)),
    }
}

fn record_result(name: &str, message: String, record: &QuotationRecord) -> CommandResult {
    CommandResult::success_with_data(name, message, json!({ "quotation": record }))
}
