use std::env;
use std::sync::{Mutex, OnceLock};

use quotecanvas_cli::commands::quotes::QuotesCommand;
use quotecanvas_cli::commands::{chat, doctor, intent, quotes};
use quotecanvas_core::domain::role::Role;
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn intent_reports_visualization_action() {
    let result = intent::run("show me a bar chart of sales");
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "intent");
    assert_eq!(payload["data"]["action"]["type"], "visualization");
    assert_eq!(payload["data"]["action"]["payload"]["type"], "bar");
    assert_eq!(payload["data"]["action"]["payload"]["dataType"], "sales");
}

#[test]
fn intent_reports_null_for_small_talk() {
    let payload = parse_payload(&intent::run("hello").output);
    assert_eq!(payload["status"], "ok");
    assert!(payload["data"]["action"].is_null());
}

#[test]
fn doctor_passes_with_in_memory_storage() {
    with_env(&[("QUOTECANVAS_STORAGE_URL", "sqlite::memory:")], || {
        let report: Value =
            serde_json::from_str(&doctor::run(true)).expect("doctor output should be JSON");
        assert_eq!(report["overall_status"], "pass");
        assert_eq!(report["checks"].as_array().map(Vec::len), Some(3));
    });
}

#[test]
fn doctor_skips_checks_when_config_is_invalid() {
    with_env(&[("QUOTECANVAS_ASSISTANT_MODE", "remote")], || {
        let report: Value =
            serde_json::from_str(&doctor::run(true)).expect("doctor output should be JSON");
        assert_eq!(report["overall_status"], "fail");
        assert_eq!(report["checks"][0]["status"], "fail");
        assert_eq!(report["checks"][1]["status"], "skipped");
    });
}

#[test]
fn quotes_lifecycle_round_trips_through_sqlite() {
    let dir = TempDir::new().expect("temp dir");
    let storage_url = format!("sqlite://{}", dir.path().join("quotes.db").display());

    with_env(&[("QUOTECANVAS_STORAGE_URL", storage_url.as_str())], || {
        let generated = quotes::run(QuotesCommand::Generate {
            requirements: "Need quarterly fire safety checks for a 12-storey building.".to_string(),
            categories: vec!["Fire Safety Checks".to_string()],
            role: None,
            seed: Some(42),
        });
        assert_eq!(generated.exit_code, 0, "{}", generated.output);
        let payload = parse_payload(&generated.output);
        assert_eq!(payload["command"], "quotes.generate");
        assert_eq!(payload["data"]["quotation"]["status"], "draft");
        assert_eq!(payload["data"]["quotation"]["ownerRole"], "requestor");
        let id = payload["data"]["quotation"]["id"].as_str().unwrap_or_default().to_string();
        assert!(id.starts_with("QT-"));

        let submitted = quotes::run(QuotesCommand::Submit { id: id.clone() });
        assert_eq!(parse_payload(&submitted.output)["data"]["quotation"]["status"], "pending");

        let pending = parse_payload(
            &quotes::run(QuotesCommand::List { scope: None, role: Some("approver".to_string()) })
                .output,
        );
        assert_eq!(pending["data"]["scope"], "pending");
        assert_eq!(pending["data"]["quotations"].as_array().map(Vec::len), Some(1));

        let approved = quotes::run(QuotesCommand::Approve {
            id: id.clone(),
            notes: Some("Within budget".to_string()),
        });
        let approved = parse_payload(&approved.output);
        assert_eq!(approved["data"]["quotation"]["status"], "approved");
        assert_eq!(approved["data"]["quotation"]["approverNotes"], "Within budget");

        let out = dir.path().join("quote.html");
        let exported = quotes::run(QuotesCommand::Export { id: id.clone(), out: out.clone() });
        assert_eq!(exported.exit_code, 0, "{}", exported.output);
        let html = std::fs::read_to_string(&out).expect("exported html");
        assert!(html.contains(&id));

        let archived = quotes::run(QuotesCommand::Archive { id: id.clone() });
        assert_eq!(parse_payload(&archived.output)["data"]["quotation"]["status"], "archived");

        let cleared = quotes::run(QuotesCommand::Clear);
        assert_eq!(cleared.exit_code, 0);
        let shown = quotes::run(QuotesCommand::Show { id });
        assert_eq!(shown.exit_code, 7);
        assert_eq!(parse_payload(&shown.output)["error_class"], "not_found");
    });
}

#[test]
fn draft_guards_apply_to_archive_and_delete() {
    let dir = TempDir::new().expect("temp dir");
    let storage_url = format!("sqlite://{}", dir.path().join("quotes.db").display());

    with_env(&[("QUOTECANVAS_STORAGE_URL", storage_url.as_str())], || {
        let generated = parse_payload(
            &quotes::run(QuotesCommand::Generate {
                requirements: "Deep clean the level 3 pantry".to_string(),
                categories: vec!["Deep Cleaning".to_string()],
                role: None,
                seed: Some(7),
            })
            .output,
        );
        let id = generated["data"]["quotation"]["id"].as_str().unwrap_or_default().to_string();

        let result = quotes::run(QuotesCommand::Archive { id: id.clone() });
        assert_eq!(result.exit_code, 6);
        assert_eq!(parse_payload(&result.output)["error_class"], "bad_request");

        let listed = parse_payload(&quotes::run(QuotesCommand::List { scope: None, role: None }).output);
        assert_eq!(listed["data"]["scope"], "all");
        assert_eq!(listed["data"]["quotations"][0]["id"], id.as_str());

        let refused = quotes::run(QuotesCommand::Delete {
            id: id.clone(),
            role: Some("approver".to_string()),
        });
        assert_eq!(refused.exit_code, 6);

        let deleted = quotes::run(QuotesCommand::Delete { id: id.clone(), role: None });
        assert_eq!(deleted.exit_code, 0, "{}", deleted.output);
        assert_eq!(quotes::run(QuotesCommand::Show { id }).exit_code, 7);
    });
}

#[test]
fn generate_without_selection_fails_validation() {
    with_env(&[("QUOTECANVAS_STORAGE_URL", "sqlite::memory:")], || {
        let result = quotes::run(QuotesCommand::Generate {
            requirements: "Repaint the car park".to_string(),
            categories: Vec::new(),
            role: None,
            seed: Some(1),
        });
        assert_eq!(result.exit_code, 6);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert!(payload["message"].as_str().unwrap_or_default().contains("at least one SOR item"));
    });
}

#[test]
fn quotes_report_config_failure() {
    with_env(&[("QUOTECANVAS_STORAGE_TIMEOUT_SECS", "soon")], || {
        let result = quotes::run(QuotesCommand::List { scope: None, role: None });
        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
    });
}

#[test]
fn chat_opens_data_tab_and_raises_focus_interrupt() {
    with_env(&[], || {
        let result = chat::run("show me a bar chart of sales", Some(Role::Approver), true);
        assert_eq!(result.exit_code, 0, "{}", result.output);

        let payload = parse_payload(&result.output);
        assert!(payload["message"]
            .as_str()
            .unwrap_or_default()
            .starts_with("I can help with your data analysis."));
        assert_eq!(payload["data"]["role"], "approver");
        assert_eq!(payload["data"]["backend"], "simulated");
        assert_eq!(payload["data"]["canvas"]["activeTab"], "data");
        assert_eq!(payload["data"]["pending_interrupt"]["title"], "Select Analysis Focus");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "QUOTECANVAS_STORAGE_URL",
        "QUOTECANVAS_STORAGE_MAX_CONNECTIONS",
        "QUOTECANVAS_STORAGE_TIMEOUT_SECS",
        "QUOTECANVAS_STORAGE_QUOTATIONS_KEY",
        "QUOTECANVAS_ASSISTANT_MODE",
        "QUOTECANVAS_ASSISTANT_ENDPOINT_URL",
        "QUOTECANVAS_ASSISTANT_API_KEY",
        "QUOTECANVAS_ASSISTANT_TIMEOUT_SECS",
        "QUOTECANVAS_SESSION_DEFAULT_ROLE",
        "QUOTECANVAS_SESSION_CHAT_VISIBILITY",
        "QUOTECANVAS_LOGGING_LEVEL",
        "QUOTECANVAS_LOGGING_FORMAT",
        "QUOTECANVAS_LOG_LEVEL",
        "QUOTECANVAS_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
