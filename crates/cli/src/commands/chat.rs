use std::time::Duration;

use chrono::Utc;
use quotecanvas_agent::ChatRuntime;
use quotecanvas_core::config::ConfigOverrides;
use quotecanvas_core::domain::role::Role;
use serde_json::json;

use crate::commands::session::{block_on, load_config, CommandError};
use crate::commands::CommandResult;

/// Sends one message through a fresh chat session and reports what the session looks like after.
///
/// `instant` drops the simulated reply and interrupt delays.
pub fn run(text: &str, role: Option<Role>, instant: bool) -> CommandResult {
    let config = match load_config(ConfigOverrides { default_role: role, ..ConfigOverrides::default() })
    {
        Ok(config) => config,
        Err(error) => return error.into_result("chat"),
    };

    block_on("chat", async move {
        let runtime = ChatRuntime::from_config(&config)
            .map_err(|error| CommandError::new("assistant_config", error.to_string(), 2))?;
        let mut runtime =
            if instant { runtime.with_delays(Duration::ZERO, Duration::ZERO) } else { runtime };

        let Some(reply) = runtime.send(text).await else {
            return Err(CommandError::new("bad_request", "message is empty", 6));
        };

        if instant {
            runtime.fire_due(Utc::now());
        } else {
            runtime.wait_for_scheduled().await;
        }

        Ok(CommandResult::success_with_data(
            "chat",
            reply.content,
            json!({
                "role": runtime.role(),
                "backend": runtime.backend().name(),
                "canvas_open": runtime.is_canvas_open(),
                "canvas": runtime.canvas_state(),
                "pending_interrupt": runtime.pending_interrupt(),
                "transcript": runtime.messages(),
                "toasts": runtime.drain_toasts(),
            }),
        ))
    })
}
