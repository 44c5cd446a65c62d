use quotecanvas_core::canvas::{action_to_message, message_to_action};
use serde_json::json;

use crate::commands::CommandResult;

/// Shows which canvas action, if any, a chat message would trigger.
pub fn run(text: &str) -> CommandResult {
    match message_to_action(text) {
        Some(action) => CommandResult::success_with_data(
            "intent",
            action_to_message(&action),
            json!({ "action": action }),
        ),
        None => CommandResult::success_with_data(
            "intent",
            "no canvas action",
            json!({ "action": null }),
        ),
    }
}
