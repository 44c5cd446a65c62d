use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::action::{ActionSource, CanvasAction};
use crate::canvas::protocol::action_to_message;
use crate::canvas::state::{CanvasState, CanvasTab};
use crate::config::ChatVisibility;
use crate::domain::chat::ChatMessage;
use crate::domain::toast::Toast;

const CHAT_TOAST_TITLE: &str = "Canvas update";
const SILENT_TOAST_TITLE: &str = "Canvas updated";

/// What the chat surface should show after an action was applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub chat_message: Option<ChatMessage>,
    pub toast: Toast,
}

/// Owns canvas state and decides which actions are worth a transcript entry.
#[derive(Clone, Debug, Default)]
pub struct CanvasCoordinator {
    state: CanvasState,
    visibility: ChatVisibility,
}

impl CanvasCoordinator {
    pub fn new(visibility: ChatVisibility) -> Self {
        Self { state: CanvasState::default(), visibility }
    }

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn visibility(&self) -> ChatVisibility {
        self.visibility
    }

    /// Switches the visible tab without touching the rest of the state.
    pub fn open_tab(&mut self, tab: CanvasTab) {
        self.state.active_tab = tab;
    }

    pub fn handle(&mut self, action: &CanvasAction) -> ActionOutcome {
        self.state.apply(action);

        let message = action_to_message(action);
        let visible = self.is_chat_visible(action);
        debug!(
            event_name = "canvas.action.applied",
            action_type = %action.action_type(),
            source = ?action.source,
            chat_visible = visible,
            active_tab = self.state.active_tab.as_str(),
            "canvas action applied"
        );

        if visible {
            ActionOutcome {
                chat_message: Some(ChatMessage::assistant(message.clone())),
                toast: Toast::info(CHAT_TOAST_TITLE, message),
            }
        } else {
            ActionOutcome { chat_message: None, toast: Toast::info(SILENT_TOAST_TITLE, message) }
        }
    }

    pub fn is_chat_visible(&self, action: &CanvasAction) -> bool {
        if action.silent {
            return false;
        }
        if action.source != ActionSource::Chat && !action.confirmed {
            return false;
        }

        match self.visibility {
            ChatVisibility::Strict => action.confirmed || !action.action_type().is_ui_feedback(),
            ChatVisibility::Lenient => true,
        }
    }
}
