//! Chat orchestration: transcript, canvas sync, assistant replies and interrupts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, error, info};

use quotecanvas_core::canvas::{
    message_to_action, CanvasAction, CanvasCoordinator, CanvasPayload, CanvasState, ChartKind,
    DataType, Location,
};
use quotecanvas_core::config::{AppConfig, AssistantMode, ChatVisibility};
use quotecanvas_core::domain::chat::ChatMessage;
use quotecanvas_core::domain::role::Role;
use quotecanvas_core::domain::toast::Toast;
use quotecanvas_core::interrupt::{Interrupt, InterruptAnswer, InterruptController, InterruptPreset};

use crate::prediction::{AssistantError, HttpPredictionClient, PredictionClient, ResponseFormat};
use crate::simulator::simulate_reply;

pub const ASSISTANT_FALLBACK_REPLY: &str =
    "I encountered an error while processing your request. Please try again later.";
const INTERRUPT_CANCELLED_REPLY: &str =
    "Interrupt cancelled. Let me know if you need anything else.";

#[derive(Clone)]
pub enum AssistantBackend {
    Remote(Arc<dyn PredictionClient>),
    Simulated,
}

impl AssistantBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Remote(_) => "remote",
            Self::Simulated => "simulated",
        }
    }
}

/// Marks a reply as in flight until dropped, so a cancelled turn does not leave it set.
struct ReplyInFlight(Arc<AtomicBool>);

impl ReplyInFlight {
    fn start(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for ReplyInFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone, Debug)]
struct ScheduledInterrupt {
    due_at: DateTime<Utc>,
    interrupt: Interrupt,
}

pub struct ChatRuntime {
    role: Role,
    backend: AssistantBackend,
    reply_delay: Duration,
    interrupt_delay: Duration,
    messages: Vec<ChatMessage>,
    canvas: CanvasCoordinator,
    canvas_open: bool,
    interrupts: InterruptController,
    scheduled: Vec<ScheduledInterrupt>,
    toasts: Vec<Toast>,
    awaiting_reply: Arc<AtomicBool>,
}

impl ChatRuntime {
    /// Starts a session whose transcript opens with the role's welcome message.
    pub fn new(role: Role, backend: AssistantBackend, visibility: ChatVisibility) -> Self {
        Self {
            role,
            backend,
            reply_delay: Duration::ZERO,
            interrupt_delay: Duration::ZERO,
            messages: vec![ChatMessage::assistant(role.welcome_message())],
            canvas: CanvasCoordinator::new(visibility),
            canvas_open: false,
            interrupts: InterruptController::new(),
            scheduled: Vec::new(),
            toasts: Vec::new(),
            awaiting_reply: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_delays(mut self, reply_delay: Duration, interrupt_delay: Duration) -> Self {
        self.reply_delay = reply_delay;
        self.interrupt_delay = interrupt_delay;
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AssistantError> {
        let backend = match config.assistant.mode {
            AssistantMode::Remote => {
                AssistantBackend::Remote(Arc::new(HttpPredictionClient::from_config(&config.assistant)?))
            }
            AssistantMode::Simulated => AssistantBackend::Simulated,
        };

        Ok(Self::new(config.session.default_role, backend, config.session.chat_visibility)
            .with_delays(
                Duration::from_millis(config.assistant.reply_delay_ms),
                Duration::from_millis(config.assistant.interrupt_delay_ms),
            ))
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn backend(&self) -> &AssistantBackend {
        &self.backend
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn canvas_state(&self) -> &CanvasState {
        self.canvas.state()
    }

    pub fn is_canvas_open(&self) -> bool {
        self.canvas_open
    }

    pub fn set_canvas_open(&mut self, open: bool) {
        self.canvas_open = open;
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply.load(Ordering::SeqCst)
    }

    pub fn pending_interrupt(&self) -> Option<&Interrupt> {
        self.interrupts.current()
    }

    pub fn scheduled_interrupts(&self) -> usize {
        self.scheduled.len()
    }

    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    /// Handles one user turn and returns the assistant's reply. Blank input is ignored.
    pub async fn send(&mut self, text: &str) -> Option<ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::user(text));
        if let Some(action) = message_to_action(text) {
            self.apply_canvas_action(&action);
            self.canvas_open = true;
        }

        let in_flight = ReplyInFlight::start(&self.awaiting_reply);
        let reply = match self.backend.clone() {
            AssistantBackend::Remote(client) => self.remote_reply(client.as_ref(), text).await,
            AssistantBackend::Simulated => self.simulated_reply(text).await,
        };
        drop(in_flight);

        self.messages.push(reply.clone());
        Some(reply)
    }

    async fn remote_reply(&self, client: &dyn PredictionClient, text: &str) -> ChatMessage {
        match client.predict(text, self.role.session_key(), ResponseFormat::Text).await {
            Ok(reply) => ChatMessage::assistant(reply),
            Err(err) => {
                error!(
                    event_name = "chat.assistant.error",
                    role = self.role.as_str(),
                    error = %err,
                    "assistant backend failed"
                );
                ChatMessage::assistant(ASSISTANT_FALLBACK_REPLY)
            }
        }
    }

    async fn simulated_reply(&mut self, text: &str) -> ChatMessage {
        if !self.reply_delay.is_zero() {
            tokio::time::sleep(self.reply_delay).await;
        }

        let reply = simulate_reply(text);
        if let Some(tab) = reply.open_tab {
            self.canvas.open_tab(tab);
            self.canvas_open = true;
        }
        if let Some(interrupt) = reply.follow_up {
            self.schedule_interrupt(interrupt, Utc::now());
        }
        ChatMessage::assistant(reply.content)
    }

    fn schedule_interrupt(&mut self, interrupt: Interrupt, now: DateTime<Utc>) {
        let delay = TimeDelta::from_std(self.interrupt_delay).unwrap_or(TimeDelta::zero());
        debug!(
            event_name = "chat.interrupt.scheduled",
            title = interrupt.title(),
            delay_ms = self.interrupt_delay.as_millis() as u64,
            "interrupt scheduled"
        );
        self.scheduled.push(ScheduledInterrupt { due_at: now + delay, interrupt });
    }

    /// Raises every scheduled interrupt due at `now`; with several due, the latest wins.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> usize {
        let (mut due, waiting): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.scheduled).into_iter().partition(|s| s.due_at <= now);
        self.scheduled = waiting;

        let fired = due.len();
        due.sort_by_key(|scheduled| scheduled.due_at);
        for scheduled in due {
            self.trigger_interrupt(scheduled.interrupt);
        }
        fired
    }

    /// Sleeps until every scheduled interrupt is due, firing each in turn.
    pub async fn wait_for_scheduled(&mut self) {
        while let Some(next) = self.scheduled.iter().map(|s| s.due_at).min() {
            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
            self.fire_due(Utc::now().max(next));
        }
    }

    pub fn trigger_interrupt(&mut self, interrupt: Interrupt) {
        info!(event_name = "chat.interrupt.raised", title = interrupt.title(), "interrupt raised");
        if let Some(displaced) = self.interrupts.trigger(interrupt) {
            debug!(
                event_name = "chat.interrupt.displaced",
                title = displaced.title(),
                "pending interrupt replaced"
            );
        }
    }

    /// Raises a canvas preset by name; unknown names give the generic confirmation.
    pub fn trigger_preset(&mut self, name: &str) {
        let preset = name.parse().unwrap_or(InterruptPreset::Generic);
        let selected_date = self.canvas.state().selected_date;
        self.trigger_interrupt(Interrupt::preset(preset, selected_date));
    }

    /// Interprets the answer against the pending interrupt. Returns false when nothing was pending.
    pub fn answer_interrupt(&mut self, answer: InterruptAnswer) -> bool {
        let Some((interrupt, answer)) = self.interrupts.submit(answer) else {
            return false;
        };

        match &interrupt {
            Interrupt::Choice { title, .. } => {
                let value = answer_text(&answer);
                if title.contains("Quotation") {
                    self.apply_canvas_action(
                        &CanvasAction::from_chat(CanvasPayload::QuotationGeneration {
                            requirements: String::new(),
                            categories: Vec::new(),
                            quote_type: Some(value.clone()),
                            summary: Some(format!("Generating {value} quotation")),
                        })
                        .silenced(),
                    );
                    self.messages.push(ChatMessage::assistant(format!(
                        "I'll prepare a {value} quotation based on our schedule of rates. This will include all the standard items for this type of project, as well as any custom requirements you've mentioned."
                    )));
                } else {
                    if let Some(payload) = focus_visualization(&value) {
                        self.apply_canvas_action(&CanvasAction::from_chat(payload).silenced());
                    }
                    self.messages.push(ChatMessage::assistant(format!(
                        "Great! I'll focus my analysis on {value}. You can see updated visualizations in the canvas now."
                    )));
                }
            }
            Interrupt::Confirmation { title, .. } if answer != InterruptAnswer::Confirmed(false) => {
                if title.contains("Location") {
                    let location = Location {
                        lat: 34.05,
                        lng: -118.25,
                        name: Some("Confirmed location".to_string()),
                    };
                    self.apply_canvas_action(
                        &CanvasAction::from_chat(CanvasPayload::PositionChange {
                            location: Some(location),
                        })
                        .silenced(),
                    );
                } else if title.contains("Date") {
                    self.apply_canvas_action(
                        &CanvasAction::from_chat(CanvasPayload::DateSelection {
                            date: Some(Utc::now().date_naive()),
                        })
                        .silenced(),
                    );
                }
            }
            Interrupt::Confirmation { .. } | Interrupt::Custom { .. } => {}
        }

        self.toasts.push(Toast::info("Input received", "The AI will continue processing with your input."));
        true
    }

    pub fn cancel_interrupt(&mut self) -> bool {
        if self.interrupts.cancel().is_none() {
            return false;
        }
        self.messages.push(ChatMessage::assistant(INTERRUPT_CANCELLED_REPLY));
        true
    }

    pub fn change_role(&mut self, role: Role) {
        info!(
            event_name = "chat.role.changed",
            from = self.role.as_str(),
            to = role.as_str(),
            "role changed"
        );
        self.role = role;
        self.messages.push(ChatMessage::system(format!("You are now viewing as: {}", role.display_name())));
        self.messages.push(ChatMessage::assistant(role.welcome_message()));
    }

    /// Applies an action from either surface; the coordinator decides whether chat hears about it.
    pub fn apply_canvas_action(&mut self, action: &CanvasAction) {
        let outcome = self.canvas.handle(action);
        if let Some(message) = outcome.chat_message {
            self.messages.push(message);
        }
        self.toasts.push(outcome.toast);
    }
}

fn answer_text(answer: &InterruptAnswer) -> String {
    match answer {
        InterruptAnswer::Value(value) => value.clone(),
        InterruptAnswer::Confirmed(confirmed) => confirmed.to_string(),
    }
}

fn focus_visualization(value: &str) -> Option<CanvasPayload> {
    let lowered = value.to_lowercase();
    let (chart, data_type, description) = if lowered.contains("revenue") {
        (ChartKind::Bar, DataType::Revenue, "Revenue visualization")
    } else if lowered.contains("user") {
        (ChartKind::Line, DataType::Users, "User growth visualization")
    } else if lowered.contains("performance") {
        (ChartKind::Area, DataType::Conversion, "Performance metrics visualization")
    } else {
        return None;
    };
    Some(CanvasPayload::Visualization { chart, data_type, description: description.to_string() })
}
