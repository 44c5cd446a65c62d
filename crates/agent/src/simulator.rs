//! Offline assistant: canned replies picked by keyword.

use quotecanvas_core::canvas::CanvasTab;
use quotecanvas_core::interrupt::Interrupt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulatedReply {
    pub content: String,
    pub open_tab: Option<CanvasTab>,
    /// Raised after the configured interrupt delay, not immediately.
    pub follow_up: Option<Interrupt>,
}

struct ReplyRule {
    name: &'static str,
    keywords: &'static [&'static str],
    whole_words: &'static [&'static str],
    content: &'static str,
    open_tab: Option<CanvasTab>,
    asks_for_focus: bool,
}

impl ReplyRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
            || lowered
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| self.whole_words.contains(&word))
    }
}

const REPLY_RULES: [ReplyRule; 4] = [
    ReplyRule {
        name: "greeting",
        keywords: &["hello"],
        whole_words: &["hi"],
        content: "Hello! I'm ready to assist you with data analysis, location planning, or scheduling. What would you like to explore today?",
        open_tab: None,
        asks_for_focus: false,
    },
    ReplyRule {
        name: "analysis",
        keywords: &["data", "analysis", "chart"],
        whole_words: &[],
        content: "I can help with your data analysis. Let me show you some visualizations in the canvas. What specific metrics are you interested in?",
        open_tab: Some(CanvasTab::Data),
        asks_for_focus: true,
    },
    ReplyRule {
        name: "location",
        keywords: &["map", "location"],
        whole_words: &[],
        content: "I can help you with location planning. I've opened the map view in the canvas. You can select specific locations for more information.",
        open_tab: Some(CanvasTab::Map),
        asks_for_focus: false,
    },
    ReplyRule {
        name: "schedule",
        keywords: &["calendar", "schedule", "date"],
        whole_words: &[],
        content: "Let's work on your schedule. I've opened the calendar view where you can select dates for your activities.",
        open_tab: Some(CanvasTab::Calendar),
        asks_for_focus: false,
    },
];

const DEFAULT_REPLY: &str = "I'm here to help you analyze data, plan locations, or manage schedules. Would you like to explore any of these options? You can open the canvas to see interactive tools.";

pub fn simulate_reply(text: &str) -> SimulatedReply {
    let lowered = text.to_lowercase();
    match REPLY_RULES.iter().find(|rule| rule.matches(&lowered)) {
        Some(rule) => {
            tracing::debug!(event_name = "chat.simulator.rule_matched", rule = rule.name);
            SimulatedReply {
                content: rule.content.to_string(),
                open_tab: rule.open_tab,
                follow_up: rule.asks_for_focus.then(Interrupt::analysis_focus),
            }
        }
        None => SimulatedReply { content: DEFAULT_REPLY.to_string(), open_tab: None, follow_up: None },
    }
}
