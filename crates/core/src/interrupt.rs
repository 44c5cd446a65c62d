use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A modal prompt that suspends the conversation until answered or cancelled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Interrupt {
    Choice {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        options: Vec<String>,
    },
    Confirmation {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Custom {
        component: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptPreset {
    Preference,
    Analysis,
    Location,
    Date,
    Generic,
}

impl std::str::FromStr for InterruptPreset {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to the generic confirmation.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim().to_ascii_lowercase().as_str() {
            "preference" => Self::Preference,
            "analysis" => Self::Analysis,
            "location" => Self::Location,
            "date" => Self::Date,
            _ => Self::Generic,
        })
    }
}

/// The user's reply; its meaning depends on the interrupt it answers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InterruptAnswer {
    Confirmed(bool),
    Value(String),
}

impl Interrupt {
    pub fn choice(
        title: impl Into<String>,
        description: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::Choice {
            title: title.into(),
            description: Some(description.into()),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn confirmation(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Confirmation { title: title.into(), description: Some(description.into()) }
    }

    pub fn preset(preset: InterruptPreset, selected_date: Option<NaiveDate>) -> Self {
        match preset {
            InterruptPreset::Preference => Self::choice(
                "Set Your Preferences",
                "Choose your preferred visualization setting",
                ["Minimal view", "Detailed view", "Compact view", "Extended view"],
            ),
            InterruptPreset::Analysis => Self::choice(
                "Analysis Parameters",
                "Select the type of analysis to perform",
                ["Trend analysis", "Outlier detection", "Comparative analysis", "Predictive modeling"],
            ),
            InterruptPreset::Location => Self::confirmation(
                "Confirm Location Selection",
                "Do you want to use the selected location for your plan?",
            ),
            InterruptPreset::Date => {
                let date = selected_date
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "the selected date".to_string());
                Self::confirmation(
                    "Confirm Date Selection",
                    format!("Do you want to use {date} for your schedule?"),
                )
            }
            InterruptPreset::Generic => {
                Self::confirmation("Confirm Action", "Do you want to proceed with this action?")
            }
        }
    }

    /// Raised by the assistant after a data-analysis request.
    pub fn analysis_focus() -> Self {
        Self::choice(
            "Select Analysis Focus",
            "What aspect of the data would you like to focus on?",
            ["Revenue trends", "User growth", "Performance metrics", "Conversion rates"],
        )
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Choice { title, .. } | Self::Confirmation { title, .. } => title,
            Self::Custom { component } => component,
        }
    }
}

/// Single pending slot; a new trigger replaces whatever was waiting.
#[derive(Clone, Debug, Default)]
pub struct InterruptController {
    pending: Option<Interrupt>,
}

impl InterruptController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the interrupt that was displaced, if any.
    pub fn trigger(&mut self, interrupt: Interrupt) -> Option<Interrupt> {
        self.pending.replace(interrupt)
    }

    pub fn current(&self) -> Option<&Interrupt> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Clears the slot and hands the interrupt back with its answer for interpretation.
    pub fn submit(&mut self, answer: InterruptAnswer) -> Option<(Interrupt, InterruptAnswer)> {
        self.pending.take().map(|interrupt| (interrupt, answer))
    }

    pub fn cancel(&mut self) -> Option<Interrupt> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Interrupt, InterruptAnswer, InterruptController, InterruptPreset};

    #[test]
    fn trigger_replaces_pending_interrupt() {
        let mut controller = InterruptController::new();
        assert!(controller.trigger(Interrupt::preset(InterruptPreset::Analysis, None)).is_none());

        let displaced = controller.trigger(Interrupt::analysis_focus());
        assert_eq!(displaced.map(|interrupt| interrupt.title().to_string()).as_deref(), Some("Analysis Parameters"));
        assert_eq!(controller.current().map(Interrupt::title), Some("Select Analysis Focus"));
    }

    #[test]
    fn submit_and_cancel_clear_the_slot() {
        let mut controller = InterruptController::new();
        assert!(controller.submit(InterruptAnswer::Confirmed(true)).is_none());

        controller.trigger(Interrupt::preset(InterruptPreset::Location, None));
        let (interrupt, answer) =
            controller.submit(InterruptAnswer::Confirmed(true)).expect("pending interrupt");
        assert!(matches!(interrupt, Interrupt::Confirmation { .. }));
        assert_eq!(answer, InterruptAnswer::Confirmed(true));
        assert!(!controller.is_pending());

        controller.trigger(Interrupt::Custom { component: "SignaturePad".to_string() });
        assert!(controller.cancel().is_some());
        assert!(controller.current().is_none());
    }

    #[test]
    fn date_preset_mentions_selected_date() {
        let with_date =
            Interrupt::preset(InterruptPreset::Date, NaiveDate::from_ymd_opt(2026, 11, 2));
        assert_eq!(
            with_date,
            Interrupt::confirmation(
                "Confirm Date Selection",
                "Do you want to use 2026-11-02 for your schedule?"
            )
        );

        let without = Interrupt::preset("date".parse().unwrap_or(InterruptPreset::Generic), None);
        assert!(matches!(
            without,
            Interrupt::Confirmation { description: Some(ref text), .. } if text.contains("the selected date")
        ));
    }

    #[test]
    fn unknown_preset_is_generic_confirmation() {
        let preset: InterruptPreset = "teleport".parse().unwrap_or(InterruptPreset::Analysis);
        assert_eq!(preset, InterruptPreset::Generic);
        assert_eq!(Interrupt::preset(preset, None).title(), "Confirm Action");
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(Interrupt::analysis_focus()).expect("serialize");
        assert_eq!(json["type"], "choice");
        assert_eq!(json["options"].as_array().map(Vec::len), Some(4));
    }
}
