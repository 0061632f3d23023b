//! Exit interview results and the satirical stats derived from them

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::recap::share::ShareTemplate;
use crate::reveal::{minutes_seconds, time_wasted_ms};
use crate::session::SessionSummary;
use crate::types::{ExitMethod, UpdateStyle};

/// Highest value of the prank rating slider
pub const MAX_RATING: u8 = 100;

/// How the victim reacted, as picked by the prankster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Reaction {
    #[default]
    Panicked,
    Stared,
    CalledSupport,
    Laughed,
    HitPhone,
}

impl Reaction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reaction::Panicked => "panicked",
            Reaction::Stared => "stared",
            Reaction::CalledSupport => "called_support",
            Reaction::Laughed => "laughed",
            Reaction::HitPhone => "hit_phone",
        }
    }

    pub fn parse_or_default(value: &str) -> Self {
        match value.trim() {
            "panicked" => Reaction::Panicked,
            "stared" => Reaction::Stared,
            "called_support" => Reaction::CalledSupport,
            "laughed" => Reaction::Laughed,
            "hit_phone" => Reaction::HitPhone,
            other => {
                log::warn!("unknown reaction {other:?}, falling back to panicked");
                Reaction::Panicked
            }
        }
    }

    /// Panic level bonus for this reaction
    fn panic_bonus(&self) -> i64 {
        match self {
            Reaction::Panicked => 30,
            Reaction::CalledSupport => 25,
            Reaction::HitPhone => 20,
            Reaction::Stared => 10,
            Reaction::Laughed => 15,
        }
    }
}

impl From<String> for Reaction {
    fn from(value: String) -> Self {
        Reaction::parse_or_default(&value)
    }
}

impl From<Reaction> for String {
    fn from(value: Reaction) -> Self {
        value.as_str().to_string()
    }
}

/// What the prankster fills in on the exit interview sheet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterviewAnswers {
    #[serde(default)]
    pub victim_name: String,
    #[serde(default)]
    pub prankster_name: String,
    #[serde(default)]
    pub reaction: Reaction,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub template: ShareTemplate,
    /// Preset share message index; ignored when `custom_message` is set
    #[serde(default)]
    pub message_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

/// Everything needed to build a share card: interview answers plus session facts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrankRecap {
    #[serde(default)]
    pub victim_name: String,
    #[serde(default)]
    pub prankster_name: String,
    #[serde(default)]
    pub reaction: Reaction,
    /// 0..=100
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub template: ShareTemplate,
    #[serde(default)]
    pub message_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
    pub duration_ms: u64,
    #[serde(default)]
    pub tap_count: u32,
    #[serde(default)]
    pub exit_method: ExitMethod,
    #[serde(default)]
    pub style: UpdateStyle,
}

impl PrankRecap {
    /// Combine a finished session with the interview answers.
    ///
    /// The recap duration runs until the reveal screen, so it includes the
    /// fake install sequence played after the exit.
    pub fn from_summary(
        summary: &SessionSummary,
        answers: InterviewAnswers,
    ) -> Result<Self, SessionError> {
        let recap = Self {
            victim_name: answers.victim_name.trim().to_string(),
            prankster_name: answers.prankster_name.trim().to_string(),
            reaction: answers.reaction,
            rating: answers.rating,
            template: answers.template,
            message_index: answers.message_index,
            custom_message: normalize_custom(answers.custom_message),
            duration_ms: time_wasted_ms(summary.duration_ms),
            tap_count: summary.tap_count,
            exit_method: summary.exit_method,
            style: summary.style,
        };
        recap.validate()?;
        Ok(recap)
    }

    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let mut recap: PrankRecap = serde_json::from_str(json)?;
        recap.custom_message = normalize_custom(recap.custom_message.take());
        recap.validate()?;
        Ok(recap)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.rating > MAX_RATING {
            return Err(SessionError::InvalidRecap(format!(
                "rating {} exceeds {}",
                self.rating, MAX_RATING
            )));
        }
        Ok(())
    }

    fn duration_secs(&self) -> i64 {
        (self.duration_ms / 1_000) as i64
    }

    /// `Xm Ys`
    pub fn formatted_duration(&self) -> String {
        minutes_seconds(self.duration_ms)
    }

    /// `MM:SS`
    pub fn formatted_duration_clock(&self) -> String {
        let total_seconds = self.duration_ms / 1_000;
        format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
    }

    /// 0..=99, driven by how long they waited, how much they tapped, and how they reacted
    pub fn panic_level(&self) -> u8 {
        let base = self.duration_secs() / 10;
        let tap_bonus = self.tap_count as i64 * 5;
        (base + tap_bonus + self.reaction.panic_bonus()).clamp(0, 99) as u8
    }

    pub fn productivity_leak(&self) -> String {
        let leak = (self.panic_level() as f64 * 0.95 + (self.tap_count % 10) as f64 * 0.1)
            .clamp(0.0, 99.9);
        format!("{:.1}%", leak)
    }

    pub fn cpu_cycles_burned(&self) -> String {
        let cycles = self.duration_ms as f64 / 1_000.0 * 15.7 / 1_000.0;
        format!("{:.1}M", cycles)
    }

    /// 5..=99
    pub fn iq_drop(&self) -> u8 {
        (self.duration_secs() / 10 + self.rating as i64 * 5).clamp(5, 99) as u8
    }

    /// Clinical-sounding note for the vital signs card
    pub fn observation_log(&self) -> String {
        match self.reaction {
            Reaction::Panicked => "Subject showed elevated stress markers and frantic tapping. \
                Diagnosis: acute gullibility."
                .to_string(),
            Reaction::Stared => format!(
                "Subject stayed frozen for {}. No trace of skepticism detected.",
                self.formatted_duration()
            ),
            Reaction::CalledSupport => {
                "Subject escalated to external tech support. Emergency protocol engaged."
                    .to_string()
            }
            Reaction::HitPhone => {
                "Subject turned physically hostile toward the device. Rage threshold exceeded."
                    .to_string()
            }
            Reaction::Laughed => {
                "Subject behavior anomalous. Further observation required.".to_string()
            }
        }
    }

    /// Achievement blurb for the trophy and gamer cards
    pub fn achievement_story(&self) -> String {
        let rarity = if self.duration_ms > 180_000 {
            "a legendary"
        } else if self.duration_ms > 60_000 {
            "an epic"
        } else {
            "a rare"
        };
        format!(
            "Pulled off {} system update prank. The target watched the fake progress bar for {} before learning the truth.",
            rarity,
            self.formatted_duration()
        )
    }
}

fn normalize_custom(message: Option<String>) -> Option<String> {
    message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}
