//! Share card text content
//!
//! The host renders the actual image; this module decides which text goes on
//! it. Fields are emitted in the order the layout places them.

use serde::{Deserialize, Serialize};

use crate::recap::interview::{PrankRecap, Reaction};

/// Placeholder for the victim's name in share message presets
pub const VICTIM_PLACEHOLDER: &str = "%1$s";
/// Placeholder for the formatted duration in share message presets
pub const DURATION_PLACEHOLDER: &str = "%2$s";

/// Chip previews longer than this are cut and get an ellipsis
pub const PREVIEW_MAX_CHARS: usize = 40;

/// Built-in share messages
pub const DEFAULT_SHARE_MESSAGES: [&str; 5] = [
    "Just got %1$s with a fake system update. They waited %2$s for it to finish.",
    "%1$s watched a progress bar that never ends for %2$s. Priceless.",
    "Breaking: %1$s spent %2$s waiting on an update that did not exist.",
    "I owe %1$s %2$s of their life back. Not sorry.",
    "Update complete: %1$s lost %2$s to pure trust.",
];

const RECEIPT_SUFFIX: &str = "TX_000_CYBER_PUNK_ACHIEVED_CONFUSION";
const AMOUNT_PER_SECOND: u64 = 47_619;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareTemplate {
    #[default]
    StatsBase,
    StatsVariant,
    CrashBase,
    CrashVariant,
    TrophyBase,
    TrophyVariant,
    GamerAchievement,
    KernelPanic,
    VitalSigns,
}

impl ShareTemplate {
    pub const ALL: [ShareTemplate; 9] = [
        ShareTemplate::StatsBase,
        ShareTemplate::StatsVariant,
        ShareTemplate::CrashBase,
        ShareTemplate::CrashVariant,
        ShareTemplate::TrophyBase,
        ShareTemplate::TrophyVariant,
        ShareTemplate::GamerAchievement,
        ShareTemplate::KernelPanic,
        ShareTemplate::VitalSigns,
    ];

    /// Pager position to template; out-of-range positions clamp to the ends
    pub fn from_index(index: i64) -> Self {
        let last = Self::ALL.len() as i64 - 1;
        Self::ALL[index.clamp(0, last) as usize]
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ShareTemplate::StatsBase => "Stats",
            ShareTemplate::StatsVariant => "Stats (panic meter)",
            ShareTemplate::CrashBase => "Crash report",
            ShareTemplate::CrashVariant => "Crash report (personal)",
            ShareTemplate::TrophyBase => "Trophy receipt",
            ShareTemplate::TrophyVariant => "Trophy",
            ShareTemplate::GamerAchievement => "Achievement unlocked",
            ShareTemplate::KernelPanic => "Kernel panic",
            ShareTemplate::VitalSigns => "Vital signs",
        }
    }
}

/// One text slot on the card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardField {
    pub key: String,
    pub value: String,
}

impl CardField {
    fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

/// Text content of a share image plus the message that goes with it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareCard {
    pub template: ShareTemplate,
    pub title: String,
    pub fields: Vec<CardField>,
    pub share_text: String,
}

impl ShareCard {
    /// Build the card for the recap's chosen template using the built-in messages
    pub fn build(recap: &PrankRecap) -> Self {
        Self::build_with_messages(recap, &DEFAULT_SHARE_MESSAGES)
    }

    pub fn build_with_messages<S: AsRef<str>>(recap: &PrankRecap, presets: &[S]) -> Self {
        Self {
            template: recap.template,
            title: recap.template.title().to_string(),
            fields: card_fields(recap),
            share_text: share_text(recap, presets),
        }
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }
}

fn card_fields(recap: &PrankRecap) -> Vec<CardField> {
    let panic = recap.panic_level();
    match recap.template {
        ShareTemplate::StatsBase => {
            let total_seconds = recap.duration_ms / 1_000;
            vec![
                CardField::new(
                    "time_value",
                    format!("{}m\n{}s", total_seconds / 60, total_seconds % 60),
                ),
                CardField::new("productivity_leak", recap.productivity_leak()),
                CardField::new("cpu_cycles", recap.cpu_cycles_burned()),
            ]
        }
        ShareTemplate::StatsVariant => vec![
            CardField::new("time_value", recap.formatted_duration_clock()),
            CardField::new("target_name", name_or(&recap.victim_name, "Target")),
            CardField::new("panic_percent", format!("{}%", panic)),
            CardField::new("gauge_sweep", format!("{:.1}", gauge_sweep_degrees(panic))),
            CardField::new("reaction_log", reaction_log(recap.reaction)),
        ],
        ShareTemplate::CrashBase => Vec::new(),
        ShareTemplate::CrashVariant => vec![CardField::new("victim_tag", victim_tag(recap))],
        ShareTemplate::TrophyBase => vec![
            CardField::new("simulated_amount", simulated_amount(recap.duration_ms)),
            CardField::new("receipt_hash", receipt_hash(recap.duration_ms)),
        ],
        ShareTemplate::TrophyVariant => vec![
            CardField::new(
                "achievement_desc",
                format!(
                    "Kept a friend hostage to a fake update for {}",
                    recap.formatted_duration()
                ),
            ),
            CardField::new("rage_level", format!("{}% Detected", rage_level(panic))),
            CardField::new("xp_gained", xp_label(recap.duration_ms)),
        ],
        ShareTemplate::GamerAchievement => vec![
            CardField::new("achievement_story", recap.achievement_story()),
            CardField::new("xp_gained", xp_label(recap.duration_ms)),
            CardField::new(
                "unlocked_by",
                format!("Unlocked by {}", name_or(&recap.prankster_name, "Anonymous")),
            ),
        ],
        ShareTemplate::KernelPanic => vec![
            CardField::new("victim_tag", victim_tag(recap)),
            CardField::new("iq_drop", format!("-{}% IQ", recap.iq_drop())),
            CardField::new("cpu_cycles", recap.cpu_cycles_burned()),
        ],
        ShareTemplate::VitalSigns => vec![
            CardField::new("panic_percent", format!("{}%", panic)),
            CardField::new("gauge_sweep", format!("{:.1}", gauge_sweep_degrees(panic))),
            CardField::new("observation_log", recap.observation_log()),
        ],
    }
}

/// Arc sweep of the panic gauge; a full gauge spans 270 degrees
pub fn gauge_sweep_degrees(panic_level: u8) -> f32 {
    270.0 * panic_level as f32 / 100.0
}

fn rage_level(panic_level: u8) -> u8 {
    100u8.saturating_sub(panic_level)
}

fn xp_label(duration_ms: u64) -> String {
    let xp = (duration_ms / 1_000 * 10).clamp(100, 9_999);
    format!("+{} XP", xp)
}

fn simulated_amount(duration_ms: u64) -> String {
    let amount = (duration_ms / 1_000).saturating_mul(AMOUNT_PER_SECOND);
    format!("${}.00", group_thousands(amount))
}

fn receipt_hash(duration_ms: u64) -> String {
    format!("RECEIPT #{:05}\n{}", duration_ms % 99_999, RECEIPT_SUFFIX)
}

fn victim_tag(recap: &PrankRecap) -> String {
    format!("User @{}", name_or(&recap.victim_name, "GullibleFriend"))
}

fn reaction_log(reaction: Reaction) -> &'static str {
    match reaction {
        Reaction::Stared => "Subject froze. Blinking rate dropped to zero.",
        Reaction::CalledSupport => "Subject contacted tech support. Escalation logged.",
        Reaction::HitPhone => "Subject applied blunt force to hardware.",
        Reaction::Panicked | Reaction::Laughed => {
            "Subject tapped the screen repeatedly in distress."
        }
    }
}

fn name_or<'a>(name: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}

/// 1234567 -> "1,234,567"
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn fill_placeholders(template: &str, victim: &str, duration: &str) -> String {
    template
        .replace(VICTIM_PLACEHOLDER, victim)
        .replace(DURATION_PLACEHOLDER, duration)
}

/// Message to send alongside the card
///
/// A custom message wins; otherwise the selected preset (index clamped) is
/// filled with the victim name and formatted duration.
pub fn share_text<S: AsRef<str>>(recap: &PrankRecap, presets: &[S]) -> String {
    if let Some(custom) = recap
        .custom_message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
    {
        return custom.to_string();
    }
    let Some(last) = presets.len().checked_sub(1) else {
        return String::new();
    };
    let preset = presets[recap.message_index.min(last)].as_ref();
    fill_placeholders(
        preset,
        name_or(&recap.victim_name, "someone"),
        &recap.formatted_duration(),
    )
}

/// Short labels for the message picker chips
pub fn message_previews<S: AsRef<str>>(
    presets: &[S],
    victim_name: &str,
    duration_ms: u64,
) -> Vec<String> {
    let victim = name_or(victim_name, "Victim");
    let duration = format!("{}m", duration_ms / 60_000);
    presets
        .iter()
        .map(|p| truncate_preview(&fill_placeholders(p.as_ref(), victim, &duration)))
        .collect()
}

fn truncate_preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_MAX_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(PREVIEW_MAX_CHARS).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recap::interview::tests::recap;
    use pretty_assertions::assert_eq;

    fn card(template: ShareTemplate, duration_ms: u64, taps: u32, reaction: Reaction) -> ShareCard {
        let mut r = recap(duration_ms, taps, reaction);
        r.template = template;
        ShareCard::build(&r)
    }

    #[test]
    fn test_template_index_clamps() {
        assert_eq!(ShareTemplate::from_index(-3), ShareTemplate::StatsBase);
        assert_eq!(ShareTemplate::from_index(4), ShareTemplate::TrophyBase);
        assert_eq!(ShareTemplate::from_index(8), ShareTemplate::VitalSigns);
        assert_eq!(ShareTemplate::from_index(42), ShareTemplate::VitalSigns);
        assert_eq!(ShareTemplate::VitalSigns.index(), 8);
    }

    #[test]
    fn test_stats_base_fields() {
        let card = card(ShareTemplate::StatsBase, 45_000, 2, Reaction::Stared);
        let keys: Vec<&str> = card.fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["time_value", "productivity_leak", "cpu_cycles"]);
        assert_eq!(card.field("time_value"), Some("0m\n45s"));
        assert_eq!(card.field("productivity_leak"), Some("23.0%"));
        assert_eq!(card.field("cpu_cycles"), Some("0.7M"));
    }

    #[test]
    fn test_stats_variant_fields() {
        let card = card(ShareTemplate::StatsVariant, 45_000, 2, Reaction::Stared);
        assert_eq!(card.field("time_value"), Some("00:45"));
        assert_eq!(card.field("target_name"), Some("Alex"));
        assert_eq!(card.field("panic_percent"), Some("24%"));
        assert_eq!(card.field("gauge_sweep"), Some("64.8"));
    }

    #[test]
    fn test_name_fallbacks() {
        let mut r = recap(45_000, 0, Reaction::Panicked);
        r.victim_name = "  ".to_string();
        r.template = ShareTemplate::CrashVariant;
        assert_eq!(ShareCard::build(&r).field("victim_tag"), Some("User @GullibleFriend"));
        r.template = ShareTemplate::StatsVariant;
        assert_eq!(ShareCard::build(&r).field("target_name"), Some("Target"));
    }

    #[test]
    fn test_crash_base_is_static() {
        let card = card(ShareTemplate::CrashBase, 45_000, 0, Reaction::Panicked);
        assert!(card.fields.is_empty());
        assert_eq!(card.title, "Crash report");
    }

    #[test]
    fn test_trophy_base_amount_and_receipt() {
        let card = card(ShareTemplate::TrophyBase, 125_000, 0, Reaction::Panicked);
        assert_eq!(card.field("simulated_amount"), Some("$5,952,375.00"));
        assert_eq!(
            card.field("receipt_hash"),
            Some("RECEIPT #25001\nTX_000_CYBER_PUNK_ACHIEVED_CONFUSION")
        );

        let short = self::card(ShareTemplate::TrophyBase, 1_000, 0, Reaction::Panicked);
        assert_eq!(short.field("simulated_amount"), Some("$47,619.00"));
        assert!(short.field("receipt_hash").unwrap().starts_with("RECEIPT #01000"));
    }

    #[test]
    fn test_trophy_variant_rage_and_xp() {
        // panic 24 -> rage 76
        let card = card(ShareTemplate::TrophyVariant, 45_000, 2, Reaction::Stared);
        assert_eq!(card.field("rage_level"), Some("76% Detected"));
        assert_eq!(card.field("xp_gained"), Some("+450 XP"));
        assert!(card.field("achievement_desc").unwrap().ends_with("0m 45s"));

        assert_eq!(xp_label(5_000), "+100 XP");
        assert_eq!(xp_label(1_200_000), "+9999 XP");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_share_text_preset() {
        let r = recap(125_000, 0, Reaction::Panicked);
        assert_eq!(
            share_text(&r, &DEFAULT_SHARE_MESSAGES),
            "Just got Alex with a fake system update. They waited 2m 5s for it to finish."
        );
    }

    #[test]
    fn test_share_text_fallbacks() {
        let mut r = recap(61_000, 0, Reaction::Panicked);
        r.victim_name.clear();
        r.message_index = 99;
        assert_eq!(
            share_text(&r, &DEFAULT_SHARE_MESSAGES),
            "Update complete: someone lost 1m 1s to pure trust."
        );

        r.custom_message = Some("  gotcha  ".to_string());
        assert_eq!(share_text(&r, &DEFAULT_SHARE_MESSAGES), "gotcha");

        let empty: [&str; 0] = [];
        r.custom_message = None;
        assert_eq!(share_text(&r, &empty), "");
    }

    #[test]
    fn test_message_previews() {
        let previews = message_previews(&["%1$s lost %2$s", "%1$s"], "", 125_000);
        assert_eq!(previews, vec!["Victim lost 2m", "Victim"]);

        let long = message_previews(&DEFAULT_SHARE_MESSAGES[..1], "Alex", 60_000);
        assert_eq!(long[0].chars().count(), PREVIEW_MAX_CHARS + 1);
        assert!(long[0].ends_with('…'));
        assert!(long[0].starts_with("Just got Alex with a fake system update."));
    }
}
