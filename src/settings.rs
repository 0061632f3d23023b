//! Persisted prank preferences
//!
//! Stored by the host as a flat JSON object. Missing keys take their defaults
//! so settings written by older builds keep loading.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::types::{ExitMethod, SessionConfig, UpdateStyle};

/// Default prank length on the setup screen, in minutes
pub const DEFAULT_DURATION_MIN: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrankSettings {
    #[serde(default)]
    pub default_style: UpdateStyle,
    /// Minutes
    #[serde(rename = "default_duration", default = "default_duration_min")]
    pub default_duration_min: i64,
    #[serde(default)]
    pub default_exit_method: ExitMethod,
    /// Sprinkle fake error dialogs into the update
    #[serde(default)]
    pub fake_errors: bool,
    #[serde(default = "default_true")]
    pub haptic_feedback: bool,
}

fn default_duration_min() -> i64 {
    DEFAULT_DURATION_MIN
}

fn default_true() -> bool {
    true
}

impl Default for PrankSettings {
    fn default() -> Self {
        Self {
            default_style: UpdateStyle::default(),
            default_duration_min: DEFAULT_DURATION_MIN,
            default_exit_method: ExitMethod::default(),
            fake_errors: false,
            haptic_feedback: true,
        }
    }
}

impl PrankSettings {
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Session config for a prank started with these defaults
    pub fn session_config(&self) -> Result<SessionConfig, SessionError> {
        Ok(
            SessionConfig::from_minutes(self.default_exit_method, self.default_duration_min)?
                .with_style(self.default_style)
                .with_haptics(self.haptic_feedback),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_for_missing_keys() {
        let settings = PrankSettings::from_json("{}").unwrap();
        assert_eq!(settings, PrankSettings::default());
        assert_eq!(settings.default_duration_min, 30);
        assert_eq!(settings.default_exit_method, ExitMethod::TripleTap);
        assert_eq!(settings.default_style, UpdateStyle::Stock);
        assert!(!settings.fake_errors);
        assert!(settings.haptic_feedback);
    }

    #[test]
    fn test_partial_settings() {
        let settings = PrankSettings::from_json(
            r#"{"default_style": "xiaomi", "default_duration": 5, "haptic_feedback": false}"#,
        )
        .unwrap();
        assert_eq!(settings.default_style, UpdateStyle::Xiaomi);
        assert_eq!(settings.default_duration_min, 5);
        assert!(!settings.haptic_feedback);
        assert_eq!(settings.default_exit_method, ExitMethod::TripleTap);
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let settings =
            PrankSettings::from_json(r#"{"default_exit_method": "wink", "default_style": "nokia"}"#)
                .unwrap();
        assert_eq!(settings.default_exit_method, ExitMethod::TripleTap);
        assert_eq!(settings.default_style, UpdateStyle::Stock);
    }

    #[test]
    fn test_json_round_trip_keys() {
        let json = PrankSettings::default().to_json().unwrap();
        assert!(json.contains("\"default_duration\": 30"));
        assert!(json.contains("\"default_exit_method\": \"triple_tap\""));
        assert_eq!(PrankSettings::from_json(&json).unwrap(), PrankSettings::default());
    }

    #[test]
    fn test_session_config() {
        let settings = PrankSettings {
            default_style: UpdateStyle::Pixel,
            default_duration_min: 2,
            default_exit_method: ExitMethod::Shake,
            fake_errors: true,
            haptic_feedback: false,
        };
        let config = settings.session_config().unwrap();
        assert_eq!(config.total_duration_ms, 120_000);
        assert_eq!(config.exit_method, ExitMethod::Shake);
        assert_eq!(config.style, UpdateStyle::Pixel);
        assert!(!config.haptic_feedback);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let settings = PrankSettings {
            default_duration_min: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.session_config(),
            Err(SessionError::InvalidDuration(0))
        ));
    }
}
