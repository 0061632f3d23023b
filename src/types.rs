//! Core data types for faux-update
//!
//! Configuration enums, the raw input events a host feeds into a session, and
//! the session configuration itself.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Gesture the victim (or prankster) must perform to leave the fake update screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExitMethod {
    /// Three pointer-downs, each within 600ms of the previous one
    #[default]
    TripleTap,
    /// Hold a pointer down for at least 3 seconds
    LongPress,
    /// Press volume-up three times, each within 1s of the previous press
    VolumeUp,
    /// Three hard shakes, at least 500ms apart
    Shake,
}

impl ExitMethod {
    pub const ALL: [ExitMethod; 4] = [
        ExitMethod::TripleTap,
        ExitMethod::LongPress,
        ExitMethod::VolumeUp,
        ExitMethod::Shake,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExitMethod::TripleTap => "triple_tap",
            ExitMethod::LongPress => "long_press",
            ExitMethod::VolumeUp => "volume_up",
            ExitMethod::Shake => "shake",
        }
    }

    /// Parse a configured exit method, falling back to `TripleTap` for unknown values.
    ///
    /// This sits on the UI boundary, so it never fails.
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim() {
            "triple_tap" => ExitMethod::TripleTap,
            "long_press" => ExitMethod::LongPress,
            "volume_up" => ExitMethod::VolumeUp,
            "shake" => ExitMethod::Shake,
            other => {
                log::warn!("unknown exit method {other:?}, falling back to triple_tap");
                ExitMethod::TripleTap
            }
        }
    }

    /// Human-readable label shown in the setup dropdown
    pub fn label(&self) -> &'static str {
        match self {
            ExitMethod::TripleTap => "Triple Tap",
            ExitMethod::LongPress => "Long Press",
            ExitMethod::VolumeUp => "Volume Up (3x)",
            ExitMethod::Shake => "Shake Device",
        }
    }

    /// Whether the host must register an accelerometer listener for this method
    pub fn needs_accelerometer(&self) -> bool {
        matches!(self, ExitMethod::Shake)
    }
}

impl From<String> for ExitMethod {
    fn from(value: String) -> Self {
        ExitMethod::parse_or_default(&value)
    }
}

impl From<ExitMethod> for String {
    fn from(value: ExitMethod) -> Self {
        value.as_str().to_string()
    }
}

/// Look of the fake update screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpdateStyle {
    Samsung,
    Pixel,
    Xiaomi,
    OnePlus,
    Huawei,
    #[default]
    Stock,
}

impl UpdateStyle {
    /// All styles in display order (the reveal footer numbers them 1..=6 in this order)
    pub const ALL: [UpdateStyle; 6] = [
        UpdateStyle::Samsung,
        UpdateStyle::Pixel,
        UpdateStyle::Xiaomi,
        UpdateStyle::OnePlus,
        UpdateStyle::Huawei,
        UpdateStyle::Stock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateStyle::Samsung => "samsung",
            UpdateStyle::Pixel => "pixel",
            UpdateStyle::Xiaomi => "xiaomi",
            UpdateStyle::OnePlus => "oneplus",
            UpdateStyle::Huawei => "huawei",
            UpdateStyle::Stock => "stock",
        }
    }

    /// Parse a style name, falling back to `Stock`
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim() {
            "samsung" => UpdateStyle::Samsung,
            "pixel" => UpdateStyle::Pixel,
            "xiaomi" => UpdateStyle::Xiaomi,
            "oneplus" => UpdateStyle::OnePlus,
            "huawei" => UpdateStyle::Huawei,
            "stock" => UpdateStyle::Stock,
            other => {
                log::warn!("unknown update style {other:?}, falling back to stock");
                UpdateStyle::Stock
            }
        }
    }

    /// Pick the style that matches the device manufacturer
    pub fn detect_from_manufacturer(manufacturer: &str) -> Self {
        let m = manufacturer.to_lowercase();
        if m.contains("samsung") {
            UpdateStyle::Samsung
        } else if m.contains("google") {
            UpdateStyle::Pixel
        } else if m.contains("xiaomi") || m.contains("redmi") || m.contains("poco") {
            UpdateStyle::Xiaomi
        } else if m.contains("oneplus") || m.contains("oppo") || m.contains("realme") {
            UpdateStyle::OnePlus
        } else if m.contains("huawei") || m.contains("honor") {
            UpdateStyle::Huawei
        } else {
            UpdateStyle::Stock
        }
    }

    /// Brand name and OS subtitle shown in the style picker
    pub fn display_name(&self) -> (&'static str, &'static str) {
        match self {
            UpdateStyle::Samsung => ("Samsung", "One UI"),
            UpdateStyle::Pixel => ("Google Pixel", "Stock Android"),
            UpdateStyle::Xiaomi => ("Xiaomi", "MIUI / HyperOS"),
            UpdateStyle::OnePlus => ("OnePlus", "OxygenOS"),
            UpdateStyle::Huawei => ("Huawei", "EMUI"),
            UpdateStyle::Stock => ("Stock Android", "AOSP Recovery"),
        }
    }

    /// 1-based position in [`UpdateStyle::ALL`]
    pub fn variant_number(&self) -> usize {
        UpdateStyle::ALL
            .iter()
            .position(|s| s == self)
            .map(|idx| idx + 1)
            .unwrap_or(1)
    }

    /// Xiaomi shows the bare number plus a downloaded-size caption
    pub fn shows_download_size(&self) -> bool {
        matches!(self, UpdateStyle::Xiaomi)
    }
}

impl From<String> for UpdateStyle {
    fn from(value: String) -> Self {
        UpdateStyle::parse_or_default(&value)
    }
}

impl From<UpdateStyle> for String {
    fn from(value: UpdateStyle) -> Self {
        value.as_str().to_string()
    }
}

/// Hardware and navigation keys the session cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCode {
    VolumeUp,
    VolumeDown,
    VolumeMute,
    Camera,
    Search,
    Menu,
    AppSwitch,
    Back,
    /// Any other platform key code
    #[serde(untagged)]
    Other(u32),
}

impl KeyCode {
    /// Keys swallowed for the whole session so the victim cannot reach system features
    pub fn is_intercepted(&self) -> bool {
        matches!(
            self,
            KeyCode::VolumeUp
                | KeyCode::VolumeDown
                | KeyCode::VolumeMute
                | KeyCode::Camera
                | KeyCode::Search
                | KeyCode::Menu
                | KeyCode::AppSwitch
                | KeyCode::Back
        )
    }
}

/// A raw input event delivered by the host's event loop.
///
/// Timestamps are monotonic milliseconds from the host clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { x: f32, y: f32, t_ms: u64 },
    PointerUp { x: f32, y: f32, t_ms: u64 },
    PointerCancel { t_ms: u64 },
    KeyDown { key: KeyCode, t_ms: u64 },
    KeyUp { key: KeyCode, t_ms: u64 },
    Accelerometer { x: f32, y: f32, z: f32, t_ms: u64 },
}

impl InputEvent {
    pub fn timestamp_ms(&self) -> u64 {
        match *self {
            InputEvent::PointerDown { t_ms, .. }
            | InputEvent::PointerUp { t_ms, .. }
            | InputEvent::PointerCancel { t_ms }
            | InputEvent::KeyDown { t_ms, .. }
            | InputEvent::KeyUp { t_ms, .. }
            | InputEvent::Accelerometer { t_ms, .. } => t_ms,
        }
    }
}

/// Physical screen description used to build the blocked edge zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenGeometry {
    /// Screen width in pixels
    pub width_px: u32,
    /// Screen height in pixels
    pub height_px: u32,
    /// Pixels per density-independent pixel
    #[serde(default = "default_density")]
    pub density: f32,
    /// Status bar height if the platform reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_bar_px: Option<u32>,
    /// Navigation bar height if the platform reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_bar_px: Option<u32>,
}

fn default_density() -> f32 {
    1.0
}

impl ScreenGeometry {
    pub fn new(width_px: u32, height_px: u32, density: f32) -> Self {
        Self {
            width_px,
            height_px,
            density,
            status_bar_px: None,
            navigation_bar_px: None,
        }
    }

    pub fn with_system_bars(mut self, status_bar_px: u32, navigation_bar_px: u32) -> Self {
        self.status_bar_px = Some(status_bar_px);
        self.navigation_bar_px = Some(navigation_bar_px);
        self
    }
}

/// Session tick period in milliseconds
pub const TICK_INTERVAL_MS: u64 = 1_000;

/// Default prank length (30 minutes)
pub const DEFAULT_DURATION_MS: u64 = 30 * 60 * 1_000;

/// Everything a session needs to know before it starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Configured escape gesture
    #[serde(default)]
    pub exit_method: ExitMethod,
    /// Total fake update duration in milliseconds (always > 0)
    pub total_duration_ms: u64,
    /// Fake update look
    #[serde(default)]
    pub style: UpdateStyle,
    /// Pulse the vibrator every 45s while the update runs
    #[serde(default = "default_true")]
    pub haptic_feedback: bool,
    /// Screen geometry for the edge zone; no geometry means no edge blocking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<ScreenGeometry>,
}

fn default_true() -> bool {
    true
}

impl SessionConfig {
    /// Build a config, rejecting non-positive durations.
    pub fn new(exit_method: ExitMethod, total_duration_ms: i64) -> Result<Self, SessionError> {
        if total_duration_ms <= 0 {
            return Err(SessionError::InvalidDuration(total_duration_ms));
        }
        Ok(Self {
            exit_method,
            total_duration_ms: total_duration_ms as u64,
            style: UpdateStyle::default(),
            haptic_feedback: true,
            screen: None,
        })
    }

    /// Build a config from a duration in whole minutes (as picked on the setup screen)
    pub fn from_minutes(exit_method: ExitMethod, minutes: i64) -> Result<Self, SessionError> {
        Self::new(exit_method, minutes.saturating_mul(60_000))
    }

    /// Parse a config from JSON, enforcing the positive-duration rule
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_style(mut self, style: UpdateStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_haptics(mut self, enabled: bool) -> Self {
        self.haptic_feedback = enabled;
        self
    }

    pub fn with_screen(mut self, screen: ScreenGeometry) -> Self {
        self.screen = Some(screen);
        self
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.total_duration_ms == 0 {
            return Err(SessionError::InvalidDuration(0));
        }
        if let Some(screen) = &self.screen {
            if screen.width_px == 0 || screen.height_px == 0 {
                return Err(SessionError::InvalidGeometry(format!(
                    "{}x{} screen",
                    screen.width_px, screen.height_px
                )));
            }
            if !(screen.density.is_finite() && screen.density > 0.0) {
                return Err(SessionError::InvalidGeometry(format!(
                    "density {}",
                    screen.density
                )));
            }
        }
        Ok(())
    }
}
