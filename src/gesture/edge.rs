//! Blocked edge zone
//!
//! Swallows pointer-downs near the screen edges so the victim cannot pull down
//! the notification shade or swipe in navigation gestures when screen pinning
//! is unavailable. This is an input block, not an exit trigger.

use serde::{Deserialize, Serialize};

use crate::types::ScreenGeometry;

/// Extra margin added below the status bar and above the navigation bar (dp)
const SYSTEM_BAR_MARGIN_DP: f32 = 16.0;

/// Left/right blocked band width (dp)
const SIDE_EDGE_DP: f32 = 24.0;

/// System bar height assumed when the platform does not report one (dp)
const FALLBACK_BAR_DP: f32 = 48.0;

/// Pixel bands along each screen edge in which pointer-downs are swallowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeZone {
    pub screen_width: i32,
    pub screen_height: i32,
    pub top: i32,
    pub bottom: i32,
    pub side: i32,
}

impl EdgeZone {
    /// Compute the blocked bands for a screen
    pub fn from_geometry(geometry: &ScreenGeometry) -> Self {
        let density = geometry.density;
        let dp = |value: f32| (value * density) as i32;

        let status_bar = geometry
            .status_bar_px
            .map(|px| px as i32)
            .unwrap_or_else(|| dp(FALLBACK_BAR_DP));
        let navigation_bar = geometry
            .navigation_bar_px
            .map(|px| px as i32)
            .unwrap_or_else(|| dp(FALLBACK_BAR_DP));

        Self {
            screen_width: geometry.width_px as i32,
            screen_height: geometry.height_px as i32,
            top: status_bar + dp(SYSTEM_BAR_MARGIN_DP),
            bottom: navigation_bar + dp(SYSTEM_BAR_MARGIN_DP),
            side: dp(SIDE_EDGE_DP),
        }
    }

    /// Whether a pointer at raw screen coordinates falls inside a blocked band
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let x = x as i32;
        let y = y as i32;
        y < self.top
            || y > self.screen_height - self.bottom
            || x < self.side
            || x > self.screen_width - self.side
    }
}
