//! Exit gesture detection and input blocking
//!
//! The detector recognizes the configured escape gesture from raw events; the
//! edge zone swallows touches near the screen borders independently of it.

pub mod detector;
pub mod edge;

pub use detector::{Detection, GestureExitDetector, GestureState};
pub use edge::EdgeZone;
