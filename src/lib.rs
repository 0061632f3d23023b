//! faux-update - engine for a fake system update prank
//!
//! A full-screen "system update" runs with a stalling progress bar while the
//! device's usual escape routes are swallowed. Only a configured secret
//! gesture (or the timer running out) ends it, after which the prankster gets
//! a recap with shareable stats.
//!
//! ## Modules
//!
//! - **Session**: gesture detection, edge blocking and progress for one run
//! - **Recap**: exit interview stats and share card content
//! - **Replay**: offline replay of recorded input streams

pub mod error;
pub mod gesture;
pub mod progress;
pub mod recap;
pub mod replay;
pub mod reveal;
pub mod session;
pub mod settings;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::SessionError;
pub use gesture::{EdgeZone, GestureExitDetector};
pub use progress::{compute_progress, ProgressState};
pub use recap::{InterviewAnswers, PrankRecap, Reaction, ShareCard, ShareTemplate};
pub use session::{
    EventOutcome, ExitReason, SessionController, SessionExit, SessionSummary, TeardownActions,
    TickOutcome,
};
pub use settings::PrankSettings;
pub use types::{ExitMethod, InputEvent, KeyCode, ScreenGeometry, SessionConfig, UpdateStyle};

/// Library version
pub const FAUX_VERSION: &str = env!("CARGO_PKG_VERSION");
