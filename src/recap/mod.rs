//! After the reveal: exit interview and shareable recap

pub mod interview;
pub mod share;

pub use interview::{InterviewAnswers, PrankRecap, Reaction};
pub use share::{message_previews, share_text, CardField, ShareCard, ShareTemplate};
