//! User presence: aggregate status derived from live connections plus the
//! user's explicit preference.

pub mod status;
pub mod tracker;

pub use status::{ExplicitStatus, PresenceStatus};
pub use tracker::{PresenceRecord, PresenceTracker};
