//! Self-expiring typing indicators.

pub mod indicator;
pub mod manager;

pub use indicator::TypingIndicator;
pub use manager::TypingManager;
