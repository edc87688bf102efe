//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use parley_core::config::AppConfig;
use parley_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// WebSocket real-time engine.
    pub realtime: Arc<RealtimeEngine>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}
