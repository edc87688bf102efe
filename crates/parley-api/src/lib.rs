//! # parley-api
//!
//! Transport layer for Parley built on Axum: the `/ws` WebSocket endpoint
//! that drives the real-time engine, a health endpoint, JWT verification,
//! and server wiring.

pub mod app;
pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use state::AppState;
