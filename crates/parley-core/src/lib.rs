//! # parley-core
//!
//! Core crate for Parley. Contains configuration schemas, typed
//! identifiers, the collaborator traits consumed by the real-time layer,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Parley crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
