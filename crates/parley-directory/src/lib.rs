//! # parley-directory
//!
//! In-process implementation of the collaborators the real-time engine
//! depends on: membership checks, channel metadata, and message
//! persistence. Seeded from [`DirectoryConfig`](parley_core::config::DirectoryConfig);
//! intended for single-node deployments and tests.

pub mod memory;

pub use memory::MemoryDirectory;
