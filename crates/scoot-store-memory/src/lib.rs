//! In-process backend for ScootScoot onboarding sessions.
//!
//! All state lives in one registry behind a [`tokio::sync::RwLock`]; nothing
//! is persisted. Every compound read-modify-write runs under a single write
//! lock acquisition.

pub mod error;
mod registry;
mod store;

pub use error::{Error, Result};
pub use store::MemoryStore;
