//! Core types and trait definitions for ScootScoot rider onboarding.
//!
//! This crate is deliberately free of HTTP and storage dependencies. It owns
//! the session record, its status and step state machines, and the
//! [`store::SessionStore`] abstraction every backend implements.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod activation;
pub mod clock;
pub mod error;
pub mod fixtures;
pub mod lifecycle;
pub mod session;
pub mod step;
pub mod store;

pub use error::{Error, Result};
