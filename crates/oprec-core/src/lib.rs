//! Core types and trait definitions for the oprec recruitment backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod applicant;
pub mod error;
pub mod files;
pub mod gateway;
pub mod hierarchy;
pub mod payment;
pub mod profile;
pub mod progress;
pub mod store;
pub mod timeline;
pub mod verification;

pub use error::{Error, Result};
