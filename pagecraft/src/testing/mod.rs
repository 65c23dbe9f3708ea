//! Test helpers
//!
//! - [`FakeBackend`] - scripted template backend on an ephemeral port
//! - [`jwt`] - HS256 tokens with a chosen expiry
//! - htmx and redirect assertions for `axum-test` responses
//! - [`fixtures`] - canned backend payloads

pub mod assertions;
pub mod backend;
pub mod fixtures;
pub mod jwt;

pub use assertions::*;
pub use backend::{FakeBackend, RecordedCall};

pub use mockall;
