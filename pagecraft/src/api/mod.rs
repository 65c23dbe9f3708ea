//! Typed HTTP client for the template backend
//!
//! One method per backend operation, grouped by resource:
//!
//! - health and authentication: `health`, `login`, `refresh`, `logout`
//! - templates: `list_templates`, `get_template`, `create_template`,
//!   `update_template`, `delete_template`
//! - pages: `create_page`, `update_page`, `delete_page`
//! - assets: `upload_asset`, `delete_asset`
//! - permissions: `list_permissions`, `add_permission`, `remove_permission`,
//!   `list_users`, `list_groups`
//! - rendering: `generate`
//!
//! No call retries. The only timeout is the transport timeout configured on
//! the client.

mod assets;
mod auth;
mod client;
mod error;
mod pages;
mod permissions;
mod render;
mod templates;

pub use client::ApiClient;
pub use error::ApiError;
