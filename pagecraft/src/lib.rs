//! pagecraft: console and client library for document templates
//!
//! The crate talks to a remote template backend over REST and layers a small
//! amount of client-side state on top of it:
//!
//! - [`api`]: typed HTTP client for templates, pages, assets, permissions,
//!   authentication and document rendering
//! - [`session`]: the authentication lifecycle (restore, login, refresh,
//!   logout) with pluggable token persistence
//! - [`guard`]: the route guard deciding who may see admin screens
//! - [`forms`]: the template form wizard and page form validation
//! - [`assets`]: confirm-then-mutate asset list management
//! - [`catalog`]: cached template list with invalidation after mutation
//! - [`router`]: the server-rendered htmx console composing all of the above
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pagecraft::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     pagecraft::observability::init()?;
//!
//!     let config = PagecraftConfig::load()?;
//!     let state = ConsoleState::new(config)?;
//!     state.session().restore().await.ok();
//!
//!     let app = pagecraft::router::build_router(state.clone());
//!     let listener = tokio::net::TcpListener::bind(state.config().server.socket_addr()?).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `redis` - Redis-backed token persistence

#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod assets;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forms;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod router;
pub mod session;
pub mod state;
pub mod views;

#[cfg(test)]
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types
    //!
    //! ```rust
    //! use pagecraft::prelude::*;
    //! ```

    pub use crate::api::{ApiClient, ApiError};
    pub use crate::assets::{AssetError, AssetManager, UploadPolicy, UploadedFile};
    pub use crate::catalog::TemplateCatalog;
    pub use crate::config::PagecraftConfig;
    pub use crate::error::PagecraftError;
    pub use crate::forms::{FormWizard, ValidationErrors, WizardError, WizardStep};
    pub use crate::guard::{Access, GuardDecision, RouteGuard};
    pub use crate::models::{
        Asset, Field, NewPermission, Page, PageUnits, Permission, PermissionType, RenderRequest,
        RenderResult, Template, TemplateInput, TemplateType, User,
    };
    pub use crate::session::{
        FileTokenStore, MemoryTokenStore, Session, SessionError, SessionState, SessionStore,
        TokenStore,
    };
    pub use crate::state::ConsoleState;

    pub use axum;
}
