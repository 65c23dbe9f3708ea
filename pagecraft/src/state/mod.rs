//! Console composition root
//!
//! Builds the API client, session store and template catalog from
//! configuration once, and hands cheap clones to every handler.

pub mod flash;

use std::sync::Arc;

use crate::api::ApiClient;
use crate::assets::UploadPolicy;
use crate::catalog::TemplateCatalog;
use crate::config::{PagecraftConfig, TokenStoreKind};
use crate::error::PagecraftError;
use crate::middleware::CsrfToken;
use crate::session::{FileTokenStore, MemoryTokenStore, SessionStore, TokenStore};

pub use flash::{FlashLevel, FlashMessage, FlashQueue};

/// Shared state for console handlers
///
/// # Example
///
/// ```rust,no_run
/// use pagecraft::{config::PagecraftConfig, state::ConsoleState};
///
/// # fn example() -> Result<(), pagecraft::error::PagecraftError> {
/// let state = ConsoleState::new(PagecraftConfig::default())?;
/// assert!(!state.session().is_authenticated());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ConsoleState {
    config: Arc<PagecraftConfig>,
    session: Arc<SessionStore>,
    catalog: Arc<TemplateCatalog>,
    uploads: UploadPolicy,
    flash: FlashQueue,
    csrf: CsrfToken,
}

impl ConsoleState {
    /// Build state from configuration, choosing the configured token store
    pub fn new(config: PagecraftConfig) -> Result<Self, PagecraftError> {
        let tokens = token_store(&config)?;
        Self::with_token_store(config, tokens)
    }

    /// Build state with an explicit token store
    pub fn with_token_store(
        config: PagecraftConfig,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, PagecraftError> {
        let api = ApiClient::from_settings(&config.api)?;
        let session = SessionStore::new(api.clone(), tokens)
            .with_refresh_leeway(config.api.refresh_leeway_secs);

        Ok(Self {
            uploads: UploadPolicy::from_settings(&config.uploads),
            catalog: Arc::new(TemplateCatalog::new(api)),
            session: Arc::new(session),
            config: Arc::new(config),
            flash: FlashQueue::default(),
            csrf: CsrfToken::generate(),
        })
    }

    /// Loaded configuration
    #[must_use]
    pub fn config(&self) -> &PagecraftConfig {
        &self.config
    }

    /// Backend client
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        self.session.api()
    }

    /// The operator's session
    #[must_use]
    pub const fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Cached template list
    #[must_use]
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Local upload checks
    #[must_use]
    pub const fn uploads(&self) -> &UploadPolicy {
        &self.uploads
    }

    /// Messages for the next rendered page
    #[must_use]
    pub const fn flash(&self) -> &FlashQueue {
        &self.flash
    }

    /// Token every console form must echo back
    #[must_use]
    pub const fn csrf(&self) -> &CsrfToken {
        &self.csrf
    }
}

fn token_store(config: &PagecraftConfig) -> Result<Arc<dyn TokenStore>, PagecraftError> {
    match config.session.store {
        TokenStoreKind::File => {
            let path = config.session.resolved_file_path();
            tracing::debug!(path = %path.display(), "using file token store");
            Ok(Arc::new(FileTokenStore::new(path)))
        }
        TokenStoreKind::Memory => Ok(Arc::new(MemoryTokenStore::new())),
        #[cfg(feature = "redis")]
        TokenStoreKind::Redis => {
            let store = crate::session::RedisTokenStore::connect(&config.session.redis_url)?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        TokenStoreKind::Redis => {
            Err(crate::config::ConfigError::StoreUnavailable("redis").into())
        }
    }
}
