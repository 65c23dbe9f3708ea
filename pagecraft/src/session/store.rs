//! Durable token persistence
//!
//! The persisted record is the whole [`Session`] (token pair plus user)
//! under one fixed key, so a restart can resume without a network call.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::Session;

/// Key the session is stored under
pub const TOKENS_KEY: &str = "tokens";

/// Persistence failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("token store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record could not be parsed or written
    #[error("token store holds unreadable data: {0}")]
    Corrupt(String),

    /// Redis failure
    #[error("token store backend error: {0}")]
    Backend(String),
}

/// Where the session survives restarts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read the stored session, if any
    async fn load(&self) -> Result<Option<Session>, StoreError>;

    /// Replace the stored session
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove the stored session; removing nothing is not an error
    async fn clear(&self) -> Result<(), StoreError>;
}

/// JSON file holding a map with the session under [`TOKENS_KEY`]
///
/// Writes go through a temporary file and a rename. On unix the file is
/// readable by its owner only.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the session at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<Option<Map<String, Value>>, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|err| StoreError::Corrupt(err.to_string()))
    }

    async fn write_map(&self, map: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let body =
            serde_json::to_vec_pretty(map).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        let Some(mut map) = self.read_map().await? else {
            return Ok(None);
        };
        match map.remove(TOKENS_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| StoreError::Corrupt(err.to_string())),
        }
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        // Other keys in the file are preserved; an unreadable file is replaced
        let mut map = self.read_map().await.ok().flatten().unwrap_or_default();
        let value =
            serde_json::to_value(session).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        map.insert(TOKENS_KEY.to_string(), value);
        self.write_map(&map).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut map = match self.read_map().await {
            Ok(Some(map)) => map,
            Ok(None) => return Ok(()),
            // Unreadable data is dropped along with the tokens
            Err(StoreError::Corrupt(_)) => Map::new(),
            Err(err) => return Err(err),
        };
        map.remove(TOKENS_KEY);

        if map.is_empty() {
            match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            }
        } else {
            self.write_map(&map).await
        }
    }
}

/// Process-local store; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<Session>>,
}

impl MemoryTokenStore {
    /// An empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with `session`
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }

    /// Current contents, for assertions
    #[must_use]
    pub fn peek(&self) -> Option<Session> {
        self.slot.lock().clone()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.slot.lock().clone())
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.slot.lock() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.slot.lock().take();
        Ok(())
    }
}

#[cfg(feature = "redis")]
pub use redis_store::RedisTokenStore;

#[cfg(feature = "redis")]
mod redis_store {
    use async_trait::async_trait;
    use deadpool_redis::{Config, Pool as RedisPool, Runtime};

    use super::{Session, StoreError, TokenStore};

    /// Redis key the session is stored under
    pub const REDIS_KEY: &str = "pagecraft:tokens";

    /// Session stored as JSON in a single Redis key
    #[derive(Clone)]
    pub struct RedisTokenStore {
        pool: RedisPool,
        key: String,
    }

    impl std::fmt::Debug for RedisTokenStore {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RedisTokenStore")
                .field("key", &self.key)
                .finish_non_exhaustive()
        }
    }

    impl RedisTokenStore {
        /// Connect lazily to `url`; the first command opens the connection
        pub fn connect(url: &str) -> Result<Self, StoreError> {
            let pool = Config::from_url(url)
                .create_pool(Some(Runtime::Tokio1))
                .map_err(|e| StoreError::Backend(format!("Failed to create Redis pool: {e}")))?;
            Ok(Self::from_pool(pool))
        }

        /// Use an existing pool
        #[must_use]
        pub fn from_pool(pool: RedisPool) -> Self {
            Self {
                pool,
                key: REDIS_KEY.to_string(),
            }
        }

        async fn connection(&self) -> Result<deadpool_redis::Connection, StoreError> {
            self.pool
                .get()
                .await
                .map_err(|e| StoreError::Backend(format!("Failed to get Redis connection: {e}")))
        }
    }

    #[async_trait]
    impl TokenStore for RedisTokenStore {
        async fn load(&self) -> Result<Option<Session>, StoreError> {
            let mut conn = self.connection().await?;
            let raw: Option<String> = redis::cmd("GET")
                .arg(&self.key)
                .query_async(&mut *conn)
                .await
                .map_err(|e| StoreError::Backend(format!("Redis GET failed: {e}")))?;
            raw.map(|raw| {
                serde_json::from_str(&raw).map_err(|err| StoreError::Corrupt(err.to_string()))
            })
            .transpose()
        }

        async fn save(&self, session: &Session) -> Result<(), StoreError> {
            let raw =
                serde_json::to_string(session).map_err(|err| StoreError::Corrupt(err.to_string()))?;
            let mut conn = self.connection().await?;
            let (): () = redis::cmd("SET")
                .arg(&self.key)
                .arg(raw)
                .query_async(&mut *conn)
                .await
                .map_err(|e| StoreError::Backend(format!("Redis SET failed: {e}")))?;
            Ok(())
        }

        async fn clear(&self) -> Result<(), StoreError> {
            let mut conn = self.connection().await?;
            let (): () = redis::cmd("DEL")
                .arg(&self.key)
                .query_async(&mut *conn)
                .await
                .map_err(|e| StoreError::Backend(format!("Redis DEL failed: {e}")))?;
            Ok(())
        }
    }
}
