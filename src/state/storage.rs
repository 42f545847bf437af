//! State storage implementation
//!
//! Conversation contexts live either in process memory (default) or in
//! Redis. Both backends forget a user after `idle_ttl` without activity, so
//! a long-running process never accumulates positions of users who left.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use dashmap::DashMap;
use redis::AsyncCommands;
use tracing::{debug, error, info, warn};
use crate::config::{RedisConfig, Settings, StateBackend};
use crate::utils::errors::Result;
use super::context::ConversationContext;

/// Storage for per-user conversation contexts
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load a live context; idle or expired contexts are treated as absent
    async fn load_context(&self, user_id: i64) -> Result<Option<ConversationContext>>;

    /// Save a context, refreshing its idle timer
    async fn save_context(&self, context: &ConversationContext) -> Result<()>;

    /// Forget a user's context
    async fn delete_context(&self, user_id: i64) -> Result<()>;

    /// Drop contexts that went idle; returns how many were removed
    async fn cleanup_expired_contexts(&self) -> Result<u32>;

    /// Load the user's context or start a fresh one at the menu root
    async fn load_or_default(&self, user_id: i64) -> Result<ConversationContext> {
        Ok(self
            .load_context(user_id)
            .await?
            .unwrap_or_else(|| ConversationContext::new(user_id)))
    }
}

/// Build the configured backend
pub async fn create_state_store(settings: &Settings) -> Result<Arc<dyn StateStore>> {
    let idle_ttl = Duration::from_secs(settings.state.idle_ttl_seconds);

    match settings.state.backend {
        StateBackend::Memory => {
            info!(idle_ttl_seconds = settings.state.idle_ttl_seconds, "Using in-memory state storage");
            Ok(Arc::new(MemoryStateStorage::new(idle_ttl)))
        }
        StateBackend::Redis => {
            info!(url = %settings.redis.url, "Using Redis state storage");
            let mut config = settings.redis.clone();
            config.ttl_seconds = settings.state.idle_ttl_seconds;
            let storage = RedisStateStorage::new(config).await?;
            storage.test_connection().await?;
            Ok(Arc::new(storage))
        }
    }
}

/// In-process state storage keyed by user id
#[derive(Debug, Clone)]
pub struct MemoryStateStorage {
    contexts: Arc<DashMap<i64, ConversationContext>>,
    idle_ttl: chrono::Duration,
}

impl MemoryStateStorage {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            contexts: Arc::new(DashMap::new()),
            idle_ttl: chrono::Duration::from_std(idle_ttl)
                .unwrap_or_else(|_| chrono::Duration::days(1)),
        }
    }

    /// Number of stored contexts, live or not yet cleaned
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStorage {
    async fn load_context(&self, user_id: i64) -> Result<Option<ConversationContext>> {
        let context = self.contexts.get(&user_id).map(|entry| entry.value().clone());

        match context {
            Some(context) if context.is_idle(self.idle_ttl) => {
                debug!(user_id = user_id, "Context went idle, forgetting");
                self.contexts.remove(&user_id);
                Ok(None)
            }
            Some(mut context) => {
                if context.is_expired() {
                    debug!(user_id = user_id, scenario = ?context.scenario, "Dialogue expired");
                    context.complete_scenario();
                }
                Ok(Some(context))
            }
            None => Ok(None),
        }
    }

    async fn save_context(&self, context: &ConversationContext) -> Result<()> {
        let mut stored = context.clone();
        stored.updated_at = chrono::Utc::now();
        self.contexts.insert(context.user_id, stored);
        Ok(())
    }

    async fn delete_context(&self, user_id: i64) -> Result<()> {
        self.contexts.remove(&user_id);
        Ok(())
    }

    async fn cleanup_expired_contexts(&self) -> Result<u32> {
        let before = self.contexts.len();
        let idle_ttl = self.idle_ttl;
        self.contexts.retain(|_, context| !context.is_idle(idle_ttl));
        let removed = before.saturating_sub(self.contexts.len()) as u32;

        if removed > 0 {
            info!("Cleaned up {} idle contexts", removed);
        }
        Ok(removed)
    }
}

/// Redis-based state storage
#[derive(Clone)]
pub struct RedisStateStorage {
    /// Redis connection manager
    connection_manager: redis::aio::ConnectionManager,
    /// Redis configuration
    config: RedisConfig,
}

impl RedisStateStorage {
    /// Create a new state storage instance
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            config,
        })
    }

    /// Get the Redis key for a user's context
    fn get_context_key(&self, user_id: i64) -> String {
        format!("{}context:{}", self.config.prefix, user_id)
    }

    /// Test Redis connection
    pub async fn test_connection(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for RedisStateStorage {
    async fn load_context(&self, user_id: i64) -> Result<Option<ConversationContext>> {
        let key = self.get_context_key(user_id);
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = match conn.get::<&str, Option<String>>(&key).await {
            Ok(data) => data,
            Err(e) => {
                error!(user_id = user_id, error = %e, "Failed to get context from Redis");
                return Err(e.into());
            }
        };

        let Some(data) = serialized else {
            debug!(user_id = user_id, "No context found in Redis");
            return Ok(None);
        };

        let mut context: ConversationContext = match serde_json::from_str(&data) {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(user_id = user_id, error = %e, "Dropping unreadable context");
                self.delete_context(user_id).await?;
                return Ok(None);
            }
        };

        if context.is_expired() {
            debug!(user_id = user_id, scenario = ?context.scenario, "Dialogue expired");
            context.complete_scenario();
        }

        Ok(Some(context))
    }

    async fn save_context(&self, context: &ConversationContext) -> Result<()> {
        let key = self.get_context_key(context.user_id);
        let mut stored = context.clone();
        stored.updated_at = chrono::Utc::now();
        let serialized = serde_json::to_string(&stored)?;

        let mut conn = self.connection_manager.clone();

        // Refreshing the TTL on every write is what makes it an idle timeout
        match conn.set_ex::<_, _, ()>(&key, serialized, self.config.ttl_seconds).await {
            Ok(_) => {
                debug!(user_id = context.user_id, ttl_seconds = self.config.ttl_seconds, "Context saved to Redis");
                Ok(())
            }
            Err(e) => {
                error!(user_id = context.user_id, error = %e, "Failed to save context to Redis");
                Err(e.into())
            }
        }
    }

    async fn delete_context(&self, user_id: i64) -> Result<()> {
        let key = self.get_context_key(user_id);
        let mut conn = self.connection_manager.clone();

        let deleted: u32 = conn.del(&key).await?;
        debug!(user_id = user_id, deleted = deleted, "Deleted context");
        Ok(())
    }

    async fn cleanup_expired_contexts(&self) -> Result<u32> {
        // Redis expires keys on its own
        Ok(0)
    }
}

impl std::fmt::Debug for RedisStateStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStateStorage")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// State storage manager with automatic cleanup
pub struct StateStorageManager {
    storage: Arc<dyn StateStore>,
    cleanup_interval: Duration,
    cleanup_handle: Option<tokio::task::JoinHandle<()>>,
}

impl StateStorageManager {
    pub fn new(storage: Arc<dyn StateStore>, cleanup_interval: Duration) -> Self {
        Self {
            storage,
            cleanup_interval,
            cleanup_handle: None,
        }
    }

    /// Start automatic cleanup task
    pub fn start_cleanup(&mut self) {
        if self.cleanup_handle.is_some() {
            warn!("Cleanup task is already running");
            return;
        }

        let storage = self.storage.clone();
        let interval = self.cleanup_interval;

        let handle = tokio::spawn(async move {
            let mut cleanup_interval = tokio::time::interval(interval);

            loop {
                cleanup_interval.tick().await;

                match storage.cleanup_expired_contexts().await {
                    Ok(count) => {
                        if count > 0 {
                            info!("Cleanup task removed {} idle contexts", count);
                        }
                    }
                    Err(e) => {
                        error!("Cleanup task failed: {}", e);
                    }
                }
            }
        });

        self.cleanup_handle = Some(handle);
        info!("Started automatic cleanup task with interval {:?}", self.cleanup_interval);
    }

    /// Stop automatic cleanup task
    pub fn stop_cleanup(&mut self) {
        if let Some(handle) = self.cleanup_handle.take() {
            handle.abort();
            info!("Stopped automatic cleanup task");
        }
    }

    /// Get reference to the storage
    pub fn storage(&self) -> Arc<dyn StateStore> {
        self.storage.clone()
    }
}

impl Drop for StateStorageManager {
    fn drop(&mut self) {
        self.stop_cleanup();
    }
}
